//! Transport layer executing `HttpRequest` values.
//!
//! # Design
//! `PigeonClient` never talks to the network directly. It hands the final
//! request to a `Transport`, which makes swapping in a capturing fake for
//! tests a one-line change. The default `UreqTransport` is a blocking
//! `ureq` agent configured so 4xx/5xx statuses come back as data rather than
//! `Err`. The API reports application errors in the body, so the client
//! must see it.

use std::fmt;
use std::time::Duration;

use crate::error::PigeonResult;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one HTTP round-trip.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> PigeonResult<HttpResponse>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> PigeonResult<HttpResponse> + Send + Sync,
{
    fn send(&self, request: &HttpRequest) -> PigeonResult<HttpResponse> {
        self(request)
    }
}

/// Blocking transport backed by a `ureq` agent.
///
/// The request body goes out on every verb, GET and DELETE included.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> PigeonResult<HttpResponse> {
        let url = request.url.as_str();
        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.force_send_body().send(request.body.as_slice())
            }
            HttpMethod::Delete => {
                let mut builder = self.agent.delete(url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.force_send_body().send(request.body.as_slice())
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.send(request.body.as_slice())
            }
            HttpMethod::Put => {
                let mut builder = self.agent.put(url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.send(request.body.as_slice())
            }
        };
        let mut response = result?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect();
        // CSV exports can be large; lift ureq's default 10MB cap.
        let body = response.body_mut().with_config().limit(u64::MAX).read_to_vec()?;

        Ok(HttpResponse { status, headers, body })
    }
}
