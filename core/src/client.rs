//! Request dispatch for the ExpressPigeon API.
//!
//! # Design
//! `PigeonClient` holds the configuration, a `Transport` and an optional
//! request hook, all behind `Arc` so the handle is cheap to clone into the
//! endpoint facades. Each call is split the same way:
//!
//! 1. `build_request` resolves the URL, sets `X-auth-key`, `Content-Type`
//!    and `User-Agent`, encodes the body, then runs the hook on the finished
//!    request so it can add or overwrite any header.
//! 2. The transport performs the round-trip.
//! 3. `parse_response` decodes the JSON body, whatever the status code.
//!
//! Steps 1 and 3 are public and pure, so a caller that wants to do its own
//! I/O can use them directly.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::endpoints::{
    AutoRespondersApi, CampaignsApi, ContactsApi, DictionariesApi, FlowsApi, ListsApi, MessagesApi, TemplatesApi,
};
use crate::error::{PigeonError, PigeonResult};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::response::{Response, StreamBody};
use crate::transport::{Transport, UreqTransport};
use crate::types::RequestOptions;

/// Header carrying the API key.
pub const AUTH_HEADER: &str = "X-auth-key";

pub const USER_AGENT: &str = concat!("expresspigeon-rust/", env!("CARGO_PKG_VERSION"));

/// Function run on every outgoing request just before it is sent.
pub type RequestHook = Arc<dyn Fn(&mut HttpRequest) + Send + Sync>;

/// Handle for the ExpressPigeon API.
#[derive(Clone)]
pub struct PigeonClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    hook: Option<RequestHook>,
}

impl fmt::Debug for PigeonClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PigeonClient")
            .field("config", &self.config)
            .field("hook", &self.hook.is_some())
            .finish_non_exhaustive()
    }
}

impl PigeonClient {
    /// Client for the default API root with an explicit key.
    pub fn new(auth_key: impl Into<String>) -> PigeonResult<Self> {
        Self::with_config(ClientConfig::new(auth_key))
    }

    /// Client configured from `EXPRESSPIGEON_*` environment variables.
    ///
    /// Fails with [`PigeonError::MissingAuthKey`] before any network
    /// activity when no key is available.
    pub fn from_env() -> PigeonResult<Self> {
        Self::with_config(ClientConfig::from_env()?)
    }

    pub fn with_config(config: ClientConfig) -> PigeonResult<Self> {
        config.validate()?;
        let transport = UreqTransport::new(config.timeout);
        Ok(Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
            hook: None,
        })
    }

    /// Replace the transport, e.g. with a fake that records requests.
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    /// Install the request hook. It replaces any previously installed hook
    /// on this handle; clones made earlier keep theirs.
    pub fn with_request_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut HttpRequest) + Send + Sync + 'static,
    {
        self.hook = Some(Arc::new(hook));
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn root(&self) -> &str {
        &self.config.root
    }

    /// Absolute URL for an endpoint path, joined with exactly one slash.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.root.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    // -------------------------------------------------------------------------
    // Endpoint facades
    // -------------------------------------------------------------------------

    pub fn lists(&self) -> ListsApi {
        ListsApi::new(self.clone())
    }

    pub fn contacts(&self) -> ContactsApi {
        ContactsApi::new(self.clone())
    }

    pub fn campaigns(&self) -> CampaignsApi {
        CampaignsApi::new(self.clone())
    }

    pub fn messages(&self) -> MessagesApi {
        MessagesApi::new(self.clone())
    }

    pub fn templates(&self) -> TemplatesApi {
        TemplatesApi::new(self.clone())
    }

    pub fn auto_responders(&self) -> AutoRespondersApi {
        AutoRespondersApi::new(self.clone())
    }

    pub fn dictionaries(&self) -> DictionariesApi {
        DictionariesApi::new(self.clone())
    }

    pub fn flows(&self) -> FlowsApi {
        FlowsApi::new(self.clone())
    }

    // -------------------------------------------------------------------------
    // Verbs
    // -------------------------------------------------------------------------

    #[instrument(level = "debug", skip(self, options))]
    pub fn get(&self, path: &str, options: RequestOptions) -> PigeonResult<Response> {
        self.dispatch(HttpMethod::Get, path, &options)
    }

    #[instrument(level = "debug", skip(self, options))]
    pub fn post(&self, path: &str, options: RequestOptions) -> PigeonResult<Response> {
        self.dispatch(HttpMethod::Post, path, &options)
    }

    #[instrument(level = "debug", skip(self, options))]
    pub fn put(&self, path: &str, options: RequestOptions) -> PigeonResult<Response> {
        self.dispatch(HttpMethod::Put, path, &options)
    }

    #[instrument(level = "debug", skip(self, options))]
    pub fn delete(&self, path: &str, options: RequestOptions) -> PigeonResult<Response> {
        self.dispatch(HttpMethod::Delete, path, &options)
    }

    /// GET an endpoint whose success body is plain text (CSV exports).
    #[instrument(level = "debug", skip(self))]
    pub fn read_stream(&self, path: &str) -> PigeonResult<StreamBody> {
        let request = self.build_stream_request(path);
        let response = self.execute(&request)?;
        self.parse_stream(response)
    }

    // -------------------------------------------------------------------------
    // Build / parse
    // -------------------------------------------------------------------------

    /// Final request for a JSON endpoint, with the hook already applied.
    pub fn build_request(&self, method: HttpMethod, path: &str, options: &RequestOptions) -> PigeonResult<HttpRequest> {
        let mut request = HttpRequest::new(method, self.url(path));
        request.set_header(AUTH_HEADER, self.config.auth_key.as_str());
        request.set_header("Content-Type", options.content_type_or_default());
        request.set_header("User-Agent", USER_AGENT);
        request.body = options.encode_body()?;
        self.apply_hook(&mut request);
        Ok(request)
    }

    /// Final request for a text endpoint: GET, no body, no `Content-Type`.
    pub fn build_stream_request(&self, path: &str) -> HttpRequest {
        let mut request = HttpRequest::new(HttpMethod::Get, self.url(path));
        request.set_header(AUTH_HEADER, self.config.auth_key.as_str());
        request.set_header("User-Agent", USER_AGENT);
        self.apply_hook(&mut request);
        request
    }

    /// Decode a JSON body. Error statuses decode the same way as successes.
    pub fn parse_response(&self, response: HttpResponse) -> PigeonResult<Response> {
        Response::from_slice(&response.body)
    }

    /// Success bodies are returned verbatim; error bodies are decoded as
    /// JSON when possible and returned verbatim otherwise.
    pub fn parse_stream(&self, response: HttpResponse) -> PigeonResult<StreamBody> {
        if !response.is_success() {
            if let Ok(decoded) = Response::from_slice(&response.body) {
                return Ok(StreamBody::Error(decoded));
            }
        }
        Ok(StreamBody::Text(String::from_utf8(response.body)?))
    }

    fn apply_hook(&self, request: &mut HttpRequest) {
        if let Some(hook) = &self.hook {
            hook(request);
        }
    }

    fn dispatch(&self, method: HttpMethod, path: &str, options: &RequestOptions) -> PigeonResult<Response> {
        let request = self.build_request(method, path, options)?;
        let response = self.execute(&request)?;
        self.parse_response(response)
    }

    fn execute(&self, request: &HttpRequest) -> PigeonResult<HttpResponse> {
        let request_id = Uuid::new_v4();
        let start = Instant::now();

        match self.transport.send(request) {
            Ok(response) => {
                debug!(
                    request_id = %request_id,
                    method = %request.method,
                    url = %request.url,
                    status = response.status,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "request completed"
                );
                Ok(response)
            }
            Err(err) => {
                warn!(
                    request_id = %request_id,
                    method = %request.method,
                    url = %request.url,
                    error = %err,
                    "request failed"
                );
                Err(err)
            }
        }
    }
}
