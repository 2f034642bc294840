//! Endpoint facades, one per API resource.
//!
//! Each facade holds a clone of the client and its resource path segment,
//! formats the endpoint path for a call and delegates to the matching verb.
//! Nothing is validated client-side; the API reports bad input in the
//! decoded response.

pub mod auto_responders;
pub mod campaigns;
pub mod contacts;
pub mod dictionaries;
pub mod flows;
pub mod lists;
pub mod messages;
pub mod templates;

pub use auto_responders::AutoRespondersApi;
pub use campaigns::CampaignsApi;
pub use contacts::ContactsApi;
pub use dictionaries::DictionariesApi;
pub use flows::FlowsApi;
pub use lists::ListsApi;
pub use messages::MessagesApi;
pub use templates::TemplatesApi;

/// Append form-urlencoded query pairs to `path`. No `?` when `pairs` is empty.
pub(crate) fn with_query<'a>(path: &str, pairs: impl IntoIterator<Item = (&'a str, String)>) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    let mut empty = true;
    for (key, value) in pairs {
        serializer.append_pair(key, &value);
        empty = false;
    }
    if empty {
        return path.to_string();
    }
    format!("{path}?{}", serializer.finish())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use crate::error::PigeonResult;
    use crate::http::{HttpRequest, HttpResponse};
    use crate::transport::Transport;
    use crate::{ClientConfig, PigeonClient};

    pub const ROOT: &str = "http://localhost:3000";

    /// Records requests and answers each one with a canned reply,
    /// `{"code":200,"status":"success"}` by default.
    #[derive(Clone)]
    pub struct Recorder {
        sent: Arc<Mutex<Vec<HttpRequest>>>,
        reply: HttpResponse,
    }

    impl Default for Recorder {
        fn default() -> Self {
            Self::with_reply(200, r#"{"code":200,"status":"success"}"#)
        }
    }

    impl Recorder {
        pub fn with_reply(status: u16, body: &str) -> Self {
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
                reply: HttpResponse::new(status, body),
            }
        }

        pub fn last(&self) -> HttpRequest {
            self.sent.lock().unwrap().last().cloned().expect("no request sent")
        }

        pub fn count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }

        /// Path and query of the last request, relative to the root.
        pub fn last_path(&self) -> String {
            let url = self.last().url;
            url.strip_prefix(&format!("{ROOT}/")).unwrap_or(&url).to_string()
        }

        pub fn last_json(&self) -> serde_json::Value {
            serde_json::from_slice(&self.last().body).expect("body is not JSON")
        }
    }

    impl Transport for Recorder {
        fn send(&self, request: &HttpRequest) -> PigeonResult<HttpResponse> {
            self.sent.lock().unwrap().push(request.clone());
            Ok(self.reply.clone())
        }
    }

    pub fn client() -> (PigeonClient, Recorder) {
        let recorder = Recorder::default();
        let client = PigeonClient::with_config(ClientConfig::new("test-key").with_root(ROOT))
            .unwrap()
            .with_transport(recorder.clone());
        (client, recorder)
    }
}
