//! Auto responders and their per-part reports.

use serde_json::json;

use crate::client::PigeonClient;
use crate::error::PigeonResult;
use crate::response::Response;
use crate::types::RequestOptions;

const ENDPOINT: &str = "auto_responders";

#[derive(Debug, Clone)]
pub struct AutoRespondersApi {
    client: PigeonClient,
}

impl AutoRespondersApi {
    pub(crate) fn new(client: PigeonClient) -> Self {
        Self { client }
    }

    /// GET /auto_responders
    pub fn find_all(&self) -> PigeonResult<Response> {
        self.client.get(ENDPOINT, RequestOptions::new())
    }

    /// Start the auto responder for one contact.
    ///
    /// POST /auto_responders/<id>/start
    pub fn start(&self, auto_responder_id: i64, email: &str) -> PigeonResult<Response> {
        self.toggle(auto_responder_id, "start", email)
    }

    /// POST /auto_responders/<id>/stop
    pub fn stop(&self, auto_responder_id: i64, email: &str) -> PigeonResult<Response> {
        self.toggle(auto_responder_id, "stop", email)
    }

    /// GET /auto_responders/<id>
    pub fn report(&self, auto_responder_id: i64) -> PigeonResult<Response> {
        self.client
            .get(&format!("{ENDPOINT}/{auto_responder_id}"), RequestOptions::new())
    }

    pub fn bounced(&self, auto_responder_id: i64, part_id: i64) -> PigeonResult<Response> {
        self.part_events(auto_responder_id, part_id, "bounced")
    }

    pub fn unsubscribed(&self, auto_responder_id: i64, part_id: i64) -> PigeonResult<Response> {
        self.part_events(auto_responder_id, part_id, "unsubscribed")
    }

    pub fn spam(&self, auto_responder_id: i64, part_id: i64) -> PigeonResult<Response> {
        self.part_events(auto_responder_id, part_id, "spam")
    }

    fn toggle(&self, auto_responder_id: i64, action: &str, email: &str) -> PigeonResult<Response> {
        self.client.post(
            &format!("{ENDPOINT}/{auto_responder_id}/{action}"),
            RequestOptions::new().params(json!({ "email": email })),
        )
    }

    // GET /auto_responders/<id>/<part_id>/<kind>
    fn part_events(&self, auto_responder_id: i64, part_id: i64, kind: &str) -> PigeonResult<Response> {
        self.client.get(
            &format!("{ENDPOINT}/{auto_responder_id}/{part_id}/{kind}"),
            RequestOptions::new(),
        )
    }
}
