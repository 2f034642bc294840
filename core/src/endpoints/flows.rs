//! Automation flows and their triggers.
//!
//! Every flow action except listing is a POST, including `report` and
//! `delete`.

use serde_json::json;

use crate::client::PigeonClient;
use crate::error::PigeonResult;
use crate::response::Response;
use crate::types::RequestOptions;

const ENDPOINT: &str = "flows";

#[derive(Debug, Clone)]
pub struct FlowsApi {
    client: PigeonClient,
}

impl FlowsApi {
    pub(crate) fn new(client: PigeonClient) -> Self {
        Self { client }
    }

    /// GET /flows
    pub fn get_all(&self) -> PigeonResult<Response> {
        self.client.get(ENDPOINT, RequestOptions::new())
    }

    /// Enter one contact into the flow.
    ///
    /// POST /flows/<id>/start
    pub fn start(&self, flow_id: i64, email: &str) -> PigeonResult<Response> {
        self.client.post(
            &format!("{ENDPOINT}/{flow_id}/start"),
            RequestOptions::new().params(json!({ "email": email })),
        )
    }

    /// POST /flows/<id>/report
    pub fn report(&self, flow_id: i64) -> PigeonResult<Response> {
        self.action(flow_id, "report")
    }

    /// POST /flows/<id>/delete
    pub fn delete(&self, flow_id: i64) -> PigeonResult<Response> {
        self.action(flow_id, "delete")
    }

    pub fn schedule_trigger(&self, flow_id: i64, enable: bool) -> PigeonResult<Response> {
        self.trigger(flow_id, "schedule", enable)
    }

    pub fn list_trigger(&self, flow_id: i64, enable: bool) -> PigeonResult<Response> {
        self.trigger(flow_id, "list", enable)
    }

    pub fn form_trigger(&self, flow_id: i64, enable: bool) -> PigeonResult<Response> {
        self.trigger(flow_id, "form", enable)
    }

    fn action(&self, flow_id: i64, action: &str) -> PigeonResult<Response> {
        self.client
            .post(&format!("{ENDPOINT}/{flow_id}/{action}"), RequestOptions::new())
    }

    // POST /flows/<id>/triggers/<kind> with {"enable": bool}
    fn trigger(&self, flow_id: i64, kind: &str, enable: bool) -> PigeonResult<Response> {
        self.client.post(
            &format!("{ENDPOINT}/{flow_id}/triggers/{kind}"),
            RequestOptions::new().params(json!({ "enable": enable })),
        )
    }
}
