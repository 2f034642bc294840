//! Dictionaries: named key/value tables usable from templates.

use serde_json::Value;

use crate::client::PigeonClient;
use crate::error::PigeonResult;
use crate::response::Response;
use crate::types::RequestOptions;

const ENDPOINT: &str = "dictionaries";

#[derive(Debug, Clone)]
pub struct DictionariesApi {
    client: PigeonClient,
}

impl DictionariesApi {
    pub(crate) fn new(client: PigeonClient) -> Self {
        Self { client }
    }

    /// GET /dictionaries
    pub fn find_all(&self) -> PigeonResult<Response> {
        self.client.get(ENDPOINT, RequestOptions::new())
    }

    /// Create dictionaries. `dictionaries` is sent as the whole body.
    ///
    /// POST /dictionaries
    pub fn create(&self, dictionaries: Value) -> PigeonResult<Response> {
        self.client.post(ENDPOINT, RequestOptions::new().params(dictionaries))
    }

    /// GET /dictionaries/<id>
    pub fn lookup(&self, dictionary_id: i64) -> PigeonResult<Response> {
        self.client.get(&format!("{ENDPOINT}/{dictionary_id}"), RequestOptions::new())
    }
}
