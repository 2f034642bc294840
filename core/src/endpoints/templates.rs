//! Newsletter templates.

use serde_json::{Map, Value};

use crate::client::PigeonClient;
use crate::error::PigeonResult;
use crate::response::Response;
use crate::types::RequestOptions;

const ENDPOINT: &str = "templates";

#[derive(Debug, Clone)]
pub struct TemplatesApi {
    client: PigeonClient,
}

impl TemplatesApi {
    pub(crate) fn new(client: PigeonClient) -> Self {
        Self { client }
    }

    /// Copy a template under a new name, optionally substituting merge
    /// fields into the copy. The response `template_id` names the copy.
    ///
    /// POST /templates/<id>/copy
    pub fn copy(&self, template_id: i64, name: &str, merge_fields: Option<Value>) -> PigeonResult<Response> {
        let mut params = Map::new();
        params.insert("name".to_string(), name.into());
        if let Some(merge_fields) = merge_fields {
            params.insert("merge_fields".to_string(), merge_fields);
        }
        self.client
            .post(&format!("{ENDPOINT}/{template_id}/copy"), RequestOptions::new().params(params))
    }

    /// DELETE /templates/<id>
    pub fn delete(&self, template_id: i64) -> PigeonResult<Response> {
        self.client.delete(&format!("{ENDPOINT}/{template_id}"), RequestOptions::new())
    }
}
