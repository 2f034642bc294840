//! Contact lists: CRUD, CSV upload and export.

use std::path::Path;

use serde_json::{json, Value};

use crate::client::PigeonClient;
use crate::error::PigeonResult;
use crate::multipart::Multipart;
use crate::response::{Response, StreamBody};
use crate::types::RequestOptions;

const ENDPOINT: &str = "lists";

#[derive(Debug, Clone)]
pub struct ListsApi {
    client: PigeonClient,
}

impl ListsApi {
    pub(crate) fn new(client: PigeonClient) -> Self {
        Self { client }
    }

    /// All lists of the account.
    ///
    /// GET /lists
    pub fn find_all(&self) -> PigeonResult<Response> {
        self.client.get(ENDPOINT, RequestOptions::new())
    }

    /// POST /lists
    pub fn create(&self, name: &str, from_name: &str, reply_to: &str) -> PigeonResult<Response> {
        let params = json!({ "name": name, "from_name": from_name, "reply_to": reply_to });
        self.client.post(ENDPOINT, RequestOptions::new().params(params))
    }

    /// Update list attributes; `params` is sent as given.
    ///
    /// PUT /lists/<id>
    pub fn update(&self, list_id: i64, params: Value) -> PigeonResult<Response> {
        self.client
            .put(&format!("{ENDPOINT}/{list_id}"), RequestOptions::new().params(params))
    }

    /// The list must have no dependent subscriptions or scheduled campaigns.
    ///
    /// DELETE /lists/<id>
    pub fn delete(&self, list_id: i64) -> PigeonResult<Response> {
        self.client.delete(&format!("{ENDPOINT}/{list_id}"), RequestOptions::new())
    }

    /// Create or merge contacts from a CSV file. The response carries an
    /// `upload_id` for [`ListsApi::upload_status`].
    ///
    /// POST /lists/<id>/upload (multipart, part `contacts_file`)
    pub fn upload(&self, list_id: i64, csv_path: impl AsRef<Path>) -> PigeonResult<Response> {
        let form = Multipart::new().file_path("contacts_file", csv_path)?.finish();
        self.client
            .post(&format!("{ENDPOINT}/{list_id}/upload"), RequestOptions::multipart(form))
    }

    /// GET /lists/<id>/upload_status/<upload_id>
    pub fn upload_status(&self, list_id: i64, upload_id: &str) -> PigeonResult<Response> {
        self.client
            .get(&format!("{ENDPOINT}/{list_id}/upload_status/{upload_id}"), RequestOptions::new())
    }

    /// Contacts of a list as CSV text.
    ///
    /// GET /lists/<id>/csv
    pub fn csv(&self, list_id: i64) -> PigeonResult<StreamBody> {
        self.client.read_stream(&format!("{ENDPOINT}/{list_id}/csv"))
    }
}
