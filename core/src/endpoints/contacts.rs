//! Contacts: upsert, lookup, removal, paging, moving and CSV export.

use serde_json::{json, Map, Value};

use crate::client::PigeonClient;
use crate::endpoints::with_query;
use crate::error::PigeonResult;
use crate::response::{Response, StreamBody};
use crate::types::RequestOptions;

const ENDPOINT: &str = "contacts";

#[derive(Debug, Clone)]
pub struct ContactsApi {
    client: PigeonClient,
}

impl ContactsApi {
    pub(crate) fn new(client: PigeonClient) -> Self {
        Self { client }
    }

    /// Create or update contacts. Each contact object needs an `email`.
    ///
    /// `list_id` may be omitted when only updating existing contacts, which
    /// are identified by email across all lists.
    ///
    /// POST /contacts
    pub fn upsert(&self, list_id: Option<i64>, contacts: Value) -> PigeonResult<Response> {
        let mut params = Map::new();
        if let Some(list_id) = list_id {
            params.insert("list_id".to_string(), list_id.into());
        }
        params.insert("contacts".to_string(), contacts);
        self.client.post(ENDPOINT, RequestOptions::new().params(params))
    }

    /// GET /contacts?email=<email>
    pub fn find_by_email(&self, email: &str) -> PigeonResult<Response> {
        let path = with_query(ENDPOINT, [("email", email.to_string())]);
        self.client.get(&path, RequestOptions::new())
    }

    /// Remove a contact from one list, or from the account when `list_id`
    /// is `None`.
    ///
    /// DELETE /contacts?email=<email>[&list_id=<id>]
    pub fn delete(&self, email: &str, list_id: Option<i64>) -> PigeonResult<Response> {
        let mut pairs = vec![("email", email.to_string())];
        if let Some(list_id) = list_id {
            pairs.push(("list_id", list_id.to_string()));
        }
        self.client.delete(&with_query(ENDPOINT, pairs), RequestOptions::new())
    }

    /// One page of a list's contacts.
    ///
    /// GET /lists/<id>/contacts?page=<page>&page_size=<size>
    pub fn find_in_list(&self, list_id: i64, page: i64, page_size: i64) -> PigeonResult<Response> {
        let path = with_query(
            &format!("lists/{list_id}/contacts"),
            [("page", page.to_string()), ("page_size", page_size.to_string())],
        );
        self.client.get(&path, RequestOptions::new())
    }

    /// Move contacts between lists.
    ///
    /// POST /contacts/move
    pub fn move_contacts(&self, list_from: i64, list_to: i64, emails: &[&str]) -> PigeonResult<Response> {
        let params = json!({ "list_from": list_from, "list_to": list_to, "contacts": emails });
        self.client
            .post(&format!("{ENDPOINT}/move"), RequestOptions::new().params(params))
    }

    /// Contacts of a list as CSV text.
    ///
    /// GET /contacts/export_csv/<list_id>
    pub fn export_csv(&self, list_id: i64) -> PigeonResult<StreamBody> {
        self.client.read_stream(&format!("{ENDPOINT}/export_csv/{list_id}"))
    }
}

#[cfg(test)]
mod tests {
    use crate::endpoints::testing::client;
    use crate::http::HttpMethod;
    use serde_json::json;

    #[test]
    fn upsert_with_list() {
        let (client, rec) = client();
        client
            .contacts()
            .upsert(Some(4), json!([{"email": "mary@e.e", "custom_fields": {"custom_field_1": "v"}}]))
            .unwrap();
        assert_eq!(rec.last().method, HttpMethod::Post);
        assert_eq!(rec.last_path(), "contacts");
        assert_eq!(
            rec.last_json(),
            json!({"list_id": 4, "contacts": [{"email": "mary@e.e", "custom_fields": {"custom_field_1": "v"}}]})
        );
    }

    #[test]
    fn upsert_without_list_omits_list_id() {
        let (client, rec) = client();
        client.contacts().upsert(None, json!([{"email": "ee@e.e"}])).unwrap();
        assert!(rec.last_json().get("list_id").is_none());
    }

    #[test]
    fn find_by_email() {
        let (client, rec) = client();
        client.contacts().find_by_email("bob@example.net").unwrap();
        assert_eq!(rec.last().method, HttpMethod::Get);
        assert_eq!(rec.last_path(), "contacts?email=bob%40example.net");
    }

    #[test]
    fn delete_from_account_and_from_list() {
        let (client, rec) = client();
        client.contacts().delete("mary@e.e", None).unwrap();
        assert_eq!(rec.last().method, HttpMethod::Delete);
        assert_eq!(rec.last_path(), "contacts?email=mary%40e.e");

        client.contacts().delete("mary@e.e", Some(9)).unwrap();
        assert_eq!(rec.last_path(), "contacts?email=mary%40e.e&list_id=9");
    }

    #[test]
    fn find_in_list_pages() {
        let (client, rec) = client();
        client.contacts().find_in_list(5, 2, 50).unwrap();
        assert_eq!(rec.last_path(), "lists/5/contacts?page=2&page_size=50");
    }

    #[test]
    fn move_contacts() {
        let (client, rec) = client();
        client.contacts().move_contacts(1, 2, &["a@a.a", "b@b.b"]).unwrap();
        assert_eq!(rec.last_path(), "contacts/move");
        assert_eq!(
            rec.last_json(),
            json!({"list_from": 1, "list_to": 2, "contacts": ["a@a.a", "b@b.b"]})
        );
    }

    #[test]
    fn export_csv() {
        let (client, rec) = client();
        let body = client.contacts().export_csv(6).unwrap();
        assert_eq!(rec.last_path(), "contacts/export_csv/6");
        assert!(body.text().is_some());
    }
}
