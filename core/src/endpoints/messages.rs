//! Transactional messages.
//!
//! Messages are rendered from an existing template whose `${field}` merge
//! placeholders are filled from `MessageRequest::merge_fields`.

use std::path::Path;

use crate::client::PigeonClient;
use crate::endpoints::with_query;
use crate::error::PigeonResult;
use crate::multipart::Multipart;
use crate::response::Response;
use crate::types::{MessageReportQuery, MessageRequest, RequestOptions};

const ENDPOINT: &str = "messages";

#[derive(Debug, Clone)]
pub struct MessagesApi {
    client: PigeonClient,
}

impl MessagesApi {
    pub(crate) fn new(client: PigeonClient) -> Self {
        Self { client }
    }

    /// Queue a single message. The response `id` identifies it for
    /// [`MessagesApi::report`].
    ///
    /// POST /messages (JSON, or multipart when there are attachments)
    pub fn send_message(&self, message: &MessageRequest) -> PigeonResult<Response> {
        if message.attachments.is_empty() {
            return self.client.post(ENDPOINT, RequestOptions::json(message)?);
        }
        let form = message_form(message)?;
        self.client.post(ENDPOINT, RequestOptions::multipart(form.finish()))
    }

    /// Send a batch of messages described by a zip archive.
    ///
    /// POST /messages/bulk (multipart, part `file`)
    pub fn send_bulk(&self, archive_path: impl AsRef<Path>) -> PigeonResult<Response> {
        let form = Multipart::new().file_path("file", archive_path)?.finish();
        self.client
            .post(&format!("{ENDPOINT}/bulk"), RequestOptions::multipart(form))
    }

    /// Delivery status of one message.
    ///
    /// GET /messages/<id>
    pub fn report(&self, message_id: &str) -> PigeonResult<Response> {
        self.client.get(&format!("{ENDPOINT}/{message_id}"), RequestOptions::new())
    }

    /// GET /messages?page=&page_size=[&start_date=&end_date=]
    pub fn reports(&self, query: &MessageReportQuery) -> PigeonResult<Response> {
        self.client.get(&with_query(ENDPOINT, query.pairs()), RequestOptions::new())
    }
}

fn message_form(message: &MessageRequest) -> PigeonResult<Multipart> {
    let mut form = Multipart::new()
        .text("template_id", message.template_id.to_string())
        .text("to", message.to.as_str())
        .text("reply_to", message.reply_to.as_str())
        .text("from", message.from_name.as_str())
        .text("subject", message.subject.as_str());
    if let Some(merge_fields) = &message.merge_fields {
        form = form.text("merge_fields", serde_json::to_string(merge_fields)?);
    }
    form = form
        .text("view_online", message.view_online.to_string())
        .text("click_tracking", message.click_tracking.to_string());
    for path in &message.attachments {
        form = form.file_path("attachment", path)?;
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use crate::endpoints::testing::client;
    use crate::http::HttpMethod;
    use crate::types::{MessageReportQuery, MessageRequest};

    #[test]
    fn send_without_attachments_is_json() {
        let (client, rec) = client();
        let message = MessageRequest::new(347, "to@e.e", "a@a.a", "me", "Hi").merge_field("first_name", "<b>Gleb</b>");
        client.messages().send_message(&message).unwrap();

        let req = rec.last();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(rec.last_path(), "messages");
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        let body = rec.last_json();
        assert_eq!(body["template_id"], 347);
        assert_eq!(body["from"], "me");
        assert_eq!(body["merge_fields"]["first_name"], "<b>Gleb</b>");
        assert_eq!(body["view_online"], false);
        assert_eq!(body["click_tracking"], true);
    }

    #[test]
    fn send_with_attachment_is_multipart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.pdf");
        std::fs::write(&path, b"%PDF-1.4\x00\x01").unwrap();

        let (client, rec) = client();
        let message = MessageRequest::new(347, "to@e.e", "a@a.a", "me", "Invoice")
            .merge_field("amount", 12)
            .attachment(&path);
        client.messages().send_message(&message).unwrap();

        let req = rec.last();
        assert_eq!(rec.last_path(), "messages");
        assert!(req
            .header("Content-Type")
            .unwrap()
            .starts_with("multipart/form-data; boundary="));
        let body = String::from_utf8_lossy(&req.body).into_owned();
        assert!(body.contains("name=\"template_id\"\r\n\r\n347\r\n"));
        assert!(body.contains("name=\"from\"\r\n\r\nme\r\n"));
        assert!(body.contains("name=\"merge_fields\"\r\n\r\n{\"amount\":12}\r\n"));
        assert!(body.contains("name=\"attachment\"; filename=\"invoice.pdf\""));
        assert!(!body.contains("merger_fields"));
    }

    #[test]
    fn send_bulk_uploads_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.zip");
        std::fs::write(&path, b"PK\x03\x04").unwrap();

        let (client, rec) = client();
        client.messages().send_bulk(&path).unwrap();
        assert_eq!(rec.last_path(), "messages/bulk");
        let body = rec.last().body;
        assert!(String::from_utf8_lossy(&body).contains("name=\"file\"; filename=\"messages.zip\""));
    }

    #[test]
    fn report() {
        let (client, rec) = client();
        client.messages().report("abc").unwrap();
        assert_eq!(rec.last().method, HttpMethod::Get);
        assert_eq!(rec.last_path(), "messages/abc");
    }

    #[test]
    fn reports_with_and_without_period() {
        let (client, rec) = client();
        client.messages().reports(&MessageReportQuery::new(0, 100)).unwrap();
        assert_eq!(rec.last_path(), "messages?page=0&page_size=100");

        let query = MessageReportQuery::new(1, 10).between("2013-03-16T11:22:23.210+0000", "2013-03-17T00:00:00.000+0000");
        client.messages().reports(&query).unwrap();
        assert_eq!(
            rec.last_path(),
            "messages?page=1&page_size=10&start_date=2013-03-16T11%3A22%3A23.210%2B0000&end_date=2013-03-17T00%3A00%3A00.000%2B0000"
        );
    }
}
