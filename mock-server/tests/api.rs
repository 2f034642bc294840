use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, MailList, DEFAULT_AUTH_KEY};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("X-auth-key", DEFAULT_AUTH_KEY)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("X-auth-key", DEFAULT_AUTH_KEY)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn multipart_request(uri: &str, parts: &[(&str, Option<&str>, &str)]) -> Request<String> {
    let boundary = "XyZ0123456789abcdefghijklmnopq";
    let mut body = String::new();
    for (name, filename, content) in parts {
        body.push_str(&format!("--{boundary}\r\n"));
        match filename {
            Some(filename) => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )),
            None => body.push_str(&format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")),
        }
        body.push_str(content);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{boundary}--\r\n"));
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("X-auth-key", DEFAULT_AUTH_KEY)
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(body)
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn missing_auth_key_returns_401_payload() {
    let resp = app()
        .oneshot(Request::builder().uri("/lists").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["code"], 401);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn wrong_auth_key_returns_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/lists")
                .header("X-auth-key", "nope")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- lists ---

#[tokio::test]
async fn find_lists_empty() {
    let resp = app().oneshot(request("GET", "/lists")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let lists: Vec<MailList> = body_json(resp).await;
    assert!(lists.is_empty());
}

#[tokio::test]
async fn create_list_returns_list() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/lists",
            r#"{"name":"Active customers","from_name":"Bob","reply_to":"bob@acmetools.com"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "list=1 created/updated");
    assert_eq!(body["list"]["name"], "Active customers");
    assert_eq!(body["list"]["contact_count"], 0);
}

#[tokio::test]
async fn delete_missing_list_returns_404_payload() {
    let resp = app().oneshot(request("DELETE", "/lists/-1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(
        body,
        json!({"code": 404, "status": "error", "message": "list=-1 not found"})
    );
}

#[tokio::test]
async fn update_missing_list_returns_404() {
    let resp = app()
        .oneshot(json_request("PUT", "/lists/7", r#"{"name":"Nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_without_file_part_returns_400() {
    let resp = app()
        .oneshot(multipart_request("/lists/1/upload", &[("other", None, "x")]))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "contacts_file is required");
}

#[tokio::test]
async fn huge_page_values_return_empty_page() {
    let app = app();
    app.clone()
        .oneshot(json_request(
            "POST",
            "/lists",
            r#"{"name":"Big","from_name":"Bob","reply_to":"bob@e.e"}"#,
        ))
        .await
        .unwrap();

    let uri = format!("/lists/1/contacts?page={}&page_size=2", usize::MAX);
    let resp = app.oneshot(request("GET", &uri)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: Vec<Value> = body_json(resp).await;
    assert!(page.is_empty());
}

// --- contacts ---

#[tokio::test]
async fn find_unknown_contact_returns_404() {
    let resp = app()
        .oneshot(request("GET", "/contacts?email=nobody%40e.e"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "contact=nobody@e.e not found");
}

#[tokio::test]
async fn upsert_into_missing_list_returns_404() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/contacts",
            r#"{"list_id":99,"contacts":[{"email":"a@a.a"}]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- messages ---

#[tokio::test]
async fn message_without_recipient_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/messages", r#"{"template_id":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_message_report_returns_404() {
    let resp = app().oneshot(request("GET", "/messages/abc")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full lifecycle ---

#[tokio::test]
async fn list_contact_message_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create list
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/lists",
            r#"{"name":"Customers","from_name":"Bob","reply_to":"bob@e.e"}"#,
        ))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    let id = body["list"]["id"].as_i64().unwrap();

    // upload CSV
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(multipart_request(
            &format!("/lists/{id}/upload"),
            &[("contacts_file", Some("emails.csv"), "email\nmary@e.e\njohn@e.e\n")],
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    let upload_id = body["upload_id"].as_str().unwrap().to_string();

    // upload status
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", &format!("/lists/{id}/upload_status/{upload_id}")))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body["report"]["success"], 2);

    // upsert one more with custom fields
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/contacts",
            &format!(r#"{{"list_id":{id},"contacts":[{{"email":"ann@e.e","first_name":"Ann"}}]}}"#),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // csv export
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", &format!("/lists/{id}/csv")))
        .await
        .unwrap();
    assert_eq!(resp.headers()[http::header::CONTENT_TYPE], "text/csv");
    let csv = body_bytes(resp).await;
    assert_eq!(&csv[..], b"\"Email\"\n\"ann@e.e\"\n\"john@e.e\"\n\"mary@e.e\"\n");

    // page of contacts
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", &format!("/lists/{id}/contacts?page=0&page_size=1")))
        .await
        .unwrap();
    let page: Vec<Value> = body_json(resp).await;
    assert_eq!(page, vec![json!({"email": "ann@e.e", "first_name": "Ann"})]);

    // remove from list only
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("DELETE", &format!("/contacts?email=ann%40e.e&list_id={id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", "/lists"))
        .await
        .unwrap();
    let lists: Vec<MailList> = body_json(resp).await;
    assert_eq!(lists[0].contact_count, 2);

    // multipart message with attachment
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(multipart_request(
            "/messages",
            &[
                ("template_id", None, "347"),
                ("to", None, "mary@e.e"),
                ("subject", None, "Invoice"),
                ("merge_fields", None, r#"{"amount":12}"#),
                ("attachment", Some("invoice.pdf"), "%PDF"),
            ],
        ))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "email queued");
    let message_id = body["id"].as_str().unwrap().to_string();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", &format!("/messages/{message_id}")))
        .await
        .unwrap();
    let report: Value = body_json(resp).await;
    assert_eq!(report["email"], "mary@e.e");
    assert_eq!(report["template_id"], 347);
    assert_eq!(report["merge_fields"]["amount"], 12);
    assert_eq!(report["attachments"], json!(["invoice.pdf"]));

    // delete list
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("DELETE", &format!("/lists/{id}")))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], format!("list={id} deleted"));
}
