//! In-memory stand-in for the ExpressPigeon API, for local runs and tests.
//!
//! Covers lists, contacts and transactional messages. Every request must
//! carry the configured `X-auth-key`; failures are reported as JSON
//! documents of the shape `{"code", "status": "error", "message"}` with the
//! matching HTTP status, the same way the real API does.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use axum::{
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub const AUTH_HEADER: &str = "x-auth-key";
pub const DEFAULT_AUTH_KEY: &str = "mock-key";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MailList {
    pub id: i64,
    pub name: String,
    pub from_name: String,
    pub reply_to: String,
    pub contact_count: usize,
}

#[derive(Deserialize)]
pub struct CreateList {
    pub name: String,
    pub from_name: String,
    pub reply_to: String,
}

#[derive(Deserialize)]
pub struct UpdateList {
    pub name: Option<String>,
    pub from_name: Option<String>,
    pub reply_to: Option<String>,
}

#[derive(Deserialize)]
pub struct UpsertContacts {
    pub list_id: Option<i64>,
    pub contacts: Vec<Map<String, Value>>,
}

#[derive(Deserialize)]
pub struct ContactQuery {
    pub email: String,
    pub list_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    100
}

/// A queued transactional message as the mock saw it.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub template_id: Option<i64>,
    pub email: String,
    pub subject: String,
    pub merge_fields: Option<Value>,
    pub attachments: Vec<String>,
}

#[derive(Default)]
pub struct Store {
    next_list_id: i64,
    lists: BTreeMap<i64, MailList>,
    members: BTreeMap<i64, BTreeSet<String>>,
    contacts: BTreeMap<String, Map<String, Value>>,
    uploads: HashMap<Uuid, usize>,
    messages: HashMap<Uuid, Message>,
}

impl Store {
    fn add_member(&mut self, list_id: i64, email: &str) {
        let members = self.members.entry(list_id).or_default();
        members.insert(email.to_string());
        let count = members.len();
        if let Some(list) = self.lists.get_mut(&list_id) {
            list.contact_count = count;
        }
    }

    fn remove_member(&mut self, list_id: i64, email: &str) {
        if let Some(members) = self.members.get_mut(&list_id) {
            members.remove(email);
            let count = members.len();
            if let Some(list) = self.lists.get_mut(&list_id) {
                list.contact_count = count;
            }
        }
    }

    fn list_members(&self, list_id: i64) -> Vec<String> {
        self.members
            .get(&list_id)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    auth_key: Arc<str>,
    db: Db,
}

/// Error reply in the API's JSON error shape.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "code": self.status.as_u16(),
            "status": "error",
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

fn success(message: impl Into<String>) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("code".to_string(), 200.into());
    body.insert("status".to_string(), "success".into());
    body.insert("message".to_string(), Value::String(message.into()));
    body
}

pub fn app() -> Router {
    app_with_key(DEFAULT_AUTH_KEY)
}

pub fn app_with_key(auth_key: &str) -> Router {
    let state = AppState {
        auth_key: Arc::from(auth_key),
        db: Arc::new(RwLock::new(Store::default())),
    };
    Router::new()
        .route("/lists", get(find_lists).post(create_list))
        .route("/lists/{id}", put(update_list).delete(delete_list))
        .route("/lists/{id}/upload", post(upload_contacts))
        .route("/lists/{id}/upload_status/{upload_id}", get(upload_status))
        .route("/lists/{id}/csv", get(list_csv))
        .route("/lists/{id}/contacts", get(list_contacts))
        .route("/contacts", get(find_contact).post(upsert_contacts).delete(delete_contact))
        .route("/messages", post(send_message))
        .route("/messages/{id}", get(message_report))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth_key))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_key(listener: TcpListener, auth_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_key(auth_key)).await
}

async fn require_auth_key(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let key = req.headers().get(AUTH_HEADER).and_then(|value| value.to_str().ok());
    if key != Some(&*state.auth_key) {
        debug!(path = %req.uri().path(), "rejected request without valid auth key");
        return ApiError::new(StatusCode::UNAUTHORIZED, "invalid or missing X-auth-key").into_response();
    }
    next.run(req).await
}

async fn find_lists(State(state): State<AppState>) -> Json<Vec<MailList>> {
    let store = state.db.read().await;
    Json(store.lists.values().cloned().collect())
}

async fn create_list(State(state): State<AppState>, Json(input): Json<CreateList>) -> ApiResult {
    let mut store = state.db.write().await;
    store.next_list_id += 1;
    let list = MailList {
        id: store.next_list_id,
        name: input.name,
        from_name: input.from_name,
        reply_to: input.reply_to,
        contact_count: 0,
    };
    store.lists.insert(list.id, list.clone());
    debug!(list_id = list.id, "list created");

    let mut body = success(format!("list={} created/updated", list.id));
    body.insert("list".to_string(), json!(list));
    Ok(Json(Value::Object(body)))
}

async fn update_list(State(state): State<AppState>, Path(id): Path<i64>, Json(input): Json<UpdateList>) -> ApiResult {
    let mut store = state.db.write().await;
    let list = store
        .lists
        .get_mut(&id)
        .ok_or_else(|| ApiError::not_found(format!("list={id} not found")))?;
    if let Some(name) = input.name {
        list.name = name;
    }
    if let Some(from_name) = input.from_name {
        list.from_name = from_name;
    }
    if let Some(reply_to) = input.reply_to {
        list.reply_to = reply_to;
    }
    let mut body = success(format!("list={id} created/updated"));
    body.insert("list".to_string(), json!(list));
    Ok(Json(Value::Object(body)))
}

async fn delete_list(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult {
    let mut store = state.db.write().await;
    store
        .lists
        .remove(&id)
        .ok_or_else(|| ApiError::not_found(format!("list={id} not found")))?;
    store.members.remove(&id);
    Ok(Json(Value::Object(success(format!("list={id} deleted")))))
}

async fn upload_contacts(State(state): State<AppState>, Path(id): Path<i64>, mut multipart: Multipart) -> ApiResult {
    let mut csv = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        if field.name() == Some("contacts_file") {
            let data = field.bytes().await.map_err(|e| ApiError::bad_request(e.to_string()))?;
            csv = Some(String::from_utf8_lossy(&data).into_owned());
        }
    }
    let csv = csv.ok_or_else(|| ApiError::bad_request("contacts_file is required"))?;

    let mut store = state.db.write().await;
    if !store.lists.contains_key(&id) {
        return Err(ApiError::not_found(format!("list={id} not found")));
    }
    let emails: Vec<String> = csv
        .lines()
        .skip(1)
        .filter_map(|line| line.split(',').next())
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(str::to_string)
        .collect();
    for email in &emails {
        let contact = store.contacts.entry(email.clone()).or_default();
        contact.insert("email".to_string(), email.clone().into());
        store.add_member(id, email);
    }
    let upload_id = Uuid::new_v4();
    store.uploads.insert(upload_id, emails.len());
    debug!(list_id = id, %upload_id, imported = emails.len(), "contacts uploaded");

    let mut body = success("file uploaded");
    body.insert("upload_id".to_string(), upload_id.to_string().into());
    Ok(Json(Value::Object(body)))
}

async fn upload_status(State(state): State<AppState>, Path((_id, upload_id)): Path<(i64, String)>) -> ApiResult {
    let store = state.db.read().await;
    let imported = Uuid::parse_str(&upload_id)
        .ok()
        .and_then(|upload_id| store.uploads.get(&upload_id).copied())
        .ok_or_else(|| ApiError::not_found(format!("upload={upload_id} not found")))?;
    let mut body = success("file upload completed");
    body.insert("report".to_string(), json!({ "completed": true, "success": imported, "failed": 0 }));
    Ok(Json(Value::Object(body)))
}

async fn list_csv(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response, ApiError> {
    let store = state.db.read().await;
    if !store.lists.contains_key(&id) {
        return Err(ApiError::not_found(format!("list={id} not found")));
    }
    let mut csv = String::from("\"Email\"\n");
    for email in store.list_members(id) {
        csv.push_str(&format!("\"{email}\"\n"));
    }
    Ok(([(header::CONTENT_TYPE, "text/csv")], csv).into_response())
}

async fn list_contacts(State(state): State<AppState>, Path(id): Path<i64>, Query(query): Query<PageQuery>) -> ApiResult {
    let store = state.db.read().await;
    if !store.lists.contains_key(&id) {
        return Err(ApiError::not_found(format!("list={id} not found")));
    }
    let page: Vec<Value> = store
        .list_members(id)
        .iter()
        .skip(query.page.saturating_mul(query.page_size))
        .take(query.page_size)
        .filter_map(|email| store.contacts.get(email).cloned().map(Value::Object))
        .collect();
    Ok(Json(Value::Array(page)))
}

async fn upsert_contacts(State(state): State<AppState>, Json(input): Json<UpsertContacts>) -> ApiResult {
    let mut store = state.db.write().await;
    if let Some(list_id) = input.list_id {
        if !store.lists.contains_key(&list_id) {
            return Err(ApiError::not_found(format!("list={list_id} not found")));
        }
    }
    let mut emails = Vec::with_capacity(input.contacts.len());
    for contact in input.contacts {
        let email = contact
            .get("email")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::bad_request("contact email is required"))?
            .to_string();
        store.contacts.entry(email.clone()).or_default().extend(contact);
        if let Some(list_id) = input.list_id {
            store.add_member(list_id, &email);
        }
        emails.push(email);
    }
    let mut body = success("contacts created/updated");
    body.insert("contacts".to_string(), json!(emails));
    Ok(Json(Value::Object(body)))
}

async fn find_contact(State(state): State<AppState>, Query(query): Query<ContactQuery>) -> ApiResult {
    let store = state.db.read().await;
    store
        .contacts
        .get(&query.email)
        .cloned()
        .map(|contact| Json(Value::Object(contact)))
        .ok_or_else(|| ApiError::not_found(format!("contact={} not found", query.email)))
}

async fn delete_contact(State(state): State<AppState>, Query(query): Query<ContactQuery>) -> ApiResult {
    let mut store = state.db.write().await;
    if !store.contacts.contains_key(&query.email) {
        return Err(ApiError::not_found(format!("contact={} not found", query.email)));
    }
    match query.list_id {
        Some(list_id) => store.remove_member(list_id, &query.email),
        None => {
            store.contacts.remove(&query.email);
            let list_ids: Vec<i64> = store.members.keys().copied().collect();
            for list_id in list_ids {
                store.remove_member(list_id, &query.email);
            }
        }
    }
    Ok(Json(Value::Object(success(format!("contact={} deleted", query.email)))))
}

async fn send_message(State(state): State<AppState>, req: Request) -> ApiResult {
    let is_multipart = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));

    let mut message = if is_multipart {
        let multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        read_message_form(multipart).await?
    } else {
        let Json(input) = Json::<Value>::from_request(req, &())
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        Message {
            template_id: input.get("template_id").and_then(Value::as_i64),
            email: input.get("to").and_then(Value::as_str).unwrap_or_default().to_string(),
            subject: input.get("subject").and_then(Value::as_str).unwrap_or_default().to_string(),
            merge_fields: input.get("merge_fields").cloned(),
            ..Message::default()
        }
    };
    if message.email.is_empty() {
        return Err(ApiError::bad_request("to is required"));
    }
    message.id = Uuid::new_v4();
    debug!(message_id = %message.id, attachments = message.attachments.len(), "message queued");

    let mut body = success("email queued");
    body.insert("id".to_string(), message.id.to_string().into());
    state.db.write().await.messages.insert(message.id, message);
    Ok(Json(Value::Object(body)))
}

async fn read_message_form(mut multipart: Multipart) -> Result<Message, ApiError> {
    let mut message = Message::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "attachment" {
            message.attachments.push(field.file_name().unwrap_or_default().to_string());
            continue;
        }
        let text = field.text().await.map_err(|e| ApiError::bad_request(e.to_string()))?;
        match name.as_str() {
            "template_id" => message.template_id = text.parse().ok(),
            "to" => message.email = text,
            "subject" => message.subject = text,
            "merge_fields" => {
                let fields = serde_json::from_str(&text).map_err(|e| ApiError::bad_request(e.to_string()))?;
                message.merge_fields = Some(fields);
            }
            _ => {}
        }
    }
    Ok(message)
}

async fn message_report(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let store = state.db.read().await;
    let message = Uuid::parse_str(&id)
        .ok()
        .and_then(|id| store.messages.get(&id))
        .ok_or_else(|| ApiError::not_found(format!("message={id} not found")))?;
    Ok(Json(json!({
        "id": message.id,
        "email": message.email,
        "template_id": message.template_id,
        "subject": message.subject,
        "merge_fields": message.merge_fields,
        "attachments": message.attachments,
        "in_transit": false,
        "delivered": true,
    })))
}
