//! Request payloads and query parameters.
//!
//! # Design
//! `RequestOptions` is the per-call input to the transport core. The other
//! types are the structured inputs of the endpoint facades that take more
//! than a couple of arguments. They serialize to the exact JSON field names
//! the API expects; responses are not typed (see `Response`).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PigeonResult;
use crate::multipart::MultipartBody;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Body and content type of one call.
///
/// A raw `body` takes precedence over `params`. With neither, the request
/// body is `{}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub params: Option<Value>,
    pub body: Option<Vec<u8>>,
    pub content_type: Option<String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(mut self, params: impl Into<Value>) -> Self {
        self.params = Some(params.into());
        self
    }

    /// Params from any serializable value.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> PigeonResult<Self> {
        Ok(Self::new().params(serde_json::to_value(value)?))
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Raw body and content type taken from an encoded multipart form.
    pub fn multipart(form: MultipartBody) -> Self {
        let content_type = form.content_type();
        Self::new().body(form.body).content_type(content_type)
    }

    pub(crate) fn content_type_or_default(&self) -> &str {
        self.content_type.as_deref().unwrap_or(JSON_CONTENT_TYPE)
    }

    pub(crate) fn encode_body(&self) -> PigeonResult<Vec<u8>> {
        if let Some(body) = &self.body {
            return Ok(body.clone());
        }
        match &self.params {
            Some(params) => Ok(serde_json::to_vec(params)?),
            None => Ok(b"{}".to_vec()),
        }
    }
}

/// Campaign to send now or schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CampaignRequest {
    pub list_id: i64,
    pub template_id: i64,
    pub name: String,
    pub from_name: String,
    pub reply_to: String,
    pub subject: String,
    pub google_analytics: bool,
    /// ISO-8601 send time; set by `CampaignsApi::schedule`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_for: Option<String>,
}

impl CampaignRequest {
    pub fn new(
        list_id: i64,
        template_id: i64,
        name: impl Into<String>,
        from_name: impl Into<String>,
        reply_to: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            list_id,
            template_id,
            name: name.into(),
            from_name: from_name.into(),
            reply_to: reply_to.into(),
            subject: subject.into(),
            google_analytics: false,
            schedule_for: None,
        }
    }

    pub fn with_google_analytics(mut self, enabled: bool) -> Self {
        self.google_analytics = enabled;
        self
    }
}

/// Filters for listing campaigns. Dates are only sent as a pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampaignQuery {
    pub from_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl CampaignQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_id(mut self, from_id: i64) -> Self {
        self.from_id = Some(from_id);
        self
    }

    pub fn between(mut self, start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        self.start_date = Some(start_date.into());
        self.end_date = Some(end_date.into());
        self
    }

    pub(crate) fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(from_id) = self.from_id {
            pairs.push(("from_id", from_id.to_string()));
        }
        if let (Some(start), Some(end)) = (&self.start_date, &self.end_date) {
            pairs.push(("start_date", start.clone()));
            pairs.push(("end_date", end.clone()));
        }
        pairs
    }
}

/// A single transactional message.
///
/// Template merge values go in `merge_fields`; files in `attachments` switch
/// the send to a multipart upload.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MessageRequest {
    pub template_id: i64,
    pub to: String,
    pub reply_to: String,
    #[serde(rename = "from")]
    pub from_name: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_fields: Option<Map<String, Value>>,
    pub view_online: bool,
    pub click_tracking: bool,
    #[serde(skip)]
    pub attachments: Vec<PathBuf>,
}

impl MessageRequest {
    pub fn new(
        template_id: i64,
        to: impl Into<String>,
        reply_to: impl Into<String>,
        from_name: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            template_id,
            to: to.into(),
            reply_to: reply_to.into(),
            from_name: from_name.into(),
            subject: subject.into(),
            merge_fields: None,
            view_online: false,
            click_tracking: true,
            attachments: Vec::new(),
        }
    }

    pub fn merge_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.merge_fields
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn view_online(mut self, enabled: bool) -> Self {
        self.view_online = enabled;
        self
    }

    pub fn click_tracking(mut self, enabled: bool) -> Self {
        self.click_tracking = enabled;
        self
    }

    pub fn attachment(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachments.push(path.into());
        self
    }
}

/// Paging and period for the transactional message report.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageReportQuery {
    pub page: i64,
    pub page_size: i64,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl MessageReportQuery {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page,
            page_size,
            start_date: None,
            end_date: None,
        }
    }

    pub fn between(mut self, start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        self.start_date = Some(start_date.into());
        self.end_date = Some(end_date.into());
        self
    }

    pub(crate) fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("page_size", self.page_size.to_string())];
        if let (Some(start), Some(end)) = (&self.start_date, &self.end_date) {
            pairs.push(("start_date", start.clone()));
            pairs.push(("end_date", end.clone()));
        }
        pairs
    }
}
