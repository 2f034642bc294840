//! Decoded API responses.
//!
//! # Design
//! The API returns differently shaped JSON per endpoint, and success and
//! error payloads differ even for the same endpoint. `Response` therefore
//! wraps a `serde_json::Value` and offers read-only accessors instead of a
//! fixed schema. Callers who want compile-time field names can decode into
//! their own struct with [`Response::deserialize`].

use std::fmt;
use std::ops::Index;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::PigeonResult;

/// A decoded JSON response body. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    value: Value,
}

impl Response {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// Decode a UTF-8 JSON body.
    pub fn from_slice(body: &[u8]) -> PigeonResult<Self> {
        let text = String::from_utf8(body.to_vec())?;
        Ok(Self::new(serde_json::from_str(&text)?))
    }

    /// Field of a JSON object by key. `None` for missing keys and non-objects.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.value.get(key)
    }

    /// Nested lookup with a JSON pointer, e.g. `"/list/id"`.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        self.value.pointer(pointer)
    }

    pub fn code(&self) -> Option<i64> {
        self.value.get("code").and_then(Value::as_i64)
    }

    pub fn status(&self) -> Option<&str> {
        self.value.get("status").and_then(Value::as_str)
    }

    pub fn message(&self) -> Option<&str> {
        self.value.get("message").and_then(Value::as_str)
    }

    /// True when the payload reports an application-level failure.
    pub fn is_error(&self) -> bool {
        self.status() == Some("error") || self.code().is_some_and(|code| code >= 400)
    }

    pub fn is_array(&self) -> bool {
        self.value.is_array()
    }

    /// Elements of a top-level array; empty for any other shape.
    pub fn items(&self) -> &[Value] {
        self.value.as_array().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Decode into a caller-defined type.
    pub fn deserialize<T: DeserializeOwned>(&self) -> PigeonResult<T> {
        Ok(serde_json::from_value(self.value.clone())?)
    }
}

impl Index<&str> for Response {
    type Output = Value;

    /// Missing keys index to `Value::Null`, as with `serde_json::Value`.
    fn index(&self, key: &str) -> &Value {
        &self.value[key]
    }
}

impl Index<usize> for Response {
    type Output = Value;

    fn index(&self, idx: usize) -> &Value {
        &self.value[idx]
    }
}

impl From<Value> for Response {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Body returned by `read_stream` endpoints (CSV exports).
#[derive(Debug, Clone, PartialEq)]
pub enum StreamBody {
    /// The body exactly as sent by the server.
    Text(String),
    /// A JSON error payload sent with a non-2xx status.
    Error(Response),
}

impl StreamBody {
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamBody::Text(text) => Some(text),
            StreamBody::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&Response> {
        match self {
            StreamBody::Text(_) => None,
            StreamBody::Error(resp) => Some(resp),
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            StreamBody::Text(text) => Some(text),
            StreamBody::Error(_) => None,
        }
    }
}
