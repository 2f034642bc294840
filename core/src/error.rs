//! Error types for the ExpressPigeon client.
//!
//! # Design
//! Only failures that prevent a response from being read become errors.
//! An HTTP 4xx/5xx with a JSON body is a normal `Response` the caller
//! inspects through `code()`, `status()` and `message()`.

use std::path::PathBuf;
use std::string::FromUtf8Error;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type PigeonResult<T> = Result<T, PigeonError>;

/// Errors returned by `PigeonClient` and the endpoint facades.
#[derive(Error, Debug)]
pub enum PigeonError {
    /// No key was passed and `EXPRESSPIGEON_AUTH_KEY` is unset.
    #[error("you must provide an ExpressPigeon API key (set {0})")]
    MissingAuthKey(&'static str),

    #[error("configuration error: {0}")]
    Config(String),

    /// Connection, DNS, TLS, timeout or body read failure.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response body is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),

    /// An upload or attachment file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PigeonError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// True for failures raised before any request was attempted.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::MissingAuthKey(_) | Self::Config(_))
    }
}

impl From<ureq::Error> for PigeonError {
    fn from(err: ureq::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
