//! Client configuration.
//!
//! The key and root URL can be passed explicitly or read from the
//! environment:
//! - `EXPRESSPIGEON_AUTH_KEY`: API key (required when not passed explicitly)
//! - `EXPRESSPIGEON_ROOT`: API root, defaults to [`DEFAULT_ROOT`]
//! - `EXPRESSPIGEON_TIMEOUT_SECS`: whole-request timeout, unset means none

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PigeonError, PigeonResult};

pub const DEFAULT_ROOT: &str = "https://api.expresspigeon.com/";

pub const AUTH_KEY_ENV: &str = "EXPRESSPIGEON_AUTH_KEY";
pub const ROOT_ENV: &str = "EXPRESSPIGEON_ROOT";
pub const TIMEOUT_ENV: &str = "EXPRESSPIGEON_TIMEOUT_SECS";

/// Configuration for a [`PigeonClient`](crate::PigeonClient).
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub auth_key: String,
    #[serde(default = "default_root")]
    pub root: String,
    #[serde(default, with = "optional_secs")]
    pub timeout: Option<Duration>,
}

fn default_root() -> String {
    DEFAULT_ROOT.to_string()
}

mod optional_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        value.map(|d| d.as_secs()).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
    }
}

// The key is a credential; keep it out of logs.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("auth_key", &"<redacted>")
            .field("root", &self.root)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(auth_key: impl Into<String>) -> Self {
        Self {
            auth_key: auth_key.into(),
            root: default_root(),
            timeout: None,
        }
    }

    /// Load configuration from the environment.
    ///
    /// Fails with [`PigeonError::MissingAuthKey`] when the key variable is
    /// unset. No network activity happens here.
    pub fn from_env() -> PigeonResult<Self> {
        let auth_key = env::var(AUTH_KEY_ENV).map_err(|_| PigeonError::MissingAuthKey(AUTH_KEY_ENV))?;
        Self::from_env_with_key(auth_key)
    }

    /// Like [`ClientConfig::from_env`] but with an explicit key; only the
    /// root and timeout are taken from the environment.
    pub fn from_env_with_key(auth_key: impl Into<String>) -> PigeonResult<Self> {
        let mut config = Self::new(auth_key);
        if let Ok(root) = env::var(ROOT_ENV) {
            config.root = root;
        }
        if let Ok(raw) = env::var(TIMEOUT_ENV) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| PigeonError::config(format!("{TIMEOUT_ENV} must be a whole number of seconds, got {raw:?}")))?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn validate(&self) -> PigeonResult<()> {
        if self.auth_key.trim().is_empty() {
            return Err(PigeonError::MissingAuthKey(AUTH_KEY_ENV));
        }
        if !(self.root.starts_with("http://") || self.root.starts_with("https://")) {
            return Err(PigeonError::config(format!(
                "API root must be an http(s) URL, got {:?}",
                self.root
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_default_root() {
        let config = ClientConfig::new("key");
        assert_eq!(config.root, DEFAULT_ROOT);
        assert!(config.timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_key_is_rejected() {
        let err = ClientConfig::new("  ").validate().unwrap_err();
        assert!(matches!(err, PigeonError::MissingAuthKey(AUTH_KEY_ENV)));
    }

    #[test]
    fn non_http_root_is_rejected() {
        let err = ClientConfig::new("key").with_root("ftp://example.com").validate().unwrap_err();
        assert!(matches!(err, PigeonError::Config(_)));
    }

    #[test]
    fn debug_redacts_key() {
        let rendered = format!("{:?}", ClientConfig::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"auth_key":"k","timeout":5}"#).unwrap();
        assert_eq!(config.root, DEFAULT_ROOT);
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }
}
