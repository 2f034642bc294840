//! Ready-made request hooks for alternate authentication.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::http::HttpRequest;

/// Hook that adds `Authorization: Basic <user:password>` to every request.
///
/// Some deployments (staging, the API's own test environment) sit behind
/// HTTP basic auth in addition to the `X-auth-key` header.
pub fn basic_auth_hook(
    user: impl Into<String>,
    password: impl Into<String>,
) -> impl Fn(&mut HttpRequest) + Send + Sync + 'static {
    let credentials = STANDARD.encode(format!("{}:{}", user.into(), password.into()));
    let value = format!("Basic {credentials}");
    move |request: &mut HttpRequest| request.set_header("Authorization", value.as_str())
}
