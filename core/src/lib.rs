//! Blocking client for the ExpressPigeon email marketing REST API.
//!
//! # Overview
//! `PigeonClient` sends authenticated JSON or multipart requests to the API
//! root and decodes every JSON reply into a [`Response`], including 4xx/5xx
//! error payloads. Callers inspect `code`, `status` and `message` on the
//! returned document; only transport failures and undecodable bodies come
//! back as `Err`.
//!
//! # Design
//! - Resource operations live on per-resource facades (`client.lists()`,
//!   `client.contacts()`, ...). Each one formats a path and delegates to the
//!   client's `get`/`post`/`put`/`delete`.
//! - Request building and response parsing are pure and public, with the
//!   round-trip behind the [`Transport`] trait (ureq by default), so tests
//!   and custom hosts can run without a network.
//! - A per-handle request hook can rewrite each outgoing request, e.g. to add
//!   HTTP basic auth via [`basic_auth_hook`].
//!
//! ```no_run
//! use expresspigeon::PigeonClient;
//!
//! let client = PigeonClient::from_env()?;
//! let res = client.lists().create("Active customers", "Bob", "bob@acmetools.com")?;
//! if res.is_error() {
//!     eprintln!("{}", res.message().unwrap_or_default());
//! }
//! # Ok::<(), expresspigeon::PigeonError>(())
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod multipart;
pub mod response;
pub mod transport;
pub mod types;

pub use auth::basic_auth_hook;
pub use client::{PigeonClient, RequestHook};
pub use config::ClientConfig;
pub use endpoints::{
    AutoRespondersApi, CampaignsApi, ContactsApi, DictionariesApi, FlowsApi, ListsApi, MessagesApi, TemplatesApi,
};
pub use error::{PigeonError, PigeonResult};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use multipart::{Multipart, MultipartBody};
pub use response::{Response, StreamBody};
pub use transport::{Transport, UreqTransport};
pub use types::{CampaignQuery, CampaignRequest, MessageReportQuery, MessageRequest, RequestOptions};
