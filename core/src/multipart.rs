//! `multipart/form-data` body encoder (RFC 7578).
//!
//! Used by the CSV upload, transactional sends with attachments and the bulk
//! archive send. The boundary is a fresh 30-character alphanumeric token per
//! body, picked when the body is finished so it can be checked against the
//! part contents; a token that occurs inside any part is discarded and a new
//! one drawn.

use std::path::Path;

use rand::distributions::{Alphanumeric, DistString};

use crate::error::{PigeonError, PigeonResult};

const BOUNDARY_LEN: usize = 30;
const CRLF: &[u8] = b"\r\n";

#[derive(Debug, Clone)]
struct Part {
    name: String,
    filename: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

/// Builder for a multipart body. Parts are written in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Multipart {
    parts: Vec<Part>,
}

/// A finished multipart body together with its boundary.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    pub boundary: String,
    pub body: Vec<u8>,
}

impl MultipartBody {
    /// Value for the `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }
}

impl Multipart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(Part {
            name: name.into(),
            filename: None,
            content_type: None,
            data: value.into().into_bytes(),
        });
        self
    }

    pub fn file(mut self, name: impl Into<String>, filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.parts.push(Part {
            name: name.into(),
            filename: Some(filename.into()),
            content_type: Some("application/octet-stream".to_string()),
            data: data.into(),
        });
        self
    }

    /// Add a file part read from disk, named after the path's final component.
    ///
    /// The file is read in full and closed before this returns.
    pub fn file_path(self, name: impl Into<String>, path: impl AsRef<Path>) -> PigeonResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| PigeonError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        Ok(self.file(name, filename, data))
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Encode the body with a random boundary that does not occur in any part.
    pub fn finish(self) -> MultipartBody {
        let mut rng = rand::thread_rng();
        loop {
            let boundary = Alphanumeric.sample_string(&mut rng, BOUNDARY_LEN);
            if !self.collides(&boundary) {
                return self.finish_with_boundary(boundary);
            }
        }
    }

    /// Encode the body with a caller-chosen boundary. No collision check.
    pub fn finish_with_boundary(self, boundary: impl Into<String>) -> MultipartBody {
        let boundary = boundary.into();
        let mut body = Vec::new();

        for part in &self.parts {
            body.extend_from_slice(b"--");
            body.extend_from_slice(boundary.as_bytes());
            body.extend_from_slice(CRLF);

            let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", escape_quoted(&part.name));
            if let Some(filename) = &part.filename {
                disposition.push_str(&format!("; filename=\"{}\"", escape_quoted(filename)));
            }
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(CRLF);

            if let Some(content_type) = &part.content_type {
                body.extend_from_slice(format!("Content-Type: {content_type}").as_bytes());
                body.extend_from_slice(CRLF);
            }
            body.extend_from_slice(CRLF);
            body.extend_from_slice(&part.data);
            body.extend_from_slice(CRLF);
        }

        body.extend_from_slice(b"--");
        body.extend_from_slice(boundary.as_bytes());
        body.extend_from_slice(b"--");
        body.extend_from_slice(CRLF);

        MultipartBody { boundary, body }
    }

    fn collides(&self, boundary: &str) -> bool {
        let needle = boundary.as_bytes();
        self.parts.iter().any(|part| {
            contains(&part.data, needle)
                || part.name.contains(boundary)
                || part.filename.as_deref().is_some_and(|f| f.contains(boundary))
        })
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}

/// Percent-encode the characters that would break a quoted header parameter.
fn escape_quoted(value: &str) -> String {
    value.replace('"', "%22").replace('\r', "%0D").replace('\n', "%0A")
}
