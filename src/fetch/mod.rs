//! Resource fetching boundary
//!
//! The inliner never talks to the network directly. Every stylesheet, import
//! and `url(...)` target goes through a [`ResourceFetcher`], which receives the
//! URL exactly as written plus [`FetchOptions`] carrying the base URL and the
//! cache-bypass flag.
//!
//! Two implementations ship with the crate:
//! - [`HttpFetcher`] - reqwest based, with size limits and an LRU response cache
//! - [`MemoryFetcher`] - serves resources from memory and records every request

use base64::Engine;
use std::future::Future;
use thiserror::Error;

use crate::utils::FALLBACK_MIME_TYPE;

pub mod http;
pub mod memory;

pub use http::HttpFetcher;
pub use memory::{FetchRequest, MemoryFetcher};

/// Options passed along with every fetch
///
/// `FetchOptions::default()` is the "no options" value: no base URL and the
/// fetcher's normal caching. `bypass_cache` is only ever set when the caller
/// asked for `CacheMode::Bypass`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FetchOptions {
    /// Base URL the fetcher resolves relative URLs against
    pub base_url: Option<String>,
    /// Skip any response cache for this request
    pub bypass_cache: bool,
}

/// A successfully fetched resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResource {
    /// Fully resolved URL the content was retrieved from
    pub url: String,
    pub body: Vec<u8>,
    /// Value of the `Content-Type` header, if known
    pub content_type: Option<String>,
}

impl FetchedResource {
    #[must_use]
    pub fn new(url: impl Into<String>, body: impl Into<Vec<u8>>, content_type: Option<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
            content_type,
        }
    }

    /// Body decoded as UTF-8 text, without a leading byte order mark
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUtf8` when the body is not valid UTF-8.
    pub fn text(&self) -> Result<&str, FetchError> {
        let text = std::str::from_utf8(&self.body)
            .map_err(|_| FetchError::InvalidUtf8(self.url.clone()))?;
        Ok(text.trim_start_matches('\u{feff}'))
    }

    /// MIME type without parameters (`text/css; charset=utf-8` -> `text/css`)
    #[must_use]
    pub fn mime_type(&self) -> &str {
        self.content_type
            .as_deref()
            .and_then(|value| value.split(';').next())
            .map(str::trim)
            .filter(|essence| !essence.is_empty())
            .unwrap_or(FALLBACK_MIME_TYPE)
    }

    /// Encode the body as a base64 `data:` URI
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        let mime = self.mime_type();
        let encoded_capacity = base64::encoded_len(self.body.len(), true).unwrap_or(0);
        let mut encoded = String::with_capacity(encoded_capacity + 13 + mime.len());

        encoded.push_str("data:");
        encoded.push_str(mime);
        encoded.push_str(";base64,");

        base64::engine::general_purpose::STANDARD.encode_string(&self.body, &mut encoded);

        encoded
    }
}

/// Error types for resource fetching
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL could not be parsed into something fetchable
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported URL scheme '{scheme}' for {url}")]
    UnsupportedScheme { url: String, scheme: String },

    /// Non-success HTTP status
    #[error("Download of {url} failed with status: {status}")]
    Status { url: String, status: u16 },

    /// Body exceeded the configured size limit
    #[error("Resource {url} too large: {size} bytes exceeds limit of {limit} bytes")]
    TooLarge { url: String, size: u64, limit: usize },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource {0} is not valid UTF-8")]
    InvalidUtf8(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Performs the actual byte fetch for a URL
///
/// Implementations resolve `url` against `options.base_url` themselves and
/// must honor `options.bypass_cache`. Futures must be `Send` so callers can
/// drive an inlining run from a spawned task.
pub trait ResourceFetcher: Send + Sync {
    fn fetch(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> impl Future<Output = Result<FetchedResource, FetchError>> + Send;
}
