//! In-memory fetcher
//!
//! Serves pre-registered resources without touching the network. Useful for
//! inlining pages whose assets are already at hand (offline bundles) and for
//! tests, since it records every request it receives together with the
//! options it was called with.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::time::Duration;

use super::{FetchError, FetchOptions, FetchedResource, ResourceFetcher};
use crate::utils::resolve_url;

/// One request observed by a [`MemoryFetcher`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub options: FetchOptions,
}

#[derive(Debug, Clone)]
struct StoredResource {
    body: Vec<u8>,
    content_type: Option<String>,
    delay: Option<Duration>,
}

/// [`ResourceFetcher`] backed by an in-memory map
///
/// Lookups try the URL resolved against `options.base_url` first and fall
/// back to the URL exactly as requested.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    resources: DashMap<String, StoredResource>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl MemoryFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a text resource (stylesheet)
    #[must_use]
    pub fn with_text(self, url: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(url, text.into().into_bytes(), Some("text/css"));
        self
    }

    /// Register a binary resource with its content type
    #[must_use]
    pub fn with_resource(
        self,
        url: impl Into<String>,
        body: impl Into<Vec<u8>>,
        content_type: &str,
    ) -> Self {
        self.insert(url, body, Some(content_type));
        self
    }

    /// Delay the response for `url`, to exercise out-of-order completion
    #[must_use]
    pub fn with_delay(self, url: &str, delay: Duration) -> Self {
        if let Some(mut stored) = self.resources.get_mut(url) {
            stored.delay = Some(delay);
        }
        self
    }

    pub fn insert(&self, url: impl Into<String>, body: impl Into<Vec<u8>>, content_type: Option<&str>) {
        self.resources.insert(
            url.into(),
            StoredResource {
                body: body.into(),
                content_type: content_type.map(str::to_string),
                delay: None,
            },
        );
    }

    /// Every request received so far, in arrival order
    #[must_use]
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().clone()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Forget recorded requests, keeping registered resources
    pub fn reset(&self) {
        self.requests.lock().clear();
    }

    fn lookup(&self, url: &str, options: &FetchOptions) -> Option<(String, StoredResource)> {
        let resolved = resolve_url(url, options.base_url.as_deref());
        [resolved, url.to_string()].into_iter().find_map(|key| {
            let stored = self.resources.get(&key)?.value().clone();
            Some((key, stored))
        })
    }
}

impl ResourceFetcher for MemoryFetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<FetchedResource, FetchError> {
        self.requests.lock().push(FetchRequest {
            url: url.to_string(),
            options: options.clone(),
        });

        let Some((key, stored)) = self.lookup(url, options) else {
            return Err(FetchError::NotFound(resolve_url(
                url,
                options.base_url.as_deref(),
            )));
        };

        if let Some(delay) = stored.delay {
            tokio::time::sleep(delay).await;
        }

        Ok(FetchedResource::new(key, stored.body, stored.content_type))
    }
}
