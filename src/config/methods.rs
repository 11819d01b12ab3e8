//! Builder-style setters for the configuration types
//!
//! All setters consume and return `Self` so options can be assembled in a
//! single expression.

use std::time::Duration;

use super::types::{CacheMode, FetchConfig, InlineOptions};
use crate::inline_css::cache::CacheBucket;

impl InlineOptions {
    /// Create options with every field at its default
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative references against this URL instead of the
    /// document's own base URL
    ///
    /// # Example
    ///
    /// ```rust
    /// # use kodegen_tools_inline_css::config::InlineOptions;
    /// let options = InlineOptions::new().base_url("https://example.com/docs/");
    /// assert_eq!(options.base_url_override(), Some("https://example.com/docs/"));
    /// ```
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn cache(mut self, cache: CacheMode) -> Self {
        self.cache = cache;
        self
    }

    /// Memoize outcomes in `bucket`, keyed by effective base URL
    ///
    /// The bucket is a cheap handle; clone it to share one store between
    /// calls (including concurrent ones).
    #[must_use]
    pub fn cache_bucket(mut self, bucket: CacheBucket) -> Self {
        self.cache_bucket = Some(bucket);
        self
    }
}

impl FetchConfig {
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn max_resource_size(mut self, bytes: usize) -> Self {
        self.max_resource_size = bytes;
        self
    }

    /// Set the LRU response cache capacity; `0` disables response caching
    #[must_use]
    pub fn response_cache_capacity(mut self, entries: usize) -> Self {
        self.response_cache_capacity = entries;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
