//! Getter methods for the configuration types

use std::time::Duration;

use super::types::{CacheMode, FetchConfig, InlineOptions};
use crate::fetch::FetchOptions;
use crate::inline_css::cache::CacheBucket;

impl InlineOptions {
    #[must_use]
    pub fn base_url_override(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    #[must_use]
    pub fn cache_mode(&self) -> CacheMode {
        self.cache
    }

    #[must_use]
    pub fn bypass_cache(&self) -> bool {
        self.cache == CacheMode::Bypass
    }

    /// The cache bucket to use for this call, if any
    ///
    /// Returns `None` when caching is bypassed, even if a bucket was supplied.
    #[must_use]
    pub fn active_cache_bucket(&self) -> Option<&CacheBucket> {
        if self.bypass_cache() {
            None
        } else {
            self.cache_bucket.as_ref()
        }
    }

    /// Options handed to the fetcher for every request of this call
    ///
    /// With the default cache mode and no base URL this is exactly
    /// `FetchOptions::default()`.
    #[must_use]
    pub fn fetch_options(&self, base_url: Option<&str>) -> FetchOptions {
        FetchOptions {
            base_url: base_url.map(str::to_string),
            bypass_cache: self.bypass_cache(),
        }
    }
}

impl FetchConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn resource_size_limit(&self) -> usize {
        self.max_resource_size
    }

    #[must_use]
    pub fn cache_capacity(&self) -> usize {
        self.response_cache_capacity
    }

    #[must_use]
    pub fn user_agent_header(&self) -> &str {
        &self.user_agent
    }
}
