//! Core configuration types for stylesheet inlining
//!
//! This module contains the `InlineOptions` struct recognised by every
//! inlining entry point and the `FetchConfig` that tunes `HttpFetcher`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::inline_css::cache::CacheBucket;
use crate::utils::{
    CHROME_USER_AGENT, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_RESOURCE_SIZE,
    DEFAULT_RESPONSE_CACHE_CAPACITY,
};

/// Caching behaviour requested for one inlining call
///
/// Deserializes from a plain string: `"none"` bypasses every cache, any other
/// value keeps the default behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CacheMode {
    /// Fetch caches and the cache bucket are used
    #[default]
    Default,
    /// Fetches bypass caches and the cache bucket is neither read nor written
    Bypass,
}

impl From<String> for CacheMode {
    fn from(value: String) -> Self {
        if value == "none" {
            CacheMode::Bypass
        } else {
            CacheMode::Default
        }
    }
}

impl From<CacheMode> for String {
    fn from(mode: CacheMode) -> Self {
        match mode {
            CacheMode::Default => "default".to_string(),
            CacheMode::Bypass => "none".to_string(),
        }
    }
}

/// Options recognised by `inline_stylesheets` and friends
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InlineOptions {
    /// Override for the document's own base URL
    pub(crate) base_url: Option<String>,

    pub(crate) cache: CacheMode,

    /// Caller-owned memoization store shared across calls
    ///
    /// Keyed by effective base URL. Never read or written when `cache` is
    /// `CacheMode::Bypass`.
    #[serde(skip)]
    pub(crate) cache_bucket: Option<CacheBucket>,
}

/// Configuration for `HttpFetcher` timeouts, size limits and caching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Timeout for a single request
    pub(crate) timeout: Duration,

    /// Maximum size for a single response body (bytes)
    ///
    /// Enforced against `Content-Length` before downloading and again while
    /// streaming, since servers may omit or lie about the header.
    pub(crate) max_resource_size: usize,

    /// Number of responses kept in the in-memory LRU cache (0 disables it)
    pub(crate) response_cache_capacity: usize,

    pub(crate) user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            max_resource_size: DEFAULT_MAX_RESOURCE_SIZE,
            response_cache_capacity: DEFAULT_RESPONSE_CACHE_CAPACITY,
            user_agent: CHROME_USER_AGENT.to_string(),
        }
    }
}
