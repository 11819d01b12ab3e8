//! Shared configuration constants for stylesheet inlining

/// Browser user agent sent with every HTTP fetch
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Default timeout for a single resource fetch: 30 seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Default maximum body size for a single fetched resource: 5MB
pub const DEFAULT_MAX_RESOURCE_SIZE: usize = 5 * 1024 * 1024;

/// Default number of responses kept by the HTTP fetcher's LRU cache
pub const DEFAULT_RESPONSE_CACHE_CAPACITY: usize = 256;

/// Maximum nesting depth for `@import` expansion
///
/// Import chains deeper than this are left unexpanded.
pub const MAX_IMPORT_DEPTH: usize = 16;

/// MIME type used for data URIs when the fetcher reports no content type
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";
