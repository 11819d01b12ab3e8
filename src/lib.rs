pub mod config;
pub mod css;
pub mod fetch;
pub mod inline_css;
pub mod utils;

pub use config::{CacheMode, FetchConfig, InlineOptions};
pub use css::{CssRule, CssRuleList, RuleKind};
pub use fetch::{FetchError, FetchOptions, FetchedResource, HttpFetcher, MemoryFetcher, ResourceFetcher};
pub use inline_css::{
    CacheBucket, InliningResult, ResourceError, ResourceType, StyledDocument, inline_html,
    inline_stylesheets, inline_stylesheets_with_callback,
};
pub use utils::resolve_url;
