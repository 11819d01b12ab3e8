//! Stylesheet inlining
//!
//! This module turns every `<link rel="stylesheet">` and `<style>` element of
//! an HTML document into a self-contained `<style>` block: `@import` rules are
//! expanded in place and images and fonts referenced through `url(...)` are
//! embedded as base64 `data:` URIs.

// Sub-modules
pub mod cache;
pub mod document;
pub mod imports;
pub mod loader;
pub mod orchestrator;
pub mod resources;
pub mod types;

// Re-exports for public API
pub use cache::{CacheBucket, CacheEntry, SheetOutcome};
pub use document::{ScannedStylesheet, StyledDocument};
pub use imports::{ImportOutcome, load_css_imports};
pub use loader::load_stylesheet;
pub use orchestrator::{inline_html, inline_stylesheets, inline_stylesheets_with_callback, load_stylesheets};
pub use resources::{ResourceOutcome, adjust_paths_of_css_resources, load_and_inline_css_resources};
pub use types::{InliningResult, ResourceError, ResourceType, StylesheetSource};
