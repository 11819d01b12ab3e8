//! Configuration module for stylesheet inlining
//!
//! This module provides the per-call `InlineOptions` and the `FetchConfig`
//! used by the HTTP fetcher, both with sensible defaults and builder-style
//! setters.

// Sub-modules
pub mod getters;
pub mod methods;
pub mod types;

// Re-exports for public API
pub use types::{CacheMode, FetchConfig, InlineOptions};
