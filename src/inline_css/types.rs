//! Type definitions for stylesheet inlining

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::resolve_url;

/// Resource type for error tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Stylesheet,
    Image,
    Font,
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceType::Stylesheet => write!(f, "stylesheet"),
            ResourceType::Image => write!(f, "image"),
            ResourceType::Font => write!(f, "font"),
        }
    }
}

/// Error information for a resource that could not be loaded
///
/// Serializes as `{"resourceType": "...", "url": "...", "msg": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{msg}")]
pub struct ResourceError {
    pub resource_type: ResourceType,
    /// Fully resolved URL that failed
    pub url: String,
    pub msg: String,
}

impl ResourceError {
    #[must_use]
    pub fn unable_to_load(resource_type: ResourceType, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            msg: format!("Unable to load {resource_type} {url}"),
            resource_type,
            url,
        }
    }

    #[must_use]
    pub fn stylesheet(url: impl Into<String>) -> Self {
        Self::unable_to_load(ResourceType::Stylesheet, url)
    }
}

/// One qualifying stylesheet element, detached from the DOM
///
/// `index` is the element's position among all qualifying elements in tree
/// order. Only owned data lives here so loaders can run on any task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StylesheetSource {
    /// `<link rel="stylesheet" href="...">`
    Link {
        index: usize,
        href: String,
        media: Option<String>,
    },
    /// `<style>...</style>`
    Inline {
        index: usize,
        css: String,
        media: Option<String>,
    },
}

impl StylesheetSource {
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            StylesheetSource::Link { index, .. } | StylesheetSource::Inline { index, .. } => *index,
        }
    }

    /// Value of the element's `media` attribute
    #[must_use]
    pub fn media(&self) -> Option<&str> {
        match self {
            StylesheetSource::Link { media, .. } | StylesheetSource::Inline { media, .. } => {
                media.as_deref()
            }
        }
    }

    #[must_use]
    pub fn is_link(&self) -> bool {
        matches!(self, StylesheetSource::Link { .. })
    }

    /// Key identifying this source inside a cache entry
    ///
    /// Links are keyed by their resolved href, inline styles by their text.
    #[must_use]
    pub fn cache_key(&self, base_url: Option<&str>) -> String {
        match self {
            StylesheetSource::Link { href, .. } => format!("link:{}", resolve_url(href, base_url)),
            StylesheetSource::Inline { css, .. } => format!("style:{css}"),
        }
    }
}

/// Result of inlining a serialized HTML document
#[derive(Debug, Clone)]
pub struct InliningResult {
    pub html: String,
    /// Stylesheet elements replaced by an inlined `<style>`
    pub successes: usize,
    pub failures: Vec<ResourceError>,
}

impl InliningResult {
    /// Total number of outcomes recorded
    #[must_use]
    pub fn total(&self) -> usize {
        self.successes + self.failures.len()
    }

    /// Check if any failures occurred
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Get failure rate as a ratio between 0.0 and 1.0
    #[must_use]
    pub fn failure_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.failures.len() as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message() {
        let error = ResourceError::stylesheet("some_base_url/a.css");

        assert_eq!(error.resource_type, ResourceType::Stylesheet);
        assert_eq!(error.msg, "Unable to load stylesheet some_base_url/a.css");
        assert_eq!(error.to_string(), error.msg);
    }

    #[test]
    fn test_cache_key_resolves_links() {
        let link = StylesheetSource::Link {
            index: 0,
            href: "a.css".to_string(),
            media: None,
        };
        let inline = StylesheetSource::Inline {
            index: 1,
            css: "p {}".to_string(),
            media: Some("print".to_string()),
        };

        assert_eq!(link.cache_key(Some("https://example.com/")), "link:https://example.com/a.css");
        assert_eq!(inline.cache_key(Some("https://example.com/")), "style:p {}");
        assert_eq!(inline.media(), Some("print"));
        assert_eq!(inline.index(), 1);
    }

    #[test]
    fn test_failure_rate() {
        let result = InliningResult {
            html: String::new(),
            successes: 3,
            failures: vec![ResourceError::unable_to_load(ResourceType::Font, "f.woff")],
        };

        assert_eq!(result.total(), 4);
        assert!(result.has_failures());
        assert!((result.failure_rate() - 0.25).abs() < f64::EPSILON);
    }
}
