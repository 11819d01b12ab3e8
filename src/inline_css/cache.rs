//! Caller-owned memoization of stylesheet outcomes
//!
//! A [`CacheBucket`] maps an effective base URL to a [`CacheEntry`], which in
//! turn maps each stylesheet source to the outcome of a previous run. Replaying
//! an entry reproduces the transformed CSS and its errors without fetching.

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;

use super::types::ResourceError;

/// Final result of loading one stylesheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetOutcome {
    /// CSS to place in the replacement `<style>`, `None` to just remove the element
    pub css: Option<String>,
    /// Whether the rule text was rewritten
    pub has_changes: bool,
    pub errors: Vec<ResourceError>,
}

impl SheetOutcome {
    /// Outcome of a stylesheet that could not be loaded at all
    #[must_use]
    pub fn failed(error: ResourceError) -> Self {
        Self {
            css: None,
            has_changes: false,
            errors: vec![error],
        }
    }

    /// Outcome of a stylesheet with no content
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn has_content(&self) -> bool {
        self.css.is_some()
    }
}

/// Outcomes recorded for one effective base URL, keyed per source
#[derive(Debug, Clone, Default)]
pub struct CacheEntry {
    outcomes: HashMap<String, SheetOutcome>,
}

impl CacheEntry {
    #[must_use]
    pub fn get(&self, source_key: &str) -> Option<&SheetOutcome> {
        self.outcomes.get(source_key)
    }

    pub fn insert(&mut self, source_key: String, outcome: SheetOutcome) {
        self.outcomes.insert(source_key, outcome);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Shared memoization store for inlining calls
///
/// Cloning is cheap and every clone sees the same entries, so one bucket can
/// be handed to concurrent calls. Concurrent calls for the same base URL may
/// both miss and both store; the later store wins per source.
#[derive(Debug, Clone, Default)]
pub struct CacheBucket {
    entries: Arc<DashMap<String, CacheEntry>>,
}

impl CacheBucket {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the outcome recorded for `source_key` under `base_url`
    #[must_use]
    pub fn lookup(&self, base_url: &str, source_key: &str) -> Option<SheetOutcome> {
        self.entries.get(base_url)?.get(source_key).cloned()
    }

    /// Record outcomes under `base_url`, keeping entries for other sources
    pub fn store(&self, base_url: &str, outcomes: impl IntoIterator<Item = (String, SheetOutcome)>) {
        let mut entry = self.entries.entry(base_url.to_string()).or_default();
        for (source_key, outcome) in outcomes {
            entry.insert(source_key, outcome);
        }
    }

    /// Snapshot of the entry stored under `base_url`
    #[must_use]
    pub fn entry(&self, base_url: &str) -> Option<CacheEntry> {
        self.entries.get(base_url).map(|entry| entry.value().clone())
    }

    #[must_use]
    pub fn contains_base_url(&self, base_url: &str) -> bool {
        self.entries.contains_key(base_url)
    }

    /// Number of base URLs with recorded outcomes
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
