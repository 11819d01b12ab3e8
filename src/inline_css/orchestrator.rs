//! Stylesheet inlining orchestration
//!
//! This module coordinates the concurrent loading of every stylesheet in a
//! document, the cache bucket, and the final write-back into the DOM.

use anyhow::Result;
use futures::future::join_all;

use super::cache::SheetOutcome;
use super::document::{StyledDocument, apply_outcomes};
use super::loader::load_stylesheet;
use super::types::{InliningResult, ResourceError, StylesheetSource};
use crate::config::InlineOptions;
use crate::fetch::ResourceFetcher;

/// Inline every qualifying stylesheet of `document` in place
///
/// Each `<link rel="stylesheet">` and `<style>` is replaced at its position by
/// a `<style type="text/css">` holding the fully inlined CSS, or removed when
/// it yields no content. Returns the errors of all stylesheets in document
/// order. The DOM is only touched after every stylesheet has settled.
pub async fn inline_stylesheets<F: ResourceFetcher>(
    document: &StyledDocument,
    options: &InlineOptions,
    fetcher: &F,
) -> Vec<ResourceError> {
    let base_url = effective_base_url(document, options);
    let scanned = document.scan_stylesheets();

    if scanned.is_empty() {
        log::debug!("No stylesheets to inline");
        return Vec::new();
    }

    let sources: Vec<StylesheetSource> = scanned.iter().map(|stylesheet| stylesheet.source.clone()).collect();
    let outcomes = load_stylesheets(&sources, base_url.as_deref(), options, fetcher).await;
    let errors = collect_errors(&outcomes);

    let replaced = apply_outcomes(scanned, outcomes);
    log::debug!(
        "Inlined {replaced} of {} stylesheet(s) with {} error(s)",
        sources.len(),
        errors.len()
    );

    errors
}

/// Like [`inline_stylesheets`], delivering the errors to `on_complete`
///
/// `on_complete` runs exactly once, after the document has been updated and
/// the cache bucket written.
pub async fn inline_stylesheets_with_callback<F, C>(
    document: &StyledDocument,
    options: &InlineOptions,
    fetcher: &F,
    on_complete: C,
) where
    F: ResourceFetcher,
    C: FnOnce(Vec<ResourceError>),
{
    let errors = inline_stylesheets(document, options, fetcher).await;
    on_complete(errors);
}

/// Inline the stylesheets of serialized HTML
///
/// The document is parsed and scanned up front, then dropped before any
/// fetch so the returned future is `Send`; the write-back re-parses the same
/// HTML, which yields the same elements in the same order.
///
/// # Errors
///
/// Returns an error only if the updated document cannot be serialized.
/// Resource failures are reported in `InliningResult::failures`.
pub async fn inline_html<F: ResourceFetcher>(
    html: String,
    document_url: Option<&str>,
    options: &InlineOptions,
    fetcher: &F,
) -> Result<InliningResult> {
    let (sources, base_url) = {
        let document = parse_document(&html, document_url);
        let sources: Vec<StylesheetSource> = document
            .scan_stylesheets()
            .into_iter()
            .map(|stylesheet| stylesheet.source)
            .collect();
        (sources, effective_base_url(&document, options))
        // document is dropped here, safe to proceed with async operations
    };

    if sources.is_empty() {
        return Ok(InliningResult {
            html,
            successes: 0,
            failures: Vec::new(),
        });
    }

    let outcomes = load_stylesheets(&sources, base_url.as_deref(), options, fetcher).await;
    let failures = collect_errors(&outcomes);

    let document = parse_document(&html, document_url);
    let successes = apply_outcomes(document.scan_stylesheets(), outcomes);

    Ok(InliningResult {
        html: document.to_html()?,
        successes,
        failures,
    })
}

/// Load `sources` concurrently, replaying cached outcomes where available
///
/// Outcomes come back in the order of `sources`. With an active cache bucket
/// every outcome is stored under `base_url` before returning.
pub async fn load_stylesheets<F: ResourceFetcher>(
    sources: &[StylesheetSource],
    base_url: Option<&str>,
    options: &InlineOptions,
    fetcher: &F,
) -> Vec<SheetOutcome> {
    let fetch_options = &options.fetch_options(base_url);
    let bucket = options.active_cache_bucket();
    let bucket_key = base_url.unwrap_or_default();
    let keys: Vec<String> = sources.iter().map(|source| source.cache_key(base_url)).collect();

    let cached: Vec<Option<SheetOutcome>> = keys
        .iter()
        .map(|key| bucket.and_then(|bucket| bucket.lookup(bucket_key, key)))
        .collect();
    let hits = cached.iter().filter(|hit| hit.is_some()).count();
    if hits > 0 {
        log::debug!("Replaying {hits} cached stylesheet(s) for '{bucket_key}'");
    }

    let loads = sources.iter().zip(cached).map(|(source, hit)| async move {
        match hit {
            Some(outcome) => outcome,
            None => load_stylesheet(source, fetch_options, fetcher).await,
        }
    });
    let outcomes = join_all(loads).await;

    if let Some(bucket) = bucket {
        bucket.store(bucket_key, keys.into_iter().zip(outcomes.iter().cloned()));
        log::debug!("Stored {} stylesheet outcome(s) for '{bucket_key}'", outcomes.len());
    }

    outcomes
}

fn parse_document(html: &str, document_url: Option<&str>) -> StyledDocument {
    let document = StyledDocument::parse(html);
    match document_url {
        Some(url) => document.with_url(url),
        None => document,
    }
}

/// The `base_url` option if set, else the document's own base URL
fn effective_base_url(document: &StyledDocument, options: &InlineOptions) -> Option<String> {
    options
        .base_url_override()
        .map(str::to_string)
        .or_else(|| document.base_url())
}

fn collect_errors(outcomes: &[SheetOutcome]) -> Vec<ResourceError> {
    outcomes
        .iter()
        .flat_map(|outcome| outcome.errors.iter().cloned())
        .collect()
}
