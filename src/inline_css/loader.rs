//! Loading of a single stylesheet
//!
//! A link is fetched (an inline style already has its text), parsed into a
//! rule list, its imports expanded and its resources embedded. The outcome is
//! always a value: a stylesheet that cannot be fetched yields one error and no
//! content, leaving its siblings unaffected.

use super::cache::SheetOutcome;
use super::imports::load_css_imports;
use super::resources::{adjust_paths_of_css_resources, load_and_inline_css_resources};
use super::types::{ResourceError, StylesheetSource};
use crate::css::CssRuleList;
use crate::fetch::{FetchOptions, ResourceFetcher};
use crate::utils::resolve_url;

/// Produce the final CSS for one stylesheet source
///
/// Relative paths inside a linked stylesheet are first re-expressed against
/// the document base, then imports are expanded and resources inlined, with
/// import errors ahead of resource errors. When nothing was rewritten the
/// original text is kept verbatim.
pub async fn load_stylesheet<F: ResourceFetcher>(
    source: &StylesheetSource,
    options: &FetchOptions,
    fetcher: &F,
) -> SheetOutcome {
    let mut already_loaded = Vec::new();

    let (css, href) = match source {
        StylesheetSource::Link { href, .. } => {
            let url = resolve_url(href, options.base_url.as_deref());
            let fetched = match fetcher.fetch(href, options).await {
                Ok(resource) => resource.text().map(str::to_string),
                Err(e) => Err(e),
            };

            match fetched {
                Ok(css) => {
                    log::debug!("Loaded stylesheet {url} ({} bytes)", css.len());
                    already_loaded.push(url);
                    (css, Some(href.as_str()))
                }
                Err(e) => {
                    log::warn!("Failed to load stylesheet {url}: {e}");
                    return SheetOutcome::failed(ResourceError::stylesheet(url));
                }
            }
        }
        StylesheetSource::Inline { css, .. } => (css.clone(), None),
    };

    if css.is_empty() {
        return SheetOutcome::empty();
    }

    let mut rules = CssRuleList::parse(&css);
    let mut has_changes = false;

    if let Some(href) = href {
        has_changes |= adjust_paths_of_css_resources(href, &mut rules);
    }

    let imports = load_css_imports(&mut rules, &mut already_loaded, options, fetcher).await;
    let resources = load_and_inline_css_resources(&mut rules, options, fetcher).await;
    has_changes |= imports.has_changes || resources.has_changes;

    let mut errors = imports.errors;
    errors.extend(resources.errors);

    let css = if has_changes { rules.serialize() } else { css };

    SheetOutcome {
        css: (!css.is_empty()).then_some(css),
        has_changes,
        errors,
    }
}
