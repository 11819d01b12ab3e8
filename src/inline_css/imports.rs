//! `@import` expansion
//!
//! Imports are replaced in place by the rules of the imported stylesheet,
//! recursively. An import qualified by media, `supports()` or `layer`
//! becomes nested `@layer`/`@supports`/`@media` blocks so the condition
//! survives inlining.

use std::future::Future;
use std::pin::Pin;

use super::resources::adjust_paths_of_css_resources;
use super::types::ResourceError;
use crate::css::{CssRule, CssRuleList, ImportRule, RuleKind};
use crate::fetch::{FetchOptions, ResourceFetcher};
use crate::utils::{MAX_IMPORT_DEPTH, resolve_url};

/// Result of [`load_css_imports`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    pub has_changes: bool,
    pub errors: Vec<ResourceError>,
}

/// Expand every `@import` of `rules` in place
///
/// `already_loaded` holds the resolved URLs loaded so far in this import
/// tree; an import of one of them is dropped instead of fetched again. A
/// failed import stays in place pointing at its resolved URL and records one
/// `stylesheet` error. Errors are returned in source order, nested imports
/// before the imports that follow them.
pub async fn load_css_imports<F: ResourceFetcher>(
    rules: &mut CssRuleList,
    already_loaded: &mut Vec<String>,
    options: &FetchOptions,
    fetcher: &F,
) -> ImportOutcome {
    expand(rules, already_loaded, options, fetcher, 0).await
}

type ExpandFuture<'a> = Pin<Box<dyn Future<Output = ImportOutcome> + Send + 'a>>;

fn expand<'a, F: ResourceFetcher>(
    rules: &'a mut CssRuleList,
    already_loaded: &'a mut Vec<String>,
    options: &'a FetchOptions,
    fetcher: &'a F,
    depth: usize,
) -> ExpandFuture<'a> {
    Box::pin(async move {
        let mut outcome = ImportOutcome::default();
        let mut index = 0;

        while let Some(rule) = rules.get(index) {
            if !rule.is_import() {
                index += 1;
                continue;
            }

            let Some(import) = ImportRule::parse(rule.text()) else {
                log::warn!("Skipping unparsable import rule: {}", rule.text());
                index += 1;
                continue;
            };
            let url = resolve_url(&import.href, options.base_url.as_deref());

            if already_loaded.contains(&url) {
                log::debug!("Dropping repeated import of {url}");
                rules.remove(index);
                outcome.has_changes = true;
                continue;
            }

            if depth >= MAX_IMPORT_DEPTH {
                log::warn!("Import depth limit ({MAX_IMPORT_DEPTH}) reached, leaving {url} unexpanded");
                index += 1;
                continue;
            }

            let css = match fetcher.fetch(&import.href, options).await {
                Ok(resource) => resource.text().map(str::to_string),
                Err(e) => Err(e),
            };

            let css = match css {
                Ok(css) => css,
                Err(e) => {
                    log::warn!("Failed to load imported stylesheet {url}: {e}");
                    let retained = ImportRule {
                        href: url.clone(),
                        ..import
                    }
                    .to_css();
                    if let Some(rule) = rules.iter_mut().nth(index)
                        && rule.text() != retained
                    {
                        rule.set_text(retained);
                        outcome.has_changes = true;
                    }
                    outcome.errors.push(ResourceError::stylesheet(url));
                    index += 1;
                    continue;
                }
            };

            already_loaded.push(url.clone());

            let mut imported = CssRuleList::parse(&css);
            adjust_paths_of_css_resources(&import.href, &mut imported);
            let nested = expand(&mut imported, already_loaded, options, fetcher, depth + 1).await;
            outcome.errors.extend(nested.errors);

            let replacement = if import.is_conditional() {
                vec![CssRule::new(wrapper_kind(&import), import.wrap(imported.serialize()))]
            } else {
                imported.into_rules()
            };

            log::debug!("Spliced {} rule(s) from {url}", replacement.len());
            index += rules.splice(index, replacement);
            outcome.has_changes = true;
        }

        outcome
    })
}

/// Kind of the outermost block [`ImportRule::wrap`] produces
fn wrapper_kind(import: &ImportRule) -> RuleKind {
    if import.layer.is_some() {
        RuleKind::Other("layer".to_string())
    } else if import.supports.is_some() {
        RuleKind::Other("supports".to_string())
    } else {
        RuleKind::Media
    }
}
