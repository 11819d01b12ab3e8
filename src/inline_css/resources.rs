//! `url(...)` resource handling inside stylesheets
//!
//! Two passes work on a parsed rule list:
//! - [`adjust_paths_of_css_resources`] re-expresses relative references so
//!   they are relative to the document base instead of the stylesheet
//! - [`load_and_inline_css_resources`] downloads every referenced image and
//!   font concurrently and embeds it as a base64 `data:` URI

use futures::future::join_all;
use std::collections::HashMap;

use super::types::{ResourceError, ResourceType};
use crate::css::{CssRule, CssRuleList, ImportRule, RuleKind, extract_url_tokens, rewrite_urls};
use crate::fetch::{FetchOptions, ResourceFetcher};
use crate::utils::{is_absolute_url, is_data_uri, resolve_url};

/// Result of [`load_and_inline_css_resources`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceOutcome {
    pub has_changes: bool,
    pub errors: Vec<ResourceError>,
}

/// Rewrite relative `url(...)` tokens and `@import` targets of `rules`
/// against `stylesheet_href`
///
/// A stylesheet at `below/some.css` referencing `../green.png` ends up
/// referencing `green.png`. Absolute URLs, `data:` URIs and fragment-only
/// references are left alone. Returns whether any rule changed.
pub fn adjust_paths_of_css_resources(stylesheet_href: &str, rules: &mut CssRuleList) -> bool {
    let mut changed = false;

    for rule in rules.iter_mut() {
        let rewritten = if rule.is_import() {
            ImportRule::parse(rule.text())
                .filter(|import| is_relative_reference(&import.href))
                .map(|mut import| {
                    import.href = resolve_url(&import.href, Some(stylesheet_href));
                    import.to_css()
                })
        } else {
            rewrite_urls(rule.text(), |url| {
                is_relative_reference(url).then(|| resolve_url(url, Some(stylesheet_href)))
            })
        };

        if let Some(text) = rewritten
            && text != rule.text()
        {
            rule.set_text(text);
            changed = true;
        }
    }

    changed
}

/// Download every resource referenced from `rules` and embed it as a `data:` URI
///
/// Each distinct URL is fetched once, all of them concurrently. A failed
/// download leaves the token pointing at the resolved URL and records one
/// error (`font` inside `@font-face`, `image` elsewhere). Errors follow the
/// order in which URLs first appear.
pub async fn load_and_inline_css_resources<F: ResourceFetcher>(
    rules: &mut CssRuleList,
    options: &FetchOptions,
    fetcher: &F,
) -> ResourceOutcome {
    let wanted = collect_resource_urls(rules);
    if wanted.is_empty() {
        return ResourceOutcome::default();
    }

    log::debug!("Inlining {} CSS resource(s)", wanted.len());

    let downloads = wanted.iter().map(|(url, resource_type)| async move {
        let resolved = resolve_url(url, options.base_url.as_deref());
        match fetcher.fetch(url, options).await {
            Ok(resource) => {
                log::debug!("Embedding {resolved} ({} bytes)", resource.body.len());
                Ok(resource.to_data_uri())
            }
            Err(e) => {
                log::warn!("Failed to load {resource_type} {resolved}: {e}");
                Err(ResourceError::unable_to_load(*resource_type, resolved))
            }
        }
    });
    let results = join_all(downloads).await;

    let mut replacements: HashMap<&str, String> = HashMap::with_capacity(wanted.len());
    let mut errors = Vec::new();
    for ((url, _), result) in wanted.iter().zip(results) {
        match result {
            Ok(data_uri) => {
                replacements.insert(url, data_uri);
            }
            Err(error) => {
                replacements.insert(url, error.url.clone());
                errors.push(error);
            }
        }
    }

    let mut has_changes = false;
    for rule in rules.iter_mut().filter(|rule| carries_resources(rule)) {
        if let Some(text) = rewrite_urls(rule.text(), |url| replacements.get(url).cloned()) {
            rule.set_text(text);
            has_changes = true;
        }
    }

    ResourceOutcome {
        has_changes,
        errors,
    }
}

/// Distinct inlinable URLs in first-seen order, with the type of the rule
/// they first appeared in
fn collect_resource_urls(rules: &CssRuleList) -> Vec<(String, ResourceType)> {
    let mut wanted: Vec<(String, ResourceType)> = Vec::new();

    for rule in rules.iter().filter(|rule| carries_resources(rule)) {
        let resource_type = if *rule.kind() == RuleKind::FontFace {
            ResourceType::Font
        } else {
            ResourceType::Image
        };

        for token in extract_url_tokens(rule.text()) {
            match token {
                Ok(token) if is_inlinable(&token.url) => {
                    if !wanted.iter().any(|(url, _)| *url == token.url) {
                        wanted.push((token.url, resource_type));
                    }
                }
                Ok(_) => {}
                Err(e) => log::warn!("Skipping unparsable CSS token: {e}"),
            }
        }
    }

    wanted
}

#[inline]
fn carries_resources(rule: &CssRule) -> bool {
    !matches!(rule.kind(), RuleKind::Import | RuleKind::Charset)
}

#[inline]
fn is_inlinable(url: &str) -> bool {
    !url.is_empty() && !url.starts_with('#') && !is_data_uri(url)
}

#[inline]
fn is_relative_reference(url: &str) -> bool {
    !url.is_empty() && !url.starts_with('#') && !is_absolute_url(url)
}
