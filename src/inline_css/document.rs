//! kuchiki document adapter
//!
//! Locates qualifying stylesheet elements in tree order and writes the
//! inlined results back in place. DOM nodes are reference counted and not
//! `Send`, so scanning hands out owned [`StylesheetSource`] values for the
//! loaders and keeps the nodes here for the write-back.

use anyhow::{Context, Result};
use kuchiki::NodeRef;
use kuchiki::traits::{NodeIterator, TendrilSink};

use super::cache::SheetOutcome;
use super::types::StylesheetSource;
use crate::utils::resolve_url;

/// A parsed HTML document together with the URL it was loaded from
pub struct StyledDocument {
    root: NodeRef,
    url: Option<String>,
}

/// A qualifying element and the source scanned from it
pub struct ScannedStylesheet {
    pub(crate) node: NodeRef,
    pub source: StylesheetSource,
}

impl StyledDocument {
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self {
            root: kuchiki::parse_html().one(html),
            url: None,
        }
    }

    /// Wrap an already parsed tree
    #[must_use]
    pub fn from_node(root: NodeRef) -> Self {
        Self { root, url: None }
    }

    /// Set the URL the document was loaded from
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Base URL of the document
    ///
    /// The first `<base href>` resolved against the document URL, else the
    /// document URL itself.
    #[must_use]
    pub fn base_url(&self) -> Option<String> {
        let base_href = self.root.select_first("base[href]").ok().and_then(|base| {
            let attrs = base.attributes.borrow();
            attrs.get("href").map(str::to_string)
        });

        match base_href {
            Some(href) => Some(resolve_url(&href, self.url.as_deref())),
            None => self.url.clone(),
        }
    }

    /// Collect qualifying stylesheet elements in tree order
    ///
    /// Qualifying are `<link>` elements with a `stylesheet` rel and an href,
    /// and `<style>` elements, in both cases only when a `type` attribute is
    /// absent or names CSS.
    #[must_use]
    pub fn scan_stylesheets(&self) -> Vec<ScannedStylesheet> {
        let mut scanned = Vec::new();

        for element in self.root.inclusive_descendants().elements() {
            let index = scanned.len();
            let source = {
                let attrs = element.attributes.borrow();
                if !is_css_type(attrs.get("type")) {
                    continue;
                }
                let media = attrs.get("media").map(str::to_string);

                match &*element.name.local {
                    "link" if attrs.get("rel").is_some_and(is_stylesheet_rel) => {
                        let Some(href) = attrs.get("href").filter(|href| !href.trim().is_empty()) else {
                            log::debug!("Skipping stylesheet link without href");
                            continue;
                        };
                        StylesheetSource::Link {
                            index,
                            href: href.trim().to_string(),
                            media,
                        }
                    }
                    "style" => StylesheetSource::Inline {
                        index,
                        css: element.as_node().text_contents(),
                        media,
                    },
                    _ => continue,
                }
            };

            scanned.push(ScannedStylesheet {
                node: element.as_node().clone(),
                source,
            });
        }

        scanned
    }

    /// Text of every `<style>` element, in tree order
    #[must_use]
    pub fn style_contents(&self) -> Vec<String> {
        self.root
            .inclusive_descendants()
            .elements()
            .filter(|element| &*element.name.local == "style")
            .map(|element| element.as_node().text_contents())
            .collect()
    }

    /// Serialize the document back to HTML
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or produces invalid UTF-8.
    pub fn to_html(&self) -> Result<String> {
        let mut output = Vec::new();
        self.root
            .serialize(&mut output)
            .context("Failed to serialize HTML after stylesheet inlining")?;

        String::from_utf8(output).context("Serialized HTML is not valid UTF-8")
    }
}

/// Replace each scanned element by its outcome, returning how many got a `<style>`
///
/// Elements with content are replaced in place by a new
/// `<style type="text/css">` carrying the original `media`; the others are
/// removed.
pub(crate) fn apply_outcomes(scanned: Vec<ScannedStylesheet>, outcomes: Vec<SheetOutcome>) -> usize {
    if scanned.len() != outcomes.len() {
        log::warn!(
            "Stylesheet count changed between scan and write-back ({} vs {})",
            scanned.len(),
            outcomes.len()
        );
    }

    let mut replaced = 0;
    for (stylesheet, outcome) in scanned.into_iter().zip(outcomes) {
        let node = stylesheet.node;

        if let Some(css) = outcome.css {
            match new_style_element(&css, stylesheet.source.media()) {
                Some(style) => {
                    node.insert_before(style);
                    replaced += 1;
                }
                None => log::warn!("Failed to create style element for stylesheet {}", stylesheet.source.index()),
            }
        }

        node.detach();
    }

    replaced
}

fn new_style_element(css: &str, media: Option<&str>) -> Option<NodeRef> {
    let template = kuchiki::parse_html().one("<style type=\"text/css\"></style>");
    let style = template.select_first("style").ok()?;

    if let Some(media) = media {
        style.attributes.borrow_mut().insert("media", media.to_string());
    }

    let node = style.as_node().clone();
    node.detach();
    node.append(NodeRef::new_text(escape_closing_style_tags(css)));
    Some(node)
}

/// Break up `</style` so embedded text cannot end the element early
fn escape_closing_style_tags(css: &str) -> String {
    let lowered = css.to_ascii_lowercase();
    let mut out = String::with_capacity(css.len());
    let mut last = 0;
    for (at, _) in lowered.match_indices("</style") {
        out.push_str(&css[last..at]);
        out.push_str("<\\/");
        last = at + 2;
    }
    out.push_str(&css[last..]);
    out
}

fn is_stylesheet_rel(rel: &str) -> bool {
    let mut tokens = rel.split_ascii_whitespace();
    let stylesheet = tokens.clone().any(|token| token.eq_ignore_ascii_case("stylesheet"));
    stylesheet && !tokens.any(|token| token.eq_ignore_ascii_case("alternate"))
}

/// An absent or empty `type`, or `text/css` with any parameters
fn is_css_type(value: Option<&str>) -> bool {
    let Some(value) = value else {
        return true;
    };
    let essence = value.split(';').next().unwrap_or_default().trim();
    essence.is_empty() || essence.eq_ignore_ascii_case("text/css")
}
