//! `url(...)` token extraction and `@import` parsing

use cssparser::{ParseError, Parser, ParserInput, Token};
use std::ops::Range;
use thiserror::Error;

/// A `url(...)` reference and the byte range it occupies in its source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlToken {
    pub range: Range<usize>,
    pub url: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CssTokenError {
    #[error("Malformed url() token: {0}")]
    BadUrl(String),
}

/// Find every `url(...)` token in `css`, including nested blocks
///
/// Tokens the tokenizer cannot make sense of are reported as errors in place,
/// so callers can skip them and still process the rest.
#[must_use]
pub fn extract_url_tokens(css: &str) -> Vec<Result<UrlToken, CssTokenError>> {
    let mut out = Vec::new();
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    scan(&mut parser, &mut out);
    out
}

fn scan<'i>(parser: &mut Parser<'i, '_>, out: &mut Vec<Result<UrlToken, CssTokenError>>) {
    loop {
        let start = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            Token::UnquotedUrl(url) => out.push(Ok(UrlToken {
                range: start.byte_index()..parser.position().byte_index(),
                url: url.to_string(),
            })),
            Token::BadUrl(bad) => out.push(Err(CssTokenError::BadUrl(bad.to_string()))),
            Token::Function(ref name) if name.eq_ignore_ascii_case("url") => {
                let argument = parser.parse_nested_block(|nested| {
                    let mut argument = None;
                    while let Ok(token) = nested.next_including_whitespace_and_comments() {
                        match token {
                            Token::WhiteSpace(_) | Token::Comment(_) => {}
                            Token::QuotedString(url) => {
                                argument = Some(url.to_string());
                                break;
                            }
                            _ => break,
                        }
                    }
                    Ok::<_, ParseError<'i, ()>>(argument)
                });

                let range = start.byte_index()..parser.position().byte_index();
                match argument {
                    Ok(Some(url)) => out.push(Ok(UrlToken { range, url })),
                    _ => out.push(Err(CssTokenError::BadUrl(parser.slice_from(start).to_string()))),
                }
            }
            Token::Function(_)
            | Token::ParenthesisBlock
            | Token::SquareBracketBlock
            | Token::CurlyBracketBlock => {
                let _ = parser.parse_nested_block(|nested| {
                    scan(nested, out);
                    Ok::<_, ParseError<'i, ()>>(())
                });
            }
            _ => {}
        }
    }
}

/// Serialize a URL as a quoted `url("...")` token
#[must_use]
pub fn format_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len() + 7);
    out.push_str("url(\"");
    for ch in url.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\a "),
            _ => out.push(ch),
        }
    }
    out.push_str("\")");
    out
}

/// Rewrite `url(...)` tokens of `css` through `replace`
///
/// `replace` receives each URL and returns the new URL, or `None` to leave
/// the token alone. Returns the rewritten text, or `None` when nothing
/// changed. Malformed tokens are logged and left untouched.
pub fn rewrite_urls(css: &str, mut replace: impl FnMut(&str) -> Option<String>) -> Option<String> {
    let mut out = String::with_capacity(css.len());
    let mut last = 0;
    let mut changed = false;

    for token in extract_url_tokens(css) {
        let token = match token {
            Ok(token) => token,
            Err(e) => {
                log::warn!("Skipping unparsable CSS token: {e}");
                continue;
            }
        };

        let Some(new_url) = replace(&token.url) else {
            continue;
        };
        let formatted = format_url(&new_url);
        if formatted == css[token.range.clone()] {
            continue;
        }

        out.push_str(&css[last..token.range.start]);
        out.push_str(&formatted);
        last = token.range.end;
        changed = true;
    }

    if !changed {
        return None;
    }

    out.push_str(&css[last..]);
    Some(out)
}

/// Parsed form of an `@import` rule
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRule {
    pub href: String,
    /// Cascade layer: `Some("")` for a bare `layer`, `Some(name)` for `layer(name)`
    pub layer: Option<String>,
    /// Condition of a `supports(...)` clause, without the parentheses
    pub supports: Option<String>,
    /// Media query list following the URL, empty when absent
    pub media: String,
}

impl ImportRule {
    /// Parse the text of an `@import` rule
    ///
    /// Returns `None` if the text is not an import or carries no usable URL.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let mut input = ParserInput::new(text);
        let mut parser = Parser::new(&mut input);

        let keyword = parser.next().ok()?.clone();
        match keyword {
            Token::AtKeyword(ref name) if name.eq_ignore_ascii_case("import") => {}
            _ => return None,
        }

        let target = parser.next().ok()?.clone();
        let href = match target {
            Token::QuotedString(url) | Token::UnquotedUrl(url) => url.to_string(),
            Token::Function(ref name) if name.eq_ignore_ascii_case("url") => {
                quoted_url_argument(&mut parser)?
            }
            _ => return None,
        };

        let mut rule = Self {
            href,
            ..Self::default()
        };

        // `layer` and `supports()` precede the media list
        loop {
            let state = parser.state();
            let token = match parser.next() {
                Ok(token) => token.clone(),
                Err(_) => break,
            };
            match token {
                Token::Ident(ref name) if rule.layer.is_none() && name.eq_ignore_ascii_case("layer") => {
                    rule.layer = Some(String::new());
                }
                Token::Function(ref name) if rule.layer.is_none() && name.eq_ignore_ascii_case("layer") => {
                    rule.layer = Some(block_contents(&mut parser)?);
                }
                Token::Function(ref name)
                    if rule.supports.is_none() && name.eq_ignore_ascii_case("supports") =>
                {
                    rule.supports = Some(block_contents(&mut parser)?);
                }
                _ => {
                    parser.reset(&state);
                    break;
                }
            }
        }

        let media_start = parser.position();
        while parser.next_including_whitespace_and_comments().is_ok() {}
        rule.media = parser
            .slice_from(media_start)
            .trim()
            .trim_end_matches(';')
            .trim()
            .to_string();

        Some(rule)
    }

    /// Serialize back to a normalized `@import url("...") layer supports media;` rule
    #[must_use]
    pub fn to_css(&self) -> String {
        let mut css = format!("@import {}", format_url(&self.href));
        match self.layer.as_deref() {
            Some("") => css.push_str(" layer"),
            Some(name) => css.push_str(&format!(" layer({name})")),
            None => {}
        }
        if let Some(condition) = &self.supports {
            css.push_str(&format!(" supports({condition})"));
        }
        if !self.media.is_empty() {
            css.push(' ');
            css.push_str(&self.media);
        }
        css.push(';');
        css
    }

    /// Wrap the serialized imported rules in the blocks this import's
    /// conditions call for, innermost `@media` first
    #[must_use]
    pub fn wrap(&self, mut css: String) -> String {
        if !self.media.is_empty() {
            css = format!("@media {} {{\n{css}\n}}", self.media);
        }
        if let Some(condition) = &self.supports {
            css = format!("@supports ({condition}) {{\n{css}\n}}");
        }
        match self.layer.as_deref() {
            Some("") => format!("@layer {{\n{css}\n}}"),
            Some(name) => format!("@layer {name} {{\n{css}\n}}"),
            None => css,
        }
    }

    /// Whether the imported rules need any wrapping block
    #[must_use]
    pub fn is_conditional(&self) -> bool {
        !self.media.is_empty() || self.supports.is_some() || self.layer.is_some()
    }
}

/// Raw text inside the function block just returned by the parser
fn block_contents<'i>(parser: &mut Parser<'i, '_>) -> Option<String> {
    parser
        .parse_nested_block(|nested| {
            let start = nested.position();
            while nested.next_including_whitespace_and_comments().is_ok() {}
            Ok::<_, ParseError<'i, ()>>(nested.slice_from(start).trim().to_string())
        })
        .ok()
}

/// Read the quoted argument of a `url(` function just returned by the parser
fn quoted_url_argument<'i>(parser: &mut Parser<'i, '_>) -> Option<String> {
    parser
        .parse_nested_block(|nested| {
            let url = nested.expect_string()?.to_string();
            Ok::<_, ParseError<'i, ()>>(url)
        })
        .ok()
}
