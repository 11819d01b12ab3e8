//! Minimal CSS rule model
//!
//! The inliner only needs to know where one top-level rule ends and the next
//! begins, what kind of rule it is, and where its `url(...)` tokens sit. Rules
//! keep their raw source text so untouched rules serialize byte-for-byte.
//! Tokenizing is delegated to `cssparser`.

use cssparser::{ParseError, Parser, ParserInput, Token};

pub mod tokens;

pub use tokens::{CssTokenError, ImportRule, UrlToken, extract_url_tokens, format_url, rewrite_urls};

/// Kind tag of a top-level CSS rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    Style,
    Import,
    FontFace,
    Media,
    Charset,
    /// Any other at-rule, by lowercase name (`supports`, `keyframes`, ...)
    Other(String),
}

impl RuleKind {
    fn from_at_keyword(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "import" => RuleKind::Import,
            "font-face" => RuleKind::FontFace,
            "media" => RuleKind::Media,
            "charset" => RuleKind::Charset,
            other => RuleKind::Other(other.to_string()),
        }
    }
}

/// One top-level rule with its raw text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    kind: RuleKind,
    text: String,
}

impl CssRule {
    #[must_use]
    pub fn new(kind: RuleKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    #[must_use]
    pub fn is_import(&self) -> bool {
        self.kind == RuleKind::Import
    }
}

/// Ordered list of top-level rules of one stylesheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssRuleList {
    rules: Vec<CssRule>,
}

impl CssRuleList {
    /// Split stylesheet text into top-level rules
    ///
    /// Never fails: malformed input yields whatever rules the tokenizer can
    /// delimit, and an unterminated trailing rule is kept as-is.
    #[must_use]
    pub fn parse(css: &str) -> Self {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let mut rules = Vec::new();

        loop {
            let mut start = None;
            let mut kind = RuleKind::Style;

            loop {
                let before = parser.position();
                let token = match parser.next_including_whitespace_and_comments() {
                    Ok(token) => token.clone(),
                    Err(_) => break,
                };

                match token {
                    Token::WhiteSpace(_) | Token::Comment(_) | Token::CDO | Token::CDC
                        if start.is_none() => {}
                    Token::Semicolon if start.is_none() => {}
                    Token::Semicolon => break,
                    Token::AtKeyword(ref name) if start.is_none() => {
                        start = Some(before);
                        kind = RuleKind::from_at_keyword(name);
                    }
                    Token::CurlyBracketBlock => {
                        start.get_or_insert(before);
                        skip_block(&mut parser);
                        break;
                    }
                    _ => {
                        start.get_or_insert(before);
                    }
                }
            }

            let Some(start) = start else {
                break;
            };
            let text = parser.slice_from(start).trim_end();
            rules.push(CssRule::new(kind, text));
        }

        Self { rules }
    }

    /// Serialize back to stylesheet text, one rule per line
    #[must_use]
    pub fn serialize(&self) -> String {
        self.rules
            .iter()
            .map(CssRule::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&CssRule> {
        self.rules.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CssRule> {
        self.rules.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, CssRule> {
        self.rules.iter_mut()
    }

    /// Replace the rule at `index` with `replacement`, returning how many
    /// rules were inserted
    pub fn splice(&mut self, index: usize, replacement: Vec<CssRule>) -> usize {
        let inserted = replacement.len();
        self.rules.splice(index..=index, replacement);
        inserted
    }

    pub fn remove(&mut self, index: usize) -> CssRule {
        self.rules.remove(index)
    }

    #[must_use]
    pub fn into_rules(self) -> Vec<CssRule> {
        self.rules
    }
}

impl From<Vec<CssRule>> for CssRuleList {
    fn from(rules: Vec<CssRule>) -> Self {
        Self { rules }
    }
}

impl<'a> IntoIterator for &'a CssRuleList {
    type Item = &'a CssRule;
    type IntoIter = std::slice::Iter<'a, CssRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Consume the contents of the block just returned by the parser
fn skip_block<'i>(parser: &mut Parser<'i, '_>) {
    let _ = parser.parse_nested_block(|_| Ok::<(), ParseError<'i, ()>>(()));
}
