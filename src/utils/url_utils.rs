//! URL resolution utilities.
//!
//! Every path handled by the inliner is expressed relative to some base URL.
//! Bases are usually absolute (`https://example.com/docs/`) but callers may
//! also hand in relative bases such as `some_url/`, in which case resolution
//! stays relative so the fetcher can anchor it later.

use url::{Position, Url};

/// Host used to anchor relative bases while joining
const RELATIVE_HOST: &str = "relative.invalid";

/// Synthetic directory a relative base is nested under, so that `..`
/// segments climbing above the base stay countable after the join
const ANCHOR_SEGMENT: &str = "__anchor__";

/// How many `..` segments above a relative base can be preserved
const ANCHOR_DEPTH: usize = 32;

/// Resolve a potentially relative URL against an optional base URL
///
/// Never fails: input that cannot be joined is returned unchanged so the
/// fetch step reports the problem instead. An absent or empty base means no
/// resolution at all.
#[must_use]
pub fn resolve_url(url: &str, base_url: Option<&str>) -> String {
    let Some(base) = base_url.filter(|base| !base.is_empty()) else {
        return url.to_string();
    };

    // Data URIs are already self-contained; joining would only re-encode them
    if is_data_uri(url) {
        return url.to_string();
    }

    if let Ok(base) = Url::parse(base) {
        return match base.join(url) {
            Ok(joined) => joined.to_string(),
            Err(e) => {
                log::debug!("Leaving unresolvable URL '{url}' as-is: {e}");
                url.to_string()
            }
        };
    }

    resolve_against_relative_base(url, base)
}

/// Join against a base that is itself relative (`below/some.css`, `/css/`)
fn resolve_against_relative_base(url: &str, base: &str) -> String {
    // Absolute and root-relative candidates do not depend on a relative base
    if is_absolute_url(url) || url.starts_with('/') {
        return url.to_string();
    }

    let rooted = base.starts_with('/');
    let anchored = if rooted {
        format!("http://{RELATIVE_HOST}{base}")
    } else {
        let anchor = format!("{ANCHOR_SEGMENT}/").repeat(ANCHOR_DEPTH);
        format!("http://{RELATIVE_HOST}/{anchor}{base}")
    };

    let joined = match Url::parse(&anchored).and_then(|anchor| anchor.join(url)) {
        Ok(joined) if joined.host_str() == Some(RELATIVE_HOST) => joined,
        _ => return url.to_string(),
    };

    let path = &joined[Position::BeforePath..];
    if rooted {
        return path.to_string();
    }

    // Every anchor segment the join consumed is one `..` above the base
    let mut rest = path.strip_prefix('/').unwrap_or(path);
    let mut remaining = 0;
    while remaining < ANCHOR_DEPTH {
        let Some(stripped) = rest
            .strip_prefix(ANCHOR_SEGMENT)
            .and_then(|tail| tail.strip_prefix('/'))
        else {
            break;
        };
        rest = stripped;
        remaining += 1;
    }

    format!("{}{rest}", "../".repeat(ANCHOR_DEPTH - remaining))
}

/// Check whether a URL carries its own scheme (`https:`, `file:`, `data:`)
#[must_use]
pub fn is_absolute_url(url: &str) -> bool {
    Url::parse(url).is_ok()
}

/// Check whether a URL is an inline `data:` URI
#[must_use]
pub fn is_data_uri(url: &str) -> bool {
    url.get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}
