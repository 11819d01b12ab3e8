//! Memoization through a shared `CacheBucket`

use kodegen_tools_inline_css::{
    CacheBucket, CacheMode, InlineOptions, MemoryFetcher, StyledDocument, inline_stylesheets,
};

mod common;
use common::create_test_html;

const HEAD: &str = r#"<link rel="stylesheet" href="site.css"><link rel="stylesheet" href="missing.css"><style>p { background: url(dot.gif); }</style>"#;

fn fetcher() -> MemoryFetcher {
    MemoryFetcher::new()
        .with_text("https://example.com/site.css", "@import \"base.css\"; main { margin: 0 auto; }")
        .with_text("https://example.com/base.css", "html { font-family: serif; }")
        .with_resource("https://example.com/dot.gif", b"GIF".to_vec(), "image/gif")
}

fn document(url: &str) -> StyledDocument {
    StyledDocument::parse(&create_test_html(HEAD, "")).with_url(url)
}

#[tokio::test]
async fn test_second_call_replays_without_fetching() {
    let fetcher = fetcher();
    let bucket = CacheBucket::new();
    let options = InlineOptions::new().cache_bucket(bucket.clone());

    let first = document("https://example.com/index.html");
    let first_errors = inline_stylesheets(&first, &options, &fetcher).await;
    let first_requests = fetcher.request_count();

    let second = document("https://example.com/index.html");
    let second_errors = inline_stylesheets(&second, &options, &fetcher).await;

    assert!(first_requests > 0);
    assert_eq!(fetcher.request_count(), first_requests);
    assert_eq!(first_errors, second_errors);
    assert_eq!(first_errors.len(), 1);
    assert_eq!(first.style_contents(), second.style_contents());
    assert_eq!(first.to_html().unwrap(), second.to_html().unwrap());
    assert!(bucket.contains_base_url("https://example.com/index.html"));
}

#[tokio::test]
async fn test_same_effective_base_url_hits() {
    let fetcher = fetcher();
    let options = InlineOptions::new()
        .base_url("https://example.com/")
        .cache_bucket(CacheBucket::new());

    inline_stylesheets(&document("https://example.com/one.html"), &options, &fetcher).await;
    fetcher.reset();
    let second = document("https://example.com/two.html");
    inline_stylesheets(&second, &options, &fetcher).await;

    assert_eq!(fetcher.request_count(), 0);
    assert_eq!(second.style_contents().len(), 2);
}

#[tokio::test]
async fn test_different_effective_base_url_misses() {
    let fetcher = fetcher();
    let bucket = CacheBucket::new();
    let options = InlineOptions::new().cache_bucket(bucket.clone());

    inline_stylesheets(&document("https://example.com/index.html"), &options, &fetcher).await;
    fetcher.reset();
    inline_stylesheets(&document("https://example.com/other.html"), &options, &fetcher).await;

    assert!(fetcher.request_count() > 0);
    assert_eq!(bucket.len(), 2);
}

#[tokio::test]
async fn test_cache_none_never_reads_or_writes() {
    let fetcher = fetcher();
    let bucket = CacheBucket::new();
    let options = InlineOptions::new()
        .cache(CacheMode::Bypass)
        .cache_bucket(bucket.clone());

    inline_stylesheets(&document("https://example.com/index.html"), &options, &fetcher).await;
    let first_requests = fetcher.request_count();
    inline_stylesheets(&document("https://example.com/index.html"), &options, &fetcher).await;

    assert!(bucket.is_empty());
    assert_eq!(fetcher.request_count(), first_requests * 2);
    assert!(fetcher.requests().iter().all(|request| request.options.bypass_cache));
}

#[tokio::test]
async fn test_bypass_ignores_existing_entries() {
    let fetcher = fetcher();
    let bucket = CacheBucket::new();

    let cached = InlineOptions::new().cache_bucket(bucket.clone());
    inline_stylesheets(&document("https://example.com/index.html"), &cached, &fetcher).await;
    fetcher.reset();

    let bypass = cached.clone().cache(CacheMode::Bypass);
    inline_stylesheets(&document("https://example.com/index.html"), &bypass, &fetcher).await;

    assert!(fetcher.request_count() > 0);
}

#[tokio::test]
async fn test_concurrent_calls_share_bucket() {
    let fetcher = fetcher();
    let bucket = CacheBucket::new();
    let options = InlineOptions::new().cache_bucket(bucket.clone());

    let (a, b) = (document("https://example.com/a.html"), document("https://example.com/b.html"));
    let (errors_a, errors_b) = futures::join!(
        inline_stylesheets(&a, &options, &fetcher),
        inline_stylesheets(&b, &options, &fetcher)
    );

    assert_eq!(errors_a.len(), 1);
    assert_eq!(errors_b.len(), 1);
    assert_eq!(bucket.len(), 2);
}
