//! Inlining of `<link rel="stylesheet">` elements

use kodegen_tools_inline_css::fetch::FetchRequest;
use kodegen_tools_inline_css::{
    CacheMode, FetchOptions, InlineOptions, MemoryFetcher, ResourceError, ResourceType,
    inline_stylesheets, inline_stylesheets_with_callback,
};
use std::time::Duration;

mod common;
use common::{count, document_with_head, head_element_names};

#[tokio::test]
async fn test_link_replaced_by_style_with_fetched_css() {
    let fetcher = MemoryFetcher::new().with_text("a.css", "p { font-size: 14px; }");
    let document = document_with_head(r#"<link rel="stylesheet" href="a.css">"#);

    let errors = inline_stylesheets(&document, &InlineOptions::default(), &fetcher).await;

    assert!(errors.is_empty());
    assert_eq!(document.style_contents(), vec!["p { font-size: 14px; }"]);
    assert_eq!(count(&document, "link"), 0);
    assert_eq!(count(&document, r#"style[type="text/css"]"#), 1);
}

#[tokio::test]
async fn test_failed_link_removed_with_one_error() {
    let fetcher = MemoryFetcher::new();
    let document = document_with_head(r#"<link rel="stylesheet" href="a_document_that_doesnt_exist.css">"#);
    let options = InlineOptions::new().base_url("some_base_url/");

    let errors = inline_stylesheets(&document, &options, &fetcher).await;

    assert_eq!(
        errors,
        vec![ResourceError {
            resource_type: ResourceType::Stylesheet,
            url: "some_base_url/a_document_that_doesnt_exist.css".to_string(),
            msg: "Unable to load stylesheet some_base_url/a_document_that_doesnt_exist.css".to_string(),
        }]
    );
    assert_eq!(count(&document, "style"), 0);
    assert_eq!(count(&document, "link"), 0);
}

#[tokio::test]
async fn test_errors_follow_document_order() {
    let fetcher = MemoryFetcher::new();
    let document = document_with_head(
        r#"<link rel="stylesheet" href="first.css"><link rel="stylesheet" href="second.css">"#,
    );
    let options = InlineOptions::new().base_url("https://example.com/");

    let errors = inline_stylesheets(&document, &options, &fetcher).await;

    let urls: Vec<&str> = errors.iter().map(|error| error.url.as_str()).collect();
    assert_eq!(urls, vec!["https://example.com/first.css", "https://example.com/second.css"]);
}

#[tokio::test]
async fn test_order_preserved_when_fetches_finish_out_of_order() {
    let fetcher = MemoryFetcher::new()
        .with_text("slow.css", "slow {}")
        .with_delay("slow.css", Duration::from_millis(50))
        .with_text("fast.css", "fast {}");
    let document = document_with_head(
        r#"<link rel="stylesheet" href="slow.css"><meta name="x"><style>inline {}</style><link rel="stylesheet" href="fast.css">"#,
    );

    let errors = inline_stylesheets(&document, &InlineOptions::default(), &fetcher).await;

    assert!(errors.is_empty());
    assert_eq!(document.style_contents(), vec!["slow {}", "inline {}", "fast {}"]);
    assert_eq!(
        head_element_names(&document),
        vec!["meta", "title", "style", "meta", "style", "style"]
    );
}

#[tokio::test]
async fn test_empty_stylesheet_removes_link_without_style() {
    let fetcher = MemoryFetcher::new().with_text("empty.css", "");
    let document = document_with_head(r#"<link rel="stylesheet" href="empty.css">"#);

    let errors = inline_stylesheets(&document, &InlineOptions::default(), &fetcher).await;

    assert!(errors.is_empty());
    assert_eq!(count(&document, "style"), 0);
    assert_eq!(count(&document, "link"), 0);
}

#[tokio::test]
async fn test_non_stylesheet_links_untouched() {
    let fetcher = MemoryFetcher::new();
    let document = document_with_head(
        r#"<link rel="icon" href="favicon.ico"><link rel="stylesheet" type="text/plain" href="a.txt">"#,
    );

    let errors = inline_stylesheets(&document, &InlineOptions::default(), &fetcher).await;

    assert!(errors.is_empty());
    assert_eq!(count(&document, "link"), 2);
    assert_eq!(fetcher.request_count(), 0);
}

#[tokio::test]
async fn test_media_attribute_carried_over() {
    let fetcher = MemoryFetcher::new().with_text("print.css", "p { color: black; }");
    let document = document_with_head(r#"<link rel="stylesheet" href="print.css" media="print">"#);

    inline_stylesheets(&document, &InlineOptions::default(), &fetcher).await;

    assert_eq!(count(&document, r#"style[media="print"]"#), 1);
}

#[tokio::test]
async fn test_resource_paths_resolved_against_stylesheet_href() {
    let fetcher = MemoryFetcher::new()
        .with_text("some_url/below/some.css", "div { background-image: url(\"../green.png\"); }")
        .with_resource("some_url/green.png", b"PNG".to_vec(), "image/png");
    let document = document_with_head(r#"<link rel="stylesheet" href="below/some.css">"#);
    let options = InlineOptions::new().base_url("some_url/");

    let errors = inline_stylesheets(&document, &options, &fetcher).await;

    assert!(errors.is_empty());
    assert_eq!(
        document.style_contents(),
        vec!["div { background-image: url(\"data:image/png;base64,UE5H\"); }"]
    );

    let base = FetchOptions {
        base_url: Some("some_url/".to_string()),
        bypass_cache: false,
    };
    assert_eq!(
        fetcher.requests(),
        vec![
            FetchRequest {
                url: "below/some.css".to_string(),
                options: base.clone(),
            },
            FetchRequest {
                url: "green.png".to_string(),
                options: base,
            },
        ]
    );
}

#[tokio::test]
async fn test_fetch_options_empty_without_base_or_bypass() {
    let fetcher = MemoryFetcher::new().with_text("a.css", "a {}");
    let document = document_with_head(r#"<link rel="stylesheet" href="a.css">"#);

    inline_stylesheets(&document, &InlineOptions::default(), &fetcher).await;

    assert_eq!(fetcher.requests()[0].options, FetchOptions::default());
}

#[tokio::test]
async fn test_cache_none_sets_bypass_on_fetches() {
    let fetcher = MemoryFetcher::new().with_text("a.css", "a {}");
    let document = document_with_head(r#"<link rel="stylesheet" href="a.css">"#);
    let options = InlineOptions::new().cache(CacheMode::Bypass);

    inline_stylesheets(&document, &options, &fetcher).await;

    assert_eq!(
        fetcher.requests()[0].options,
        FetchOptions {
            base_url: None,
            bypass_cache: true,
        }
    );
}

#[tokio::test]
async fn test_document_url_used_as_base() {
    let fetcher = MemoryFetcher::new().with_text("https://example.com/css/site.css", "site {}");
    let document = document_with_head(r#"<link rel="stylesheet" href="css/site.css">"#)
        .with_url("https://example.com/index.html");

    let errors = inline_stylesheets(&document, &InlineOptions::default(), &fetcher).await;

    assert!(errors.is_empty());
    assert_eq!(document.style_contents(), vec!["site {}"]);
}

#[tokio::test]
async fn test_callback_invoked_once_without_stylesheets() {
    let fetcher = MemoryFetcher::new();
    let document = document_with_head("<meta name=\"description\" content=\"none\">");
    let mut calls = Vec::new();

    inline_stylesheets_with_callback(&document, &InlineOptions::default(), &fetcher, |errors| {
        calls.push(errors);
    })
    .await;

    assert_eq!(calls, vec![Vec::<ResourceError>::new()]);
    assert_eq!(count(&document, "style"), 0);
}

#[tokio::test]
async fn test_callback_receives_errors_after_dom_update() {
    let fetcher = MemoryFetcher::new().with_text("ok.css", "ok {}");
    let document = document_with_head(
        r#"<link rel="stylesheet" href="ok.css"><link rel="stylesheet" href="missing.css">"#,
    );
    let mut received = None;

    inline_stylesheets_with_callback(&document, &InlineOptions::default(), &fetcher, |errors| {
        received = Some(errors);
    })
    .await;

    assert_eq!(received, Some(vec![ResourceError::stylesheet("missing.css")]));
    assert_eq!(document.style_contents(), vec!["ok {}"]);
}

#[tokio::test]
async fn test_parent_relative_link_resolves_resources_beside_stylesheet() {
    let fetcher = MemoryFetcher::new()
        .with_text(
            "https://example.com/css/site.css",
            r#"@import "../shared/theme.css"; p { background: url(img.png); }"#,
        )
        .with_text("https://example.com/shared/theme.css", "h1 { background: url(../img/logo.gif); }")
        .with_resource("https://example.com/css/img.png", b"PNG".to_vec(), "image/png")
        .with_resource("https://example.com/img/logo.gif", b"GIF".to_vec(), "image/gif");
    let document = document_with_head(r#"<link rel="stylesheet" href="../css/site.css">"#)
        .with_url("https://example.com/docs/page.html");

    let errors = inline_stylesheets(&document, &InlineOptions::default(), &fetcher).await;

    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(
        document.style_contents(),
        vec![
            "h1 { background: url(\"data:image/gif;base64,R0lG\"); }\np { background: url(\"data:image/png;base64,UE5H\"); }"
        ]
    );
    let requested: Vec<String> = fetcher.requests().into_iter().map(|request| request.url).collect();
    assert_eq!(
        requested,
        vec!["../css/site.css", "../shared/theme.css", "../img/logo.gif", "../css/img.png"]
    );
}
