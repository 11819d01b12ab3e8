//! Test utilities and helper functions for the inliner test suite

use kodegen_tools_inline_css::StyledDocument;
use mockito::{Mock, Server};

/// Creates a test HTML document with the given head and body markup
#[allow(dead_code)]
pub fn create_test_html(head: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Test</title>
    {head}
</head>
<body>
    {body}
</body>
</html>"#
    )
}

/// Parses a test document with the given head markup and an empty body
#[allow(dead_code)]
pub fn document_with_head(head: &str) -> StyledDocument {
    StyledDocument::parse(&create_test_html(head, ""))
}

/// Number of elements matching `selector`
#[allow(dead_code)]
pub fn count(document: &StyledDocument, selector: &str) -> usize {
    document
        .root()
        .select(selector)
        .map(|matches| matches.count())
        .unwrap_or(0)
}

/// Local names of all elements in `<head>`, in tree order
#[allow(dead_code)]
pub fn head_element_names(document: &StyledDocument) -> Vec<String> {
    document
        .root()
        .select("head > *")
        .map(|matches| matches.map(|element| element.name.local.to_string()).collect())
        .unwrap_or_default()
}

/// Creates a mock endpoint that returns a stylesheet
#[allow(dead_code)]
pub async fn create_css_mock(server: &mut Server, path: &str, css: &str) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "text/css; charset=utf-8")
        .with_body(css)
        .create_async()
        .await
}

/// Creates a mock endpoint that returns an error
#[allow(dead_code)]
pub async fn create_error_mock(server: &mut Server, path: &str, status: usize) -> Mock {
    server
        .mock("GET", path)
        .with_status(status)
        .with_body("Error")
        .create_async()
        .await
}

/// Helper to create test URLs
#[allow(dead_code)]
pub fn test_url(server: &Server, path: &str) -> String {
    format!("{}{}", server.url(), path)
}
