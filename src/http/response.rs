//! Response construction.
//!
//! # Responsibilities
//! - Build the three page-serving outcomes: rendered HTML, not found,
//!   and render failure
//! - Keep the error body format stable for scripts and tests

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

/// A successfully rendered page.
pub fn page(html: String) -> Response {
    Html(html).into_response()
}

/// The path resolved to no servable template.
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "404 not found\n").into_response()
}

/// The template compiled but failed to render.
///
/// The render error text is included in the body so a broken page
/// names its own failure.
pub fn render_error(err: &minijinja::Error) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("500 internal error\n\t{err}"),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_is_html_ok() {
        let response = page("<p>hi</p>".to_owned());
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap();
        assert!(content_type.to_str().unwrap().starts_with("text/html"));
    }

    #[test]
    fn test_not_found_body_is_stable() {
        let response = not_found();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_render_error_is_internal() {
        let err = minijinja::Error::new(minijinja::ErrorKind::UndefinedError, "title");
        let response = render_error(&err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
