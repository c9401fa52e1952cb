//! Mapping site results onto HTTP responses.
//!
//! # Design Decisions
//! - API errors are JSON bodies `{"error": ..., "status": ...}`
//! - Server-side failure details are logged, never sent to the client
//! - Unknown pages get an HTML 404 page

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::site::{escape_html, ApiError, ApiResponse};

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status = self.status();
        let content_type = HeaderValue::from_static(self.content_type());
        (status, [(header::CONTENT_TYPE, content_type)], self.into_body()).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "API handler failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "API request rejected");
        }
        error_json(status, &self.public_message())
    }
}

/// JSON error body with the given status.
pub fn error_json(status: StatusCode, message: &str) -> Response {
    let body = Json(json!({
        "error": message,
        "status": status.as_u16(),
    }));
    (status, body).into_response()
}

/// HTML 404 page for a path no page route matches.
pub fn page_not_found(path: &str) -> Response {
    let html = format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Not Found</title></head>\n\
         <body>\n<h1>404</h1>\n<p>No page at <code>{}</code>.</p>\n\
         <p><a href=\"/\">Go Home</a></p>\n</body>\n</html>\n",
        escape_html(path)
    );
    (StatusCode::NOT_FOUND, Html(html)).into_response()
}

/// `405` for page requests with a method other than GET or HEAD.
pub fn page_method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, HeaderValue::from_static("GET, HEAD"))],
    )
        .into_response()
}
