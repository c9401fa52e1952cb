//! API handlers.

use axum::http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::data::{Data, DataError};
use crate::routing::RouteInfo;

/// Context handed to an API handler for one request.
#[derive(Debug, Clone, Copy)]
pub struct ApiContext<'a> {
    route: &'a RouteInfo,
    method: &'a Method,
    body: &'a [u8],
    data: &'a Data,
}

impl<'a> ApiContext<'a> {
    pub fn new(route: &'a RouteInfo, method: &'a Method, body: &'a [u8], data: &'a Data) -> Self {
        Self {
            route,
            method,
            body,
            data,
        }
    }

    pub fn route(&self) -> &'a RouteInfo {
        self.route
    }

    pub fn method(&self) -> &'a Method {
        self.method
    }

    /// Raw request body.
    pub fn body(&self) -> &'a [u8] {
        self.body
    }

    /// Decode the request body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(self.body)
            .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))
    }

    /// Values stored by init functions.
    pub fn data(&self) -> &'a Data {
        self.data
    }
}

/// Response produced by an API handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    status: StatusCode,
    content_type: &'static str,
    body: Vec<u8>,
}

impl ApiResponse {
    /// JSON response with the given status.
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Result<Self, ApiError> {
        let body = serde_json::to_vec(value).map_err(|e| ApiError::Internal(e.to_string()))?;
        Ok(Self {
            status,
            content_type: "application/json",
            body,
        })
    }

    /// `200 OK` JSON response.
    pub fn ok<T: Serialize>(value: &T) -> Result<Self, ApiError> {
        Self::json(StatusCode::OK, value)
    }

    /// Plain text response.
    pub fn text(status: StatusCode, text: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: text.into().into_bytes(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}

/// Errors an API handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request was malformed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No API route, or the addressed resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The handler does not support the request method.
    #[error("method {0} not allowed")]
    MethodNotAllowed(Method),

    /// A value the handler relies on was never stored by an init function.
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Data(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to clients. Server-side failures are not detailed.
    pub fn public_message(&self) -> String {
        if self.status().is_server_error() {
            "internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

/// An API endpoint registered under a route pattern.
pub trait ApiHandler: Send + Sync {
    fn handle(&self, ctx: &ApiContext<'_>) -> Result<ApiResponse, ApiError>;
}

impl<F> ApiHandler for F
where
    F: Fn(&ApiContext<'_>) -> Result<ApiResponse, ApiError> + Send + Sync,
{
    fn handle(&self, ctx: &ApiContext<'_>) -> Result<ApiResponse, ApiError> {
        self(ctx)
    }
}
