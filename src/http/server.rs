//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with a single dispatching fallback
//! - Wire up middleware (tracing, limits, timeouts, request ID)
//! - Dispatch `/api/...` to the API routes and everything else to pages
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, FromRequest, State},
    http::{Method, Request},
    response::{Html, IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::SiteConfig;
use crate::http::request::{request_id, MakeRequestUuid};
use crate::http::response::{error_json, page_method_not_allowed, page_not_found};
use crate::observability::metrics;
use crate::site::registry::strip_api_prefix;
use crate::site::Site;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub site: Arc<Site>,
}

/// HTTP server for the site.
pub struct HttpServer {
    router: Router,
    config: SiteConfig,
}

impl HttpServer {
    /// Create a new HTTP server serving `site`.
    pub fn new(config: SiteConfig, site: Arc<Site>) -> Self {
        let state = AppState { site };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &SiteConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.listener.max_body_bytes))
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for serving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Routes every request to either the API routes or the pages.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let url = request
        .uri()
        .path_and_query()
        .map_or("/", |pq| pq.as_str())
        .to_string();

    tracing::debug!(
        request_id = %request_id(request.headers()),
        method = %method,
        url = %url,
        "Dispatching request"
    );

    if let Some(api_url) = strip_api_prefix(&url) {
        // Over-limit bodies are 413; any other read failure is the client's, 400.
        let body = match Bytes::from_request(request, &state).await {
            Ok(bytes) => bytes,
            Err(rejection) => {
                let status = rejection.status();
                tracing::warn!(
                    status = status.as_u16(),
                    error = %rejection.body_text(),
                    "Failed to read request body"
                );
                let response = error_json(status, &rejection.body_text());
                metrics::record_request("api", status.as_u16(), start_time);
                return response;
            }
        };

        let response = match state.site.call_api(api_url, &method, &body) {
            Ok(response) => response.into_response(),
            Err(e) => e.into_response(),
        };
        metrics::record_request("api", response.status().as_u16(), start_time);
        return response;
    }

    let response = if method != Method::GET && method != Method::HEAD {
        page_method_not_allowed()
    } else {
        match state.site.render(&url) {
            Ok(html) => Html(html).into_response(),
            Err(not_found) => {
                tracing::debug!(path = %not_found.route.path(), "No page matched");
                page_not_found(not_found.route.path())
            }
        }
    };
    metrics::record_request("page", response.status().as_u16(), start_time);
    response
}
