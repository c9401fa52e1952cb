//! Router tests without a socket, driving the layered service directly.

use std::io;

use axum::body::{to_bytes, Body, Bytes};
use axum::http::{Method, Request, StatusCode};
use futures_util::stream;
use site_router::config::SiteConfig;
use site_router::HttpServer;
use tower::ServiceExt;

mod common;

fn server() -> HttpServer {
    server_with(SiteConfig::default())
}

fn server_with(config: SiteConfig) -> HttpServer {
    let site = common::demo_site(&config);
    HttpServer::new(config, site)
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_head_request_for_page() {
    let response = server()
        .router()
        .oneshot(
            Request::builder()
                .method(Method::HEAD)
                .uri("/about")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_percent_encoded_segments_are_decoded() {
    let response = server()
        .router()
        .oneshot(
            Request::get("/users/caf%C3%A9/posts/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("User café, post 1"));
}

#[tokio::test]
async fn test_api_prefix_must_be_whole_segment() {
    let response = server()
        .router()
        .oneshot(Request::get("/apihello").body(Body::empty()).unwrap())
        .await
        .unwrap();
    // Falls through to the pages, which have no such route.
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_string(response).await.contains("<h1>404</h1>"));
}

#[tokio::test]
async fn test_api_method_not_allowed_is_json() {
    let response = server()
        .router()
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri("/api/users/9")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["error"], "method DELETE not allowed");
}

#[tokio::test]
async fn test_api_post_creates() {
    let response = server()
        .router()
        .oneshot(
            Request::post("/api/users/9")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"name":"Grace"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["id"], "9");
    assert_eq!(body["received"]["name"], "Grace");
}

#[tokio::test]
async fn test_streamed_body_over_limit_is_413() {
    let mut config = SiteConfig::default();
    config.listener.max_body_bytes = 64;

    // No content-length, so the limit is only hit while reading.
    let chunks = (0..4).map(|_| Ok::<_, io::Error>(Bytes::from(vec![b'x'; 32])));
    let response = server_with(config)
        .router()
        .oneshot(
            Request::post("/api/users/1")
                .body(Body::from_stream(stream::iter(chunks)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_broken_body_is_400_not_413() {
    let chunks = vec![
        Ok(Bytes::from_static(b"{\"name\":")),
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "client went away")),
    ];
    let response = server()
        .router()
        .oneshot(
            Request::post("/api/users/1")
                .body(Body::from_stream(stream::iter(chunks)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], 400);
}
