//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use site_router::config::SiteConfig;
use site_router::lifecycle::startup::build_site;
use site_router::{demo, HttpServer, Shutdown, Site, SiteBuilder};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A server running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server task to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        self.handle.await.unwrap().unwrap();
    }
}

pub fn demo_site(config: &SiteConfig) -> Arc<Site> {
    build_site(demo::site().unwrap(), config).unwrap()
}

/// Start `builder` on `127.0.0.1:0`.
pub async fn start_server(builder: SiteBuilder, mut config: SiteConfig) -> TestServer {
    config.listener.bind_address = "127.0.0.1:0".into();
    let site = build_site(builder, &config).unwrap();

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, site);
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

pub async fn start_demo_server() -> TestServer {
    start_server(demo::site().unwrap(), SiteConfig::default()).await
}
