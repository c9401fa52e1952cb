//! Client-side style router and type-keyed data store, served over HTTP.

pub mod config;
pub mod data;
pub mod demo;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod site;

pub use config::schema::SiteConfig;
pub use data::{Data, DataKey, DataStore};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{RouteInfo, Router};
pub use site::{Site, SiteBuilder};
