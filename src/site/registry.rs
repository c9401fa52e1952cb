//! Site assembly: page and API routers plus the shared data store.

use std::fmt;
use std::sync::Arc;

use axum::http::Method;
use thiserror::Error;

use crate::config::SiteConfig;
use crate::data::{Data, DataStore};
use crate::observability::metrics;
use crate::routing::{NotFound, RouteError, Router, RouterBuilder};
use crate::site::api::{ApiContext, ApiError, ApiHandler, ApiResponse};
use crate::site::init::{InitApi, InitApiContext, InitError};
use crate::site::page::{Page, PageContext};

/// Path prefix under which API routes are served.
pub const API_PREFIX: &str = "/api";

/// Errors raised while building a [`Site`].
#[derive(Debug, Error)]
pub enum SiteError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("init function `{name}` failed: {source}")]
    Init {
        name: String,
        #[source]
        source: InitError,
    },
}

/// Collects pages, API handlers and init functions during startup.
pub struct SiteBuilder {
    pages: RouterBuilder<Box<dyn Page>>,
    apis: RouterBuilder<Box<dyn ApiHandler>>,
    inits: Vec<(String, Box<dyn InitApi>)>,
}

impl SiteBuilder {
    pub fn new() -> Self {
        Self {
            pages: RouterBuilder::new(),
            apis: RouterBuilder::new(),
            inits: Vec::new(),
        }
    }

    /// Register a page under `pattern`.
    pub fn page(&mut self, pattern: &str, page: impl Page + 'static) -> Result<&mut Self, RouteError> {
        self.pages.register(pattern, Box::new(page))?;
        Ok(self)
    }

    /// Register an API handler under `pattern`, relative to [`API_PREFIX`].
    pub fn api(
        &mut self,
        pattern: &str,
        handler: impl ApiHandler + 'static,
    ) -> Result<&mut Self, RouteError> {
        self.apis.register(pattern, Box::new(handler))?;
        Ok(self)
    }

    /// Add an init function. Init functions run in the order they were added.
    pub fn init(&mut self, name: impl Into<String>, init: impl InitApi + 'static) -> &mut Self {
        self.inits.push((name.into(), Box::new(init)));
        self
    }

    /// Run every init function, then freeze the routers.
    ///
    /// Stops at the first failing init function.
    pub fn build(self, config: &SiteConfig) -> Result<Site, SiteError> {
        let data = Arc::new(DataStore::new());
        let ctx = InitApiContext::new(&data, config);

        for (name, init) in &self.inits {
            init.init(&ctx).map_err(|source| SiteError::Init {
                name: name.clone(),
                source,
            })?;
            tracing::info!(init = %name, "Init function completed");
        }

        let pages = self.pages.build();
        let apis = self.apis.build();
        metrics::record_data_entries(data.len());

        tracing::info!(
            pages = pages.len(),
            apis = apis.len(),
            data_entries = data.len(),
            "Site built"
        );
        Ok(Site { pages, apis, data })
    }
}

impl Default for SiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Frozen site: immutable routers and the store populated at startup.
pub struct Site {
    pages: Router<Box<dyn Page>>,
    apis: Router<Box<dyn ApiHandler>>,
    data: Arc<DataStore>,
}

impl Site {
    pub fn builder() -> SiteBuilder {
        SiteBuilder::new()
    }

    pub fn pages(&self) -> &Router<Box<dyn Page>> {
        &self.pages
    }

    pub fn apis(&self) -> &Router<Box<dyn ApiHandler>> {
        &self.apis
    }

    /// Read-only view of the data store.
    pub fn data(&self) -> Data {
        self.data.read_only()
    }

    /// Resolve `url` against the pages and render the match.
    pub fn render(&self, url: &str) -> Result<String, NotFound> {
        let resolved = self.pages.resolve(url);
        metrics::record_resolution("page", resolved.is_ok());

        let matched = resolved?;
        let data = self.data();
        Ok(matched
            .handler
            .render(&PageContext::new(&matched.info, &data)))
    }

    /// Resolve `url` (already stripped of [`API_PREFIX`]) against the API
    /// routes and invoke the match.
    pub fn call_api(&self, url: &str, method: &Method, body: &[u8]) -> Result<ApiResponse, ApiError> {
        let resolved = self.apis.resolve(url);
        metrics::record_resolution("api", resolved.is_ok());

        let matched = resolved.map_err(|not_found| {
            ApiError::NotFound(format!("no API route for `{}`", not_found.route.path()))
        })?;
        let data = self.data();
        matched
            .handler
            .handle(&ApiContext::new(&matched.info, method, body, &data))
    }
}

impl fmt::Debug for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Site")
            .field("pages", &self.pages)
            .field("apis", &self.apis)
            .field("data", &self.data)
            .finish()
    }
}

/// Split an incoming URL into its API-relative part, if it addresses the API.
///
/// `/api/users?x=1` yields `/users?x=1`; `/apiary` is not an API URL.
pub fn strip_api_prefix(url: &str) -> Option<&str> {
    let rest = url.strip_prefix(API_PREFIX)?;
    (rest.is_empty() || rest.starts_with(['/', '?', '#'])).then_some(rest)
}
