//! Init functions: startup code that populates the data store.

use thiserror::Error;

use crate::config::SiteConfig;
use crate::data::DataStore;

/// Context handed to init functions. The only place with write access to the
/// data store.
#[derive(Debug, Clone, Copy)]
pub struct InitApiContext<'a> {
    data: &'a DataStore,
    config: &'a SiteConfig,
}

impl<'a> InitApiContext<'a> {
    pub fn new(data: &'a DataStore, config: &'a SiteConfig) -> Self {
        Self { data, config }
    }

    pub fn data(&self) -> &'a DataStore {
        self.data
    }

    pub fn config(&self) -> &'a SiteConfig {
        self.config
    }
}

/// Failure reported by an init function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InitError(pub String);

impl InitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A function run once at startup, before any request is served.
pub trait InitApi: Send + Sync {
    fn init(&self, ctx: &InitApiContext<'_>) -> Result<(), InitError>;
}

impl<F> InitApi for F
where
    F: Fn(&InitApiContext<'_>) -> Result<(), InitError> + Send + Sync,
{
    fn init(&self, ctx: &InitApiContext<'_>) -> Result<(), InitError> {
        self(ctx)
    }
}
