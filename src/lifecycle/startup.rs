//! Startup orchestration.
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Init functions run in order, not concurrently
//! - The listener is bound only after the site is built

use std::path::Path;
use std::sync::Arc;

use crate::config::{load_config, ConfigError, SiteConfig};
use crate::site::{Site, SiteBuilder, SiteError};

/// Load configuration from `path`, or fall back to defaults when none is given.
///
/// Runs before logging is installed, so it does not log; call
/// [`log_config`] once the subscriber is up.
pub fn load_or_default(path: Option<&Path>) -> Result<SiteConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(SiteConfig::default()),
    }
}

/// Report where the configuration came from and its key settings.
pub fn log_config(config: &SiteConfig, path: Option<&Path>) {
    let source = path.map_or_else(|| "defaults".to_string(), |p| p.display().to_string());
    tracing::info!(
        source = %source,
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        log_level = %config.observability.log_level,
        "Configuration loaded"
    );
}

/// Run the init functions and freeze the routes.
pub fn build_site(builder: SiteBuilder, config: &SiteConfig) -> Result<Arc<Site>, SiteError> {
    let site = builder.build(config).inspect_err(|e| {
        tracing::error!(error = %e, "Site failed to start");
    })?;
    Ok(Arc::new(site))
}
