//! Page and API registration.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     SiteBuilder
//!     → page()/api() register handlers into two RouterBuilders
//!     → init() functions run in order against the mutable DataStore
//!     → Site (frozen routers + shared store)
//!
//! Per request:
//!     Site::render(url)  → pages router → Page::render(&PageContext)
//!     Site::call_api(..) → API router   → ApiHandler::handle(&ApiContext)
//! ```
//!
//! # Design Decisions
//! - Every handler receives its `RouteInfo` and `Data` view as explicit
//!   context; there is no ambient "current page" state
//! - Init functions are the only code that sees the mutable store
//! - A failing init function aborts startup

pub mod api;
pub mod init;
pub mod page;
pub mod registry;

pub use api::{ApiContext, ApiError, ApiHandler, ApiResponse};
pub use init::{InitApi, InitApiContext, InitError};
pub use page::{escape_html, Page, PageContext};
pub use registry::{Site, SiteBuilder, SiteError};
