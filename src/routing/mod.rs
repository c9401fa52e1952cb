//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     (pattern, handler)[]
//!     → pattern.rs (parse "/users/{id}" into segments)
//!     → router.rs (reject ambiguous shapes, sort by specificity)
//!     → Freeze as immutable Router
//!
//! Incoming URL ("/users/42?tab=posts#top")
//!     → route.rs (split fragment, query, path; decode query)
//!     → router.rs (first pattern matching every segment)
//!     → info.rs (merge dynamic + query params)
//!     → Return: RouteMatch or NotFound
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Most literal segments wins; ties keep registration order
//! - Patterns with the same shape are rejected at registration
//! - Explicit NotFound rather than silent default
//! - Malformed percent-encoding is passed through, never fatal

pub mod error;
pub mod info;
pub mod pattern;
pub mod route;
pub mod router;

pub use error::{NotFound, RouteError};
pub use info::RouteInfo;
pub use pattern::RoutePattern;
pub use route::{QueryParams, Route};
pub use router::{RouteMatch, Router, RouterBuilder};
