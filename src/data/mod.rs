//! Service-locator data store.
//!
//! # Data Flow
//! ```text
//! Startup (init functions):
//!     InitApiContext
//!     → DataStore::set::<Key>(value)
//!     → stored under the key's TypeId
//!
//! Serving (request handlers):
//!     ApiContext / PageContext
//!     → Data::get::<Key>()       (soft: None when absent)
//!     → Data::get_value::<Key>() (hard: DataError, aborts the request)
//! ```
//!
//! # Design Decisions
//! - Keys are zero-sized marker types implementing `DataKey`; each key names
//!   exactly one value type at compile time
//! - One store-wide mutex, held only for the map access
//! - Values are handed out as `Arc`s so no lock is held across caller logic
//! - Handlers only ever see the read-only `Data` view

pub mod store;

pub use store::{Data, DataError, DataKey, DataStore};
