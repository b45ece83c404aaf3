//! SQLite-backed storage for dashboard uploads.
//!
//! Each of the four reporting domains owns its own database file and table;
//! nothing in this crate ever opens a connection across domains. The crate
//! exposes:
//! - Idempotent per-domain schema creation
//! - Batch save with upload-id tagging (all rows in one transaction)
//! - Load-all / load-by-upload / delete-by-upload / per-upload summary
//! - A `StoreSet` owning one store per domain for routing

mod schema;
mod set;
mod store;

pub use set::StoreSet;
pub use store::{Store, StoreError, DEFAULT_BUSY_TIMEOUT};

pub type Result<T> = std::result::Result<T, StoreError>;
