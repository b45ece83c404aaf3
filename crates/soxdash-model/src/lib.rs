//! Core in-memory data model for the SOX/MICS compliance dashboard.
//!
//! This crate is intentionally self-contained so the ingest, storage and
//! export layers can share one tabular representation. It exposes:
//! - The scalar cell value type used across all layers
//! - Ordered, column-named tables
//! - The four fixed reporting domains and their declared column sets
//! - Upload batch metadata

mod domain;
mod table;
mod upload;
mod value;

pub use domain::{Domain, DomainColumn};
pub use table::{Table, TableError};
pub use upload::UploadBatch;
pub use value::CellScalar;
