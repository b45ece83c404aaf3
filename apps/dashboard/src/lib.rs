//! Backend wiring for the dashboard binary.
//!
//! The library half exists so session routing, configuration and error
//! classification can be unit/integration tested without spawning the CLI.

pub mod cli;
pub mod config;
pub mod logging;
pub mod session;

pub use config::Config;
pub use session::{DashboardError, Session, Severity};
