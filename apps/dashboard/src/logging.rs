use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Install the process-wide subscriber writing to one file per calendar day
/// under the configured log directory (`soxdash.YYYY-MM-DD.log`).
///
/// `RUST_LOG` takes precedence over the configured level. The returned guard
/// is the appender's only flush point: it must be dropped (not leaked via
/// `process::exit`) before the process ends or buffered lines are lost.
pub fn init(config: &Config) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&config.log_dir).with_context(|| {
        format!("create log directory {}", config.log_dir.display())
    })?;

    let file = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("soxdash")
        .filename_suffix("log")
        .build(&config.log_dir)
        .context("create daily log appender")?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .init();

    Ok(guard)
}
