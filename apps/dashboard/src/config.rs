use std::path::PathBuf;

use soxdash_model::Domain;
use soxdash_ingest::DEFAULT_MAX_ROWS;

/// Environment-driven settings.
///
/// Variable names and defaults follow the ops runbook: `DB_DIR` (default
/// `data`), `LOG_DIR` (default `logs`), `LOG_LEVEL` (default `info`),
/// `MAX_ROWS` (default 100,000), plus optional per-store database overrides
/// such as `SOXDASH_MICS_TICKETS_DB=/srv/tickets.db`.
#[derive(Clone, Debug)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
    pub max_rows: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            log_dir: PathBuf::from("logs"),
            log_level: "info".to_string(),
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Self {
            data_dir: env_path("DB_DIR").unwrap_or(defaults.data_dir),
            log_dir: env_path("LOG_DIR").unwrap_or(defaults.log_dir),
            log_level: std::env::var("LOG_LEVEL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.log_level),
            max_rows: std::env::var("MAX_ROWS")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_rows),
        }
    }

    /// Database file for one store: the per-store override when set,
    /// otherwise the default file name under `data_dir`.
    pub fn store_path(&self, domain: Domain) -> PathBuf {
        let var = format!(
            "SOXDASH_{}_DB",
            domain.slug().replace('-', "_").to_uppercase()
        );
        env_path(&var).unwrap_or_else(|| self.data_dir.join(domain.db_file_name()))
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
