use std::path::{Path, PathBuf};

use soxdash_model::Domain;

use crate::store::Store;

/// One open store per domain.
///
/// Isolation is structural: each store is constructed over its own database
/// file, so no operation routed through the set can touch another domain's
/// data.
#[derive(Debug, Clone)]
pub struct StoreSet {
    stores: [Store; 4],
}

impl StoreSet {
    /// Open all four stores under `dir` with their default file names,
    /// creating the directory if needed.
    pub fn open_dir(dir: impl AsRef<Path>) -> crate::Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|source| crate::StoreError::DataDir {
            path: dir.to_path_buf(),
            source,
        })?;
        Self::open_paths(|domain| dir.join(domain.db_file_name()))
    }

    /// Open all four stores at caller-chosen paths (per-store overrides).
    pub fn open_paths(mut resolve: impl FnMut(Domain) -> PathBuf) -> crate::Result<Self> {
        Ok(Self {
            stores: [
                Store::open_path(Domain::ControlStatus, resolve(Domain::ControlStatus))?,
                Store::open_path(Domain::MicsTickets, resolve(Domain::MicsTickets))?,
                Store::open_path(Domain::MicsEffort, resolve(Domain::MicsEffort))?,
                Store::open_path(Domain::MicsSa, resolve(Domain::MicsSa))?,
            ],
        })
    }

    /// Four in-memory stores; used by tests and dry runs.
    pub fn open_in_memory() -> crate::Result<Self> {
        Ok(Self {
            stores: [
                Store::open_in_memory(Domain::ControlStatus)?,
                Store::open_in_memory(Domain::MicsTickets)?,
                Store::open_in_memory(Domain::MicsEffort)?,
                Store::open_in_memory(Domain::MicsSa)?,
            ],
        })
    }

    pub fn store(&self, domain: Domain) -> &Store {
        // `Domain::ALL` ordering matches the array above.
        let idx = Domain::ALL
            .iter()
            .position(|d| *d == domain)
            .expect("domain is one of the four fixed variants");
        &self.stores[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Store> {
        self.stores.iter()
    }
}
