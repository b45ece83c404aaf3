use std::path::Path;

use soxdash_export::ExportError;
use soxdash_ingest::IngestError;
use soxdash_model::{Domain, Table, UploadBatch};
use soxdash_store::{Store, StoreError, StoreSet};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;

/// How a failure should be presented to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// User-correctable: fix the file or retry; shown with the specific
    /// actionable message.
    Warning,
    /// Unexpected: shown as a generic message, full detail in the log.
    Error,
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl DashboardError {
    pub fn severity(&self) -> Severity {
        match self {
            DashboardError::Ingest(err) if err.is_validation() => Severity::Warning,
            DashboardError::Store(StoreError::Table(_))
            | DashboardError::Store(StoreError::EmptyUpload)
            | DashboardError::Store(StoreError::Busy) => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// One-line message for the user. Validation failures carry their
    /// specific cause; storage and export failures stay generic (the log has
    /// the detail) but remain distinguishable from each other.
    pub fn user_message(&self) -> String {
        match (self, self.severity()) {
            (_, Severity::Warning) => self.to_string(),
            (DashboardError::Ingest(_), _) => {
                "could not read the uploaded file; details were logged".to_string()
            }
            (DashboardError::Store(_), _) => {
                "storage failure; the operation was aborted and details were logged".to_string()
            }
            (DashboardError::Export(_), _) => {
                "download rendering failed; stored data is unaffected".to_string()
            }
        }
    }
}

/// Session state: one open store per domain plus the active-store selection.
///
/// The selection defaults to Control Status, changes only through
/// [`Session::select`], and is never persisted. Every operation routes
/// through the currently active store and nothing else.
pub struct Session {
    active: Domain,
    stores: StoreSet,
    max_rows: usize,
}

impl Session {
    pub fn new(stores: StoreSet, max_rows: usize) -> Self {
        Self {
            active: Domain::ControlStatus,
            stores,
            max_rows,
        }
    }

    /// Open the four stores at their configured paths.
    pub fn open(config: &Config) -> Result<Self, DashboardError> {
        let stores = StoreSet::open_paths(|domain| config.store_path(domain))?;
        Ok(Self::new(stores, config.max_rows))
    }

    pub fn active(&self) -> Domain {
        self.active
    }

    /// Switch the active store. Takes effect before any subsequent call.
    pub fn select(&mut self, domain: Domain) {
        if self.active != domain {
            info!(from = self.active.label(), to = domain.label(), "switched active store");
            self.active = domain;
        }
    }

    fn store(&self) -> &Store {
        self.stores.store(self.active)
    }

    /// Load a spreadsheet from disk and persist it into the active store as
    /// one upload batch.
    pub fn upload(&self, path: &Path) -> Result<UploadBatch, DashboardError> {
        let table = soxdash_ingest::load_path(path, self.max_rows)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(self.store().save(&table, &filename)?)
    }

    /// Rows from the active store, optionally restricted to one upload batch
    /// and narrowed by exact-match column filters.
    pub fn list(
        &self,
        upload_id: Option<Uuid>,
        filters: &[(String, String)],
    ) -> Result<Table, DashboardError> {
        let mut table = match upload_id {
            Some(id) => self.store().load_by_upload(id)?,
            None => self.store().load_all()?,
        };
        for (column, value) in filters {
            table = table.filter_eq(column, value);
        }
        Ok(table)
    }

    pub fn summary(&self) -> Result<Vec<UploadBatch>, DashboardError> {
        Ok(self.store().summary()?)
    }

    pub fn delete(&self, upload_id: Uuid) -> Result<usize, DashboardError> {
        Ok(self.store().delete_by_upload(upload_id)?)
    }

    pub fn export_csv(
        &self,
        upload_id: Option<Uuid>,
        filters: &[(String, String)],
    ) -> Result<Vec<u8>, DashboardError> {
        let table = self.list(upload_id, filters)?;
        Ok(soxdash_export::to_csv_bytes(&table)?)
    }

    pub fn export_xlsx(
        &self,
        upload_id: Option<Uuid>,
        filters: &[(String, String)],
    ) -> Result<Vec<u8>, DashboardError> {
        let table = self.list(upload_id, filters)?;
        Ok(soxdash_export::to_xlsx_bytes(&table)?)
    }
}
