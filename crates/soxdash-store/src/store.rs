use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, ErrorCode};
use soxdash_model::{CellScalar, Domain, Table, TableError, UploadBatch};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::schema;

#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLITE_BUSY / SQLITE_LOCKED. Another writer holds the file; the
    /// operation is safe to retry manually.
    #[error("storage is busy; another writer holds the database, retry the operation")]
    Busy,
    #[error("sqlite error: {0}")]
    Sqlite(rusqlite::Error),
    #[error("failed to create data directory {path}: {source}")]
    DataDir {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("refusing to save an upload with zero data rows")]
    EmptyUpload,
    #[error("stored upload id '{0}' is not a valid UUID")]
    BadUploadId(String),
    #[error("stored timestamp '{0}' is not a valid RFC 3339 datetime")]
    BadTimestamp(String),
    #[error("corrupt cell payload in column '{column}': {source}")]
    BadCell {
        column: String,
        source: serde_json::Error,
    },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, _) = &err {
            if matches!(
                failure.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
            ) {
                return StoreError::Busy;
            }
        }
        StoreError::Sqlite(err)
    }
}

/// One domain's persistence layer: one SQLite file, one table.
///
/// Every operation acquires the connection for its own duration only; no
/// statements or transactions are held across calls.
#[derive(Debug, Clone)]
pub struct Store {
    domain: Domain,
    conn: Arc<Mutex<Connection>>,
}

/// How long a writer waits on a locked database before giving up with
/// [`StoreError::Busy`].
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

impl Store {
    pub fn open_path(domain: Domain, path: impl AsRef<Path>) -> crate::Result<Self> {
        Self::open_path_with_busy_timeout(domain, path, DEFAULT_BUSY_TIMEOUT)
    }

    pub fn open_path_with_busy_timeout(
        domain: Domain,
        path: impl AsRef<Path>,
        busy_timeout: Duration,
    ) -> crate::Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(domain, conn, busy_timeout)
    }

    pub fn open_in_memory(domain: Domain) -> crate::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(domain, conn, DEFAULT_BUSY_TIMEOUT)
    }

    fn from_connection(
        domain: Domain,
        conn: Connection,
        busy_timeout: Duration,
    ) -> crate::Result<Self> {
        // Concurrent writers on the same store are serialized by SQLite;
        // whoever still times out gets `StoreError::Busy` and may retry.
        conn.busy_timeout(busy_timeout)?;
        schema::init(&conn, domain)?;
        Ok(Self {
            domain,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Persist every row of `table` as one upload batch.
    ///
    /// The table is first projected onto the domain's declared columns, then
    /// written in a single transaction tagged with a fresh v4 upload id and
    /// the save timestamp. On any failure the transaction rolls back and no
    /// id is exposed.
    pub fn save(&self, table: &Table, filename: &str) -> crate::Result<UploadBatch> {
        let conformed = self.domain.conform(table)?;
        if conformed.is_empty() {
            return Err(StoreError::EmptyUpload);
        }

        let upload_id = Uuid::new_v4();
        let uploaded_at = Utc::now();

        let idents: Vec<&str> = self.domain.columns().iter().map(|c| c.ident).collect();
        let placeholders: Vec<String> =
            (1..=idents.len() + 3).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}, upload_id, filename, uploaded_at) VALUES ({})",
            self.domain.table_name(),
            idents.join(", "),
            placeholders.join(", "),
        );

        let mut conn = self.conn.lock().expect("store mutex poisoned");
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for row in conformed.rows() {
                let mut values: Vec<String> = row
                    .iter()
                    .zip(self.domain.columns())
                    .map(|(cell, column)| encode_cell(cell, column.ident))
                    .collect::<crate::Result<_>>()?;
                values.push(upload_id.to_string());
                values.push(filename.to_string());
                values.push(uploaded_at.to_rfc3339());
                stmt.execute(params_from_iter(values))?;
            }
        }
        tx.commit()?;

        info!(
            store = self.domain.label(),
            upload_id = %upload_id,
            rows = conformed.row_count(),
            filename,
            "saved upload batch"
        );
        Ok(UploadBatch {
            upload_id,
            filename: filename.to_string(),
            uploaded_at,
            row_count: conformed.row_count(),
        })
    }

    /// Every stored row across every batch, in storage order.
    pub fn load_all(&self) -> crate::Result<Table> {
        self.load_where("", params![])
    }

    /// Rows of one batch; an empty table (not an error) for unknown ids.
    pub fn load_by_upload(&self, upload_id: Uuid) -> crate::Result<Table> {
        self.load_where("WHERE upload_id = ?1", params![upload_id.to_string()])
    }

    fn load_where(
        &self,
        clause: &str,
        params: impl rusqlite::Params,
    ) -> crate::Result<Table> {
        let idents: Vec<&str> = self.domain.columns().iter().map(|c| c.ident).collect();
        let sql = format!(
            "SELECT {} FROM {} {} ORDER BY id",
            idents.join(", "),
            self.domain.table_name(),
            clause,
        );

        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params)?;

        let mut table = Table::new(
            self.domain
                .columns()
                .iter()
                .map(|c| c.header.to_string())
                .collect(),
        );
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(idents.len());
            for (i, column) in self.domain.columns().iter().enumerate() {
                let raw: Option<String> = row.get(i)?;
                cells.push(decode_cell(raw, column.ident)?);
            }
            table.push_row(cells)?;
        }
        debug!(store = self.domain.label(), rows = table.row_count(), "loaded rows");
        Ok(table)
    }

    /// Remove every row tagged with `upload_id`. Returns the number of rows
    /// deleted; 0 for unknown ids.
    pub fn delete_by_upload(&self, upload_id: Uuid) -> crate::Result<usize> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let deleted = conn.execute(
            &format!("DELETE FROM {} WHERE upload_id = ?1", self.domain.table_name()),
            params![upload_id.to_string()],
        )?;
        info!(
            store = self.domain.label(),
            upload_id = %upload_id,
            rows = deleted,
            "deleted upload batch"
        );
        Ok(deleted)
    }

    /// One entry per distinct upload id, newest first.
    pub fn summary(&self) -> crate::Result<Vec<UploadBatch>> {
        let sql = format!(
            "SELECT upload_id, filename, uploaded_at, COUNT(*) \
             FROM {} GROUP BY upload_id ORDER BY MAX(id) DESC",
            self.domain.table_name(),
        );

        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;

        let mut batches = Vec::new();
        while let Some(row) = rows.next()? {
            let raw_id: String = row.get(0)?;
            let filename: String = row.get(1)?;
            let raw_at: String = row.get(2)?;
            let row_count: usize = row.get::<_, i64>(3)? as usize;

            let upload_id = Uuid::parse_str(&raw_id)
                .map_err(|_| StoreError::BadUploadId(raw_id))?;
            let uploaded_at = DateTime::parse_from_rfc3339(&raw_at)
                .map_err(|_| StoreError::BadTimestamp(raw_at))?
                .with_timezone(&Utc);
            batches.push(UploadBatch {
                upload_id,
                filename,
                uploaded_at,
                row_count,
            });
        }
        Ok(batches)
    }
}

fn encode_cell(cell: &CellScalar, column: &str) -> crate::Result<String> {
    serde_json::to_string(cell).map_err(|source| StoreError::BadCell {
        column: column.to_string(),
        source,
    })
}

fn decode_cell(raw: Option<String>, column: &str) -> crate::Result<CellScalar> {
    match raw {
        None => Ok(CellScalar::Empty),
        Some(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::BadCell {
            column: column.to_string(),
            source,
        }),
    }
}
