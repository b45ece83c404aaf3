use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata for one spreadsheet ingestion event.
///
/// Created by a successful `save`, immutable afterwards; the batch and all
/// rows tagged with its id are removed together by delete-by-upload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UploadBatch {
    pub upload_id: Uuid,
    /// Original file name, informational only.
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
    pub row_count: usize,
}
