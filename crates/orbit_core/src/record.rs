use std::path::PathBuf;

use chrono::{DateTime, Utc};

pub type RecordId = i64;

/// A persisted reference to an exported document.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedRecord {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    pub task_id: String,
    pub symbol: String,
    pub title: String,
    pub path: PathBuf,
}

/// Everything the exporter needs to produce a document for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub task_id: String,
    pub symbol: String,
    pub title: String,
    /// Ordered `(field label, value)` pairs.
    pub inputs: Vec<(String, String)>,
    pub body: String,
    /// File stem before sanitizing; the exporter adds the extension.
    pub suggested_name: String,
}
