use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use orbit_core::{RecordId, SavedRecord};
use orbit_logging::{orbit_debug, orbit_info};
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS saved_docs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at REAL NOT NULL,
    task_id TEXT NOT NULL,
    emoji TEXT NOT NULL,
    title TEXT NOT NULL,
    pdf_path TEXT NOT NULL
);";

const SELECT_COLUMNS: &str = "SELECT id, created_at, task_id, emoji, title, pdf_path FROM saved_docs";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot create index directory {path:?}: {source}")]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Metadata for a document that has already been written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub created_at: DateTime<Utc>,
    pub task_id: String,
    pub symbol: String,
    pub title: String,
    pub path: PathBuf,
}

/// SQLite index of exported documents.
///
/// Opened once at startup and closed explicitly with [`RecordStore::close`].
pub struct RecordStore {
    conn: Connection,
}

impl RecordStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Directory {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(path)?;
        orbit_info!("Opened record index {:?}", path);
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn insert(&self, record: &NewRecord) -> Result<RecordId, StoreError> {
        self.conn.execute(
            "INSERT INTO saved_docs (created_at, task_id, emoji, title, pdf_path) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                to_epoch_seconds(record.created_at),
                record.task_id,
                record.symbol,
                record.title,
                record.path.to_string_lossy().into_owned(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        orbit_debug!("Indexed record {} -> {:?}", id, record.path);
        Ok(id)
    }

    /// All records, newest first.
    pub fn fetch_all(&self) -> Result<Vec<SavedRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC"))?;
        let rows = stmt.query_map([], read_record)?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    pub fn get(&self, id: RecordId) -> Result<Option<SavedRecord>, StoreError> {
        let record = self
            .conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id],
                read_record,
            )
            .optional()?;
        Ok(record)
    }

    /// Removes the row and returns what it pointed to, if it existed.
    pub fn delete(&self, id: RecordId) -> Result<Option<SavedRecord>, StoreError> {
        let existing = self.get(id)?;
        if existing.is_some() {
            self.conn
                .execute("DELETE FROM saved_docs WHERE id = ?1", params![id])?;
            orbit_info!("Deleted record {}", id);
        }
        Ok(existing)
    }

    /// Deletes every row. Returns the number removed.
    pub fn clear(&self) -> Result<usize, StoreError> {
        let removed = self.conn.execute("DELETE FROM saved_docs", [])?;
        orbit_info!("Cleared {} records from index", removed);
        Ok(removed)
    }

    pub fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, err)| StoreError::Sqlite(err))
    }
}

fn read_record(row: &rusqlite::Row<'_>) -> Result<SavedRecord, rusqlite::Error> {
    let created: f64 = row.get(1)?;
    let path: String = row.get(5)?;
    Ok(SavedRecord {
        id: row.get(0)?,
        created_at: from_epoch_seconds(created),
        task_id: row.get(2)?,
        symbol: row.get(3)?,
        title: row.get(4)?,
        path: PathBuf::from(path),
    })
}

fn to_epoch_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp_micros() as f64 / 1_000_000.0
}

fn from_epoch_seconds(seconds: f64) -> DateTime<Utc> {
    DateTime::from_timestamp_micros((seconds * 1_000_000.0).round() as i64).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{from_epoch_seconds, to_epoch_seconds};

    #[test]
    fn epoch_seconds_keep_millisecond_precision() {
        let at = Utc.timestamp_millis_opt(1_754_000_000_123).unwrap();
        assert_eq!(from_epoch_seconds(to_epoch_seconds(at)), at);
    }
}
