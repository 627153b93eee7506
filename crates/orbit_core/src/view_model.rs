use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::{RecordId, RunId, RunPhase, TaskKind};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub selected: TaskKind,
    pub fields: Vec<FieldView>,
    pub prompt_preview: String,
    pub can_run: bool,
    pub can_save: bool,
    pub run_id: RunId,
    pub run_phase: RunPhase,
    pub response: String,
    pub error: Option<String>,
    pub records: Vec<RecordRowView>,
    /// Bumped on every load, even when the rows are unchanged.
    pub records_loads: u64,
    pub status: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub key: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub multiline: bool,
    pub preferred_rows: Option<u16>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRowView {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    pub symbol: String,
    pub title: String,
    pub path: PathBuf,
}
