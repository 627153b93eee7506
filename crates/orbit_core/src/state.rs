use crate::view_model::{AppViewModel, FieldView, RecordRowView};
use crate::{
    ExportRequest, FieldValues, RecordId, RunId, RunState, SavedRecord, TaskKind, TransportError,
};

/// Task and inputs that produced the current response, captured at run start.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RunOrigin {
    task: TaskKind,
    values: FieldValues,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    selected: TaskKind,
    values: FieldValues,
    prompt_preview: String,
    run: RunState,
    origin: Option<RunOrigin>,
    records: Vec<SavedRecord>,
    /// Number of record lists received from the index.
    records_loads: u64,
    export_pending: bool,
    status: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        let mut state = Self::default();
        state.refresh_preview();
        state
    }

    pub fn view(&self) -> AppViewModel {
        let fields = self
            .selected
            .fields()
            .iter()
            .map(|spec| FieldView {
                key: spec.key,
                label: spec.label,
                placeholder: spec.placeholder,
                multiline: spec.multiline,
                preferred_rows: spec.preferred_rows,
                value: self.values.get(spec.key).cloned().unwrap_or_default(),
            })
            .collect();
        let records = self
            .records
            .iter()
            .map(|record| RecordRowView {
                id: record.id,
                created_at: record.created_at,
                symbol: record.symbol.clone(),
                title: record.title.clone(),
                path: record.path.clone(),
            })
            .collect();

        AppViewModel {
            selected: self.selected,
            fields,
            prompt_preview: self.prompt_preview.clone(),
            can_run: self.can_run(),
            can_save: self.can_save(),
            run_id: self.run.run_id(),
            run_phase: self.run.phase(),
            response: self.run.text().to_string(),
            error: self.run.error().map(ToOwned::to_owned),
            records,
            records_loads: self.records_loads,
            status: self.status.clone(),
            dirty: self.dirty,
        }
    }

    pub fn selected(&self) -> TaskKind {
        self.selected
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn prompt_preview(&self) -> &str {
        &self.prompt_preview
    }

    pub fn records(&self) -> &[SavedRecord] {
        &self.records
    }

    /// Returns whether anything visible changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn select_task(&mut self, task: TaskKind) {
        self.selected = task;
        self.values.clear();
        self.refresh_preview();
        self.mark_dirty();
    }

    /// Stores a field value. Keys the selected task does not declare are
    /// ignored.
    pub(crate) fn set_field(&mut self, key: String, value: String) -> bool {
        if self.selected.field(&key).is_none() {
            return false;
        }
        self.values.insert(key, value);
        self.refresh_preview();
        self.mark_dirty();
        true
    }

    pub(crate) fn can_run(&self) -> bool {
        !self.prompt_preview.trim().is_empty()
    }

    pub(crate) fn can_save(&self) -> bool {
        !self.run.is_running()
            && !self.export_pending
            && self.origin.is_some()
            && !self.run.text().trim().is_empty()
    }

    pub(crate) fn start_run(&mut self) -> (RunId, Option<RunId>) {
        self.origin = Some(RunOrigin {
            task: self.selected,
            values: self.values.clone(),
        });
        self.status = None;
        self.mark_dirty();
        self.run.start()
    }

    pub(crate) fn stop_run(&mut self) -> Option<RunId> {
        let cancelled = self.run.cancel();
        if cancelled.is_some() {
            self.mark_dirty();
        }
        cancelled
    }

    pub(crate) fn apply_chunk(&mut self, run_id: RunId, bytes: &[u8]) {
        if self.run.on_bytes(run_id, bytes) {
            self.mark_dirty();
        }
    }

    pub(crate) fn apply_stream_end(&mut self, run_id: RunId) {
        if self.run.on_stream_end(run_id) {
            self.mark_dirty();
        }
    }

    pub(crate) fn apply_transport_error(&mut self, run_id: RunId, error: TransportError) {
        if self.run.on_transport_error(run_id, error) {
            self.mark_dirty();
        }
    }

    /// Builds the export request for the finished run and marks an export as
    /// in flight.
    pub(crate) fn begin_export(&mut self) -> Option<ExportRequest> {
        if !self.can_save() {
            return None;
        }
        let origin = self.origin.as_ref()?;
        let task = origin.task;
        let request = ExportRequest {
            task_id: task.id().to_string(),
            symbol: task.symbol().to_string(),
            title: task.title().to_string(),
            inputs: task.export_inputs(&origin.values),
            body: self.run.text().to_string(),
            suggested_name: task.id().to_string(),
        };
        self.export_pending = true;
        self.status = Some("Saving...".to_string());
        self.mark_dirty();
        Some(request)
    }

    pub(crate) fn finish_export(&mut self, result: Result<SavedRecord, String>) {
        self.export_pending = false;
        match result {
            Ok(record) => {
                self.status = Some(format!("Saved {}", record.path.display()));
                self.records.retain(|existing| existing.id != record.id);
                self.records.insert(0, record);
            }
            Err(message) => {
                self.status = Some(format!("Save failed: {message}"));
            }
        }
        self.mark_dirty();
    }

    pub(crate) fn set_records(&mut self, records: Vec<SavedRecord>) {
        self.records = records;
        self.records_loads += 1;
        self.mark_dirty();
    }

    pub(crate) fn has_record(&self, id: RecordId) -> bool {
        self.records.iter().any(|record| record.id == id)
    }

    pub(crate) fn finish_delete(&mut self, result: Result<RecordId, String>) {
        match result {
            Ok(id) => {
                self.records.retain(|record| record.id != id);
                self.status = Some(format!("Deleted record {id}"));
            }
            Err(message) => {
                self.status = Some(format!("Delete failed: {message}"));
            }
        }
        self.mark_dirty();
    }

    pub(crate) fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
        self.mark_dirty();
    }

    fn refresh_preview(&mut self) {
        self.prompt_preview = self.selected.render_prompt(&self.values);
    }
}
