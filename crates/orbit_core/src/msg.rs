use crate::{RecordId, RunId, SavedRecord, TaskKind, TransportError};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User picked a task from the catalog. Clears all field values.
    TaskSelected(TaskKind),
    /// User edited one field of the selected task.
    FieldChanged { key: String, value: String },
    /// User asked to run the current prompt.
    RunClicked,
    /// User asked to stop the live run.
    StopClicked,
    /// Engine delivered raw response bytes.
    StreamChunk { run_id: RunId, bytes: Vec<u8> },
    /// Engine saw the response body end cleanly.
    StreamEnded { run_id: RunId },
    /// Engine request failed or was aborted.
    StreamFailed { run_id: RunId, error: TransportError },
    /// User asked to export the current result.
    SaveClicked,
    /// Exporter finished writing and indexing a document.
    ExportFinished(Result<SavedRecord, String>),
    /// User asked to refresh the saved record list.
    RecordsRequested,
    RecordsLoaded(Vec<SavedRecord>),
    DeleteRecordClicked(RecordId),
    RecordDeleted(Result<RecordId, String>),
}
