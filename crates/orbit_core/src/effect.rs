use crate::{ExportRequest, RecordId, RunId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartGeneration { run_id: RunId, prompt: String },
    CancelGeneration { run_id: RunId },
    ExportDocument(ExportRequest),
    LoadRecords,
    DeleteRecord { id: RecordId },
}
