use orbit_logging::orbit_debug;

use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::TaskSelected(task) => {
            state.select_task(task);
            Vec::new()
        }
        Msg::FieldChanged { key, value } => {
            if !state.set_field(key.clone(), value) {
                orbit_debug!(
                    "Ignoring value for unknown field {:?} on task {}",
                    key,
                    state.selected()
                );
            }
            Vec::new()
        }
        Msg::RunClicked => {
            if !state.can_run() {
                return (state, Vec::new());
            }
            let prompt = state.prompt_preview().to_string();
            let (run_id, cancelled) = state.start_run();
            let mut effects = Vec::with_capacity(2);
            if let Some(previous) = cancelled {
                effects.push(Effect::CancelGeneration { run_id: previous });
            }
            effects.push(Effect::StartGeneration { run_id, prompt });
            effects
        }
        Msg::StopClicked => match state.stop_run() {
            Some(run_id) => vec![Effect::CancelGeneration { run_id }],
            None => Vec::new(),
        },
        Msg::StreamChunk { run_id, bytes } => {
            state.apply_chunk(run_id, &bytes);
            Vec::new()
        }
        Msg::StreamEnded { run_id } => {
            state.apply_stream_end(run_id);
            Vec::new()
        }
        Msg::StreamFailed { run_id, error } => {
            state.apply_transport_error(run_id, error);
            Vec::new()
        }
        Msg::SaveClicked => match state.begin_export() {
            Some(request) => vec![Effect::ExportDocument(request)],
            None => {
                state.set_status("Nothing to save yet");
                Vec::new()
            }
        },
        Msg::ExportFinished(result) => {
            state.finish_export(result);
            Vec::new()
        }
        Msg::RecordsRequested => vec![Effect::LoadRecords],
        Msg::RecordsLoaded(records) => {
            state.set_records(records);
            Vec::new()
        }
        Msg::DeleteRecordClicked(id) => {
            if state.has_record(id) {
                vec![Effect::DeleteRecord { id }]
            } else {
                state.set_status(format!("No saved record with id {id}"));
                Vec::new()
            }
        }
        Msg::RecordDeleted(result) => {
            state.finish_delete(result);
            Vec::new()
        }
    };

    (state, effects)
}
