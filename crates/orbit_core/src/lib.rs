//! Orbit core: task catalog, stream decoding and the pure app state machine.
mod catalog;
mod effect;
mod msg;
mod record;
mod run;
mod state;
mod stream;
mod update;
mod view_model;

pub use catalog::{fields_for, render_prompt, FieldSpec, FieldValues, TaskKind};
pub use effect::Effect;
pub use msg::Msg;
pub use record::{ExportRequest, RecordId, SavedRecord};
pub use run::{RunId, RunPhase, RunState, TransportError};
pub use state::AppState;
pub use stream::{LineDecoder, StreamRecord};
pub use update::update;
pub use view_model::{AppViewModel, FieldView, RecordRowView};
