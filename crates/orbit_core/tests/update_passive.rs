//! Messages that must leave the state exactly as it was.

use orbit_core::{update, AppState, Msg, TransportError};

fn assert_untouched(msg: Msg) {
    let state = AppState::new();
    let (mut next, effects) = update(state.clone(), msg.clone());

    assert_eq!(state, next, "{msg:?} changed the state");
    assert!(effects.is_empty(), "{msg:?} produced effects");
    assert!(!next.consume_dirty(), "{msg:?} requested a render");
}

#[test]
fn stream_events_without_a_run() {
    assert_untouched(Msg::StreamChunk {
        run_id: 1,
        bytes: b"{\"response\":\"x\",\"done\":false}\n".to_vec(),
    });
    assert_untouched(Msg::StreamEnded { run_id: 1 });
    assert_untouched(Msg::StreamFailed {
        run_id: 1,
        error: TransportError::Failed("connection reset".to_string()),
    });
}

#[test]
fn stop_when_idle() {
    assert_untouched(Msg::StopClicked);
}

#[test]
fn unknown_field_key() {
    assert_untouched(Msg::FieldChanged {
        key: "no-such-field".to_string(),
        value: "ignored".to_string(),
    });
}
