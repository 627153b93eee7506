use orbit_core::{LineDecoder, RunPhase, RunState, StreamRecord};

const STREAM: &[u8] = b"{\"response\":\"ab\",\"done\":false}\n{\"response\":\"cd\",\"done\":true}\n";

fn feed(chunks: &[&[u8]]) -> RunState {
    let mut run = RunState::new();
    let (id, _) = run.start();
    for chunk in chunks {
        run.on_bytes(id, chunk);
    }
    run
}

#[test]
fn every_two_way_split_yields_same_result() {
    for cut in 0..=STREAM.len() {
        let run = feed(&[&STREAM[..cut], &STREAM[cut..]]);
        assert_eq!(run.text(), "abcd", "split at {cut}");
        assert_eq!(run.phase(), RunPhase::Completed, "split at {cut}");
    }
}

#[test]
fn every_three_way_split_yields_same_result() {
    for first in 0..=STREAM.len() {
        for second in first..=STREAM.len() {
            let run = feed(&[&STREAM[..first], &STREAM[first..second], &STREAM[second..]]);
            assert_eq!(run.text(), "abcd", "splits at {first}/{second}");
            assert_eq!(run.phase(), RunPhase::Completed);
        }
    }
}

#[test]
fn byte_at_a_time_yields_same_result() {
    let chunks: Vec<&[u8]> = STREAM.chunks(1).collect();
    let run = feed(&chunks);
    assert_eq!(run.text(), "abcd");
    assert_eq!(run.phase(), RunPhase::Completed);
}

#[test]
fn multibyte_fragment_split_inside_character() {
    let stream = "{\"response\":\"héllo ✓\",\"done\":true}\n".as_bytes();
    let check = stream.iter().position(|b| *b == 0xE2).unwrap();
    let run = feed(&[&stream[..check + 1], &stream[check + 1..]]);
    assert_eq!(run.text(), "héllo ✓");
}

#[test]
fn blank_and_garbage_lines_are_skipped() {
    let stream = b"{\"response\":\"one\",\"done\":false}\n\nnot valid json\n{\"response\":\" two\",\"done\":false}\n";
    let mut decoder = LineDecoder::new();
    let records = decoder.push(stream);
    assert_eq!(
        records,
        vec![
            StreamRecord {
                response: "one".into(),
                done: false
            },
            StreamRecord {
                response: " two".into(),
                done: false
            },
        ]
    );

    let run = feed(&[&stream[..40], &stream[40..]]);
    assert_eq!(run.text(), "one two");
    assert_eq!(run.phase(), RunPhase::Running);
}

#[test]
fn bytes_after_done_are_ignored() {
    let mut run = RunState::new();
    let (id, _) = run.start();
    run.on_bytes(
        id,
        b"{\"response\":\"end\",\"done\":true}\n{\"response\":\"extra\",\"done\":false}\n",
    );
    assert!(!run.on_bytes(id, b"{\"response\":\"more\"}\n"));
    assert_eq!(run.text(), "end");
    assert_eq!(run.phase(), RunPhase::Completed);
}

#[test]
fn clean_close_without_done_completes() {
    let mut run = RunState::new();
    let (id, _) = run.start();
    run.on_bytes(id, b"{\"response\":\"half\"}\n{\"respo");
    assert!(run.on_stream_end(id));
    assert_eq!(run.phase(), RunPhase::Completed);
    assert_eq!(run.text(), "half");
    assert_eq!(run.error(), None);
}
