use orbit_logging::{orbit_debug, payload_preview};
use serde::Deserialize;

/// One decoded line of a newline-delimited JSON generation stream.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct StreamRecord {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
}

/// Incremental decoder for newline-delimited JSON.
///
/// Chunks may split records anywhere, including inside a multi-byte UTF-8
/// sequence; bytes after the last `\n` stay buffered until the next push.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and returns every complete record, in arrival order.
    ///
    /// Blank lines are skipped. Lines that are not a JSON object are dropped
    /// and only reported at debug level.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamRecord> {
        self.buffer.extend_from_slice(chunk);

        let mut records = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buffer[start..].iter().position(|b| *b == b'\n') {
            let end = start + offset;
            if let Some(record) = decode_line(&self.buffer[start..end]) {
                records.push(record);
            }
            start = end + 1;
        }
        self.buffer.drain(..start);
        records
    }

    /// Number of buffered bytes not yet terminated by a newline.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

fn decode_line(line: &[u8]) -> Option<StreamRecord> {
    if line.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice::<StreamRecord>(line) {
        Ok(record) => Some(record),
        Err(err) => {
            orbit_debug!(
                "Dropping undecodable stream line ({} bytes): {} [{}]",
                line.len(),
                err,
                payload_preview(line)
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LineDecoder, StreamRecord};

    #[test]
    fn keeps_partial_tail_buffered() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.push(br#"{"response":"a""#).is_empty());
        assert_eq!(decoder.pending_len(), 15);
        let records = decoder.push(b",\"done\":true}\n");
        assert_eq!(
            records,
            vec![StreamRecord {
                response: "a".into(),
                done: true
            }]
        );
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn missing_fields_default() {
        let mut decoder = LineDecoder::new();
        let records = decoder.push(b"{\"model\":\"m\"}\r\n");
        assert_eq!(records, vec![StreamRecord::default()]);
    }

    #[test]
    fn non_object_json_is_dropped() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.push(b"[1,2]\n\"text\"\n").is_empty());
    }
}
