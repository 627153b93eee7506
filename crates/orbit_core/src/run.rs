use std::fmt;

use orbit_logging::{orbit_debug, orbit_info, orbit_warn};

use crate::stream::LineDecoder;

/// Generation counter identifying one run. Events carrying any other id are
/// stale and must not touch the current run.
pub type RunId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl RunPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunPhase::Completed | RunPhase::Failed | RunPhase::Cancelled
        )
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunPhase::Idle => "idle",
            RunPhase::Running => "running",
            RunPhase::Completed => "completed",
            RunPhase::Failed => "failed",
            RunPhase::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// Transport-level outcome reported for a run that did not end with `done`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request was aborted on purpose.
    Cancelled,
    Failed(String),
}

/// State of the single live inference run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunState {
    run_id: RunId,
    phase: RunPhase,
    text: String,
    error: Option<String>,
    decoder: LineDecoder,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    /// Begins a new run, cancelling the current one first.
    ///
    /// Returns the new run id and, if a run was live, the id that was
    /// cancelled so its transport can be aborted.
    pub fn start(&mut self) -> (RunId, Option<RunId>) {
        let cancelled = self.cancel();
        self.run_id += 1;
        self.phase = RunPhase::Running;
        self.text.clear();
        self.error = None;
        self.decoder.reset();
        orbit_info!("Run {} started", self.run_id);
        (self.run_id, cancelled)
    }

    /// Feeds a chunk of the response body. Returns `true` if the run state
    /// changed.
    pub fn on_bytes(&mut self, run_id: RunId, chunk: &[u8]) -> bool {
        if !self.accepts(run_id) {
            orbit_debug!(
                "Ignoring {} stale bytes for run {} (current {} {})",
                chunk.len(),
                run_id,
                self.run_id,
                self.phase
            );
            return false;
        }

        let mut changed = false;
        for record in self.decoder.push(chunk) {
            if !record.response.is_empty() {
                self.text.push_str(&record.response);
                changed = true;
            }
            if record.done {
                self.phase = RunPhase::Completed;
                self.decoder.reset();
                orbit_info!(
                    "Run {} completed ({} bytes of text)",
                    run_id,
                    self.text.len()
                );
                return true;
            }
        }
        changed
    }

    /// The response body ended without a `done` record.
    pub fn on_stream_end(&mut self, run_id: RunId) -> bool {
        if !self.accepts(run_id) {
            return false;
        }
        if self.decoder.pending_len() > 0 {
            orbit_debug!(
                "Run {} ended with {} undecoded trailing bytes",
                run_id,
                self.decoder.pending_len()
            );
        }
        self.phase = RunPhase::Completed;
        self.decoder.reset();
        orbit_info!("Run {} stream closed", run_id);
        true
    }

    pub fn on_transport_error(&mut self, run_id: RunId, error: TransportError) -> bool {
        if !self.accepts(run_id) {
            return false;
        }
        self.decoder.reset();
        match error {
            TransportError::Cancelled => {
                self.phase = RunPhase::Cancelled;
                orbit_info!("Run {} cancelled by transport", run_id);
            }
            TransportError::Failed(message) => {
                orbit_warn!("Run {} failed: {}", run_id, message);
                self.phase = RunPhase::Failed;
                self.error = Some(message);
            }
        }
        true
    }

    /// Cancels the live run. No-op unless running.
    pub fn cancel(&mut self) -> Option<RunId> {
        if !self.is_running() {
            return None;
        }
        self.phase = RunPhase::Cancelled;
        self.decoder.reset();
        orbit_info!("Run {} cancelled", self.run_id);
        Some(self.run_id)
    }

    fn accepts(&self, run_id: RunId) -> bool {
        self.is_running() && run_id == self.run_id
    }
}

#[cfg(test)]
mod tests {
    use super::{RunPhase, RunState, TransportError};

    #[test]
    fn failure_keeps_partial_text() {
        let mut run = RunState::new();
        let (id, _) = run.start();
        run.on_bytes(id, b"{\"response\":\"par\"}\n{\"response\":\"tial\"}\n");
        assert!(run.on_transport_error(id, TransportError::Failed("reset by peer".into())));
        assert_eq!(run.phase(), RunPhase::Failed);
        assert_eq!(run.text(), "partial");
        assert_eq!(run.error(), Some("reset by peer"));
    }

    #[test]
    fn transport_cancellation_has_no_message() {
        let mut run = RunState::new();
        let (id, _) = run.start();
        assert!(run.on_transport_error(id, TransportError::Cancelled));
        assert_eq!(run.phase(), RunPhase::Cancelled);
        assert_eq!(run.error(), None);
    }

    #[test]
    fn late_error_after_completion_is_ignored() {
        let mut run = RunState::new();
        let (id, _) = run.start();
        run.on_bytes(id, b"{\"response\":\"x\",\"done\":true}\n");
        assert!(!run.on_transport_error(id, TransportError::Failed("late".into())));
        assert_eq!(run.phase(), RunPhase::Completed);
        assert_eq!(run.error(), None);
    }
}
