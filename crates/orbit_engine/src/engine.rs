use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use orbit_core::RunId;
use orbit_logging::{orbit_debug, orbit_error, orbit_info};
use tokio_util::sync::CancellationToken;

use crate::generate::{ChannelChunkSink, Generator, GenerateSettings, OllamaGenerator};
use crate::EngineEvent;

enum EngineCommand {
    Generate { run_id: RunId, prompt: String },
    Cancel { run_id: RunId },
}

/// Owns the network side of generation on a background thread.
///
/// At most one generation is in flight: starting a new one cancels the
/// previous request before the new one is spawned.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Mutex<mpsc::Receiver<EngineEvent>>,
}

impl EngineHandle {
    pub fn new(settings: GenerateSettings) -> Self {
        Self::with_generator(Arc::new(OllamaGenerator::new(settings)))
    }

    pub fn with_generator(generator: Arc<dyn Generator>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    orbit_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            let mut active: Option<(RunId, CancellationToken)> = None;
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Generate { run_id, prompt } => {
                        if let Some((previous, token)) = active.take() {
                            orbit_debug!("Run {} superseded by run {}", previous, run_id);
                            token.cancel();
                        }
                        let token = CancellationToken::new();
                        active = Some((run_id, token.clone()));
                        let generator = generator.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            run_generation(generator.as_ref(), run_id, prompt, token, event_tx)
                                .await;
                        });
                    }
                    EngineCommand::Cancel { run_id } => match &active {
                        Some((current, token)) if *current == run_id => {
                            orbit_info!("Cancelling run {}", run_id);
                            token.cancel();
                            active = None;
                        }
                        _ => orbit_debug!("Cancel for inactive run {} ignored", run_id),
                    },
                }
            }
            if let Some((_, token)) = active {
                token.cancel();
            }
        });

        Self {
            cmd_tx,
            event_rx: Mutex::new(event_rx),
        }
    }

    pub fn generate(&self, run_id: RunId, prompt: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Generate {
            run_id,
            prompt: prompt.into(),
        });
    }

    pub fn cancel(&self, run_id: RunId) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel { run_id });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }
}

async fn run_generation(
    generator: &dyn Generator,
    run_id: RunId,
    prompt: String,
    cancel: CancellationToken,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let sink = ChannelChunkSink::new(run_id, event_tx.clone());
    let result = generator.generate(&prompt, &sink, &cancel).await;
    match &result {
        Ok(()) => orbit_info!("Run {} finished", run_id),
        Err(err) => orbit_info!("Run {} ended: {}", run_id, err),
    }
    let _ = event_tx.send(EngineEvent::Finished { run_id, result });
}
