use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Utc;
use orbit_core::{Effect, Msg, TransportError};
use orbit_engine::{export_and_index, EngineEvent, EngineHandle, PdfExporter, RecordStore};
use orbit_logging::{orbit_error, orbit_info, orbit_warn};

use super::app::AppEvent;
use super::config::AppConfig;
use super::discard_document;

const EVENT_POLL: Duration = Duration::from_millis(50);

/// Carries out the effects `update` asks for and feeds results back as
/// messages.
///
/// Generation runs on the engine thread; export, indexing and record
/// deletion run inline on the caller's thread since they are short.
pub struct EffectRunner {
    engine: Arc<EngineHandle>,
    store: RecordStore,
    exporter: PdfExporter,
    msg_tx: mpsc::Sender<AppEvent>,
    shutdown: Arc<AtomicBool>,
    event_loop: Option<JoinHandle<()>>,
}

impl EffectRunner {
    pub fn new(config: &AppConfig, store: RecordStore, msg_tx: mpsc::Sender<AppEvent>) -> Self {
        let engine = Arc::new(EngineHandle::new(config.generate_settings()));
        let exporter = PdfExporter::new(config.output_dir());
        let shutdown = Arc::new(AtomicBool::new(false));
        let event_loop = spawn_event_loop(engine.clone(), msg_tx.clone(), shutdown.clone());
        Self {
            engine,
            store,
            exporter,
            msg_tx,
            shutdown,
            event_loop: Some(event_loop),
        }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartGeneration { run_id, prompt } => {
                    orbit_info!("StartGeneration run_id={} prompt_len={}", run_id, prompt.len());
                    self.engine.generate(run_id, prompt);
                }
                Effect::CancelGeneration { run_id } => {
                    self.engine.cancel(run_id);
                }
                Effect::ExportDocument(request) => {
                    let result = export_and_index(&self.exporter, &self.store, &request, Utc::now())
                        .map_err(|err| {
                            orbit_error!("Export of {} failed: {}", request.task_id, err);
                            err.to_string()
                        });
                    self.send(Msg::ExportFinished(result));
                }
                Effect::LoadRecords => match self.store.fetch_all() {
                    Ok(records) => self.send(Msg::RecordsLoaded(records)),
                    Err(err) => orbit_error!("Loading records failed: {}", err),
                },
                Effect::DeleteRecord { id } => {
                    let result = match self.store.delete(id) {
                        Ok(Some(record)) => {
                            discard_document(&record.path);
                            Ok(id)
                        }
                        Ok(None) => Err(format!("no saved record with id {id}")),
                        Err(err) => {
                            orbit_error!("Deleting record {} failed: {}", id, err);
                            Err(err.to_string())
                        }
                    };
                    self.send(Msg::RecordDeleted(result));
                }
            }
        }
    }

    /// Stops the event loop and closes the record index.
    pub fn shutdown(mut self) -> anyhow::Result<()> {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.event_loop.take() {
            let _ = handle.join();
        }
        self.store.close()?;
        orbit_info!("Record index closed");
        Ok(())
    }

    fn send(&self, msg: Msg) {
        let _ = self.msg_tx.send(AppEvent::Msg(msg));
    }
}

fn spawn_event_loop(
    engine: Arc<EngineHandle>,
    msg_tx: mpsc::Sender<AppEvent>,
    shutdown: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while !shutdown.load(Ordering::Relaxed) {
            let Some(event) = engine.recv_timeout(EVENT_POLL) else {
                continue;
            };
            if msg_tx.send(AppEvent::Msg(map_event(event))).is_err() {
                break;
            }
        }
    })
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Chunk { run_id, bytes } => Msg::StreamChunk {
            run_id,
            bytes: bytes.to_vec(),
        },
        EngineEvent::Finished {
            run_id,
            result: Ok(()),
        } => Msg::StreamEnded { run_id },
        EngineEvent::Finished {
            run_id,
            result: Err(err),
        } => {
            let error = err.to_transport_error();
            if error != TransportError::Cancelled {
                orbit_warn!("Run {} failed: {}", run_id, err);
            }
            Msg::StreamFailed { run_id, error }
        }
    }
}
