use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use orbit_core::{update, AppState, FieldValues, Msg, RunPhase, TaskKind};
use orbit_engine::RecordStore;
use orbit_logging::{orbit_debug, orbit_info};

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::ui;
use super::ui::input::ShellCommand;
use super::ui::render::Renderer;

/// Everything the main loop reacts to, in arrival order.
pub enum AppEvent {
    Msg(Msg),
    Input(Result<ShellCommand, String>),
    InputClosed,
}

struct App {
    state: AppState,
    runner: EffectRunner,
    renderer: Renderer,
}

impl App {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
            renderer: Renderer::new(),
        }
    }

    fn dispatch_msg(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let maybe_view = state.consume_dirty().then(|| state.view());
        self.state = state;

        self.runner.enqueue(effects);
        if let Some(view) = maybe_view {
            let text = self.renderer.render(&view);
            emit(&text);
        }
    }

    /// Returns false when the shell should exit.
    fn handle_command(&mut self, command: ShellCommand) -> bool {
        match command {
            ShellCommand::Help => emit(ui::input::HELP),
            ShellCommand::Tasks => emit(&ui::render::task_list(self.state.selected())),
            ShellCommand::Show => {
                let view = self.state.view();
                emit(&ui::render::form(&view));
                emit(&ui::render::prompt_preview(&view));
            }
            ShellCommand::Quit => return false,
            ShellCommand::Msg(Msg::FieldChanged { key, .. })
                if self.state.selected().field(&key).is_none() =>
            {
                let task = self.state.selected();
                let keys: Vec<&str> = task.fields().iter().map(|field| field.key).collect();
                emit(&format!(
                    "{} has no field '{key}' (fields: {})\n",
                    task.id(),
                    keys.join(", ")
                ));
            }
            ShellCommand::Msg(msg) => self.dispatch_msg(msg),
        }
        true
    }

    fn is_busy(&self) -> bool {
        self.state.run().is_running()
    }

    /// Applies engine and effect results that are already queued.
    fn drain(&mut self, rx: &mpsc::Receiver<AppEvent>) {
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::Msg(msg) = event {
                self.dispatch_msg(msg);
            }
        }
    }

    fn finish(mut self) -> anyhow::Result<()> {
        if self.is_busy() {
            self.dispatch_msg(Msg::StopClicked);
        }
        self.runner.shutdown()
    }
}

pub fn run_shell(config: &AppConfig, store: RecordStore) -> anyhow::Result<()> {
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let runner = EffectRunner::new(config, store, event_tx.clone());
    let mut app = App::new(runner);

    emit(&format!(
        "orbit: model {} at {}\n{}\n",
        config.model,
        config.base_url,
        ui::input::HELP
    ));
    emit(&ui::render::task_list(app.state.selected()));
    app.dispatch_msg(Msg::TaskSelected(app.state.selected()));
    app.dispatch_msg(Msg::RecordsRequested);
    spawn_input_reader(event_tx);

    let mut input_closed = false;
    while let Ok(event) = event_rx.recv() {
        match event {
            AppEvent::Msg(msg) => app.dispatch_msg(msg),
            AppEvent::Input(Ok(command)) => {
                if !app.handle_command(command) {
                    break;
                }
            }
            AppEvent::Input(Err(message)) => emit(&format!("{message}\n")),
            AppEvent::InputClosed => {
                orbit_debug!("Input closed");
                input_closed = true;
            }
        }
        // Piped input may end before the answer does.
        if input_closed && !app.is_busy() {
            break;
        }
    }

    app.drain(&event_rx);
    orbit_info!("Shell exiting");
    app.finish()
}

/// Runs one task to completion, optionally exporting the answer.
pub fn run_once(
    config: &AppConfig,
    store: RecordStore,
    task: TaskKind,
    values: FieldValues,
    save: bool,
) -> anyhow::Result<()> {
    if let Some(key) = values.keys().find(|key| task.field(key).is_none()) {
        anyhow::bail!("{} has no field '{key}'", task.id());
    }

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let runner = EffectRunner::new(config, store, event_tx);
    let mut app = App::new(runner);

    app.dispatch_msg(Msg::TaskSelected(task));
    for (key, value) in values {
        app.dispatch_msg(Msg::FieldChanged { key, value });
    }
    app.dispatch_msg(Msg::RunClicked);

    while app.is_busy() {
        match event_rx.recv() {
            Ok(AppEvent::Msg(msg)) => app.dispatch_msg(msg),
            Ok(_) => {}
            Err(_) => break,
        }
    }

    let phase = app.state.run().phase();
    let error = app.state.run().error().map(str::to_string);
    if save && phase == RunPhase::Completed {
        app.dispatch_msg(Msg::SaveClicked);
        // Export runs inline, so its result is already queued.
        app.drain(&event_rx);
    }
    app.finish()?;

    match phase {
        RunPhase::Completed => Ok(()),
        RunPhase::Failed => anyhow::bail!(
            "generation failed: {}",
            error.as_deref().unwrap_or("unknown error")
        ),
        other => anyhow::bail!("run ended {other}"),
    }
}

fn spawn_input_reader(event_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            let event = match ui::input::parse_line(&line) {
                Ok(Some(command)) => AppEvent::Input(Ok(command)),
                Ok(None) => continue,
                Err(message) => AppEvent::Input(Err(message)),
            };
            if event_tx.send(event).is_err() {
                return;
            }
        }
        let _ = event_tx.send(AppEvent::InputClosed);
    });
}

fn emit(text: &str) {
    if text.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = stdout.write_all(text.as_bytes());
    let _ = stdout.flush();
}
