use chrono::Local;
use orbit_core::{AppViewModel, RecordRowView, RunId, RunPhase, SavedRecord, TaskKind};
use orbit_engine::CleanupSummary;

/// Turns successive view models into terminal output.
///
/// The response is printed incrementally: only the text added since the
/// previous render is written, so a streaming run reads like a live feed.
#[derive(Debug, Default)]
pub struct Renderer {
    selected: Option<TaskKind>,
    run_id: RunId,
    printed: usize,
    phase: RunPhase,
    status: Option<String>,
    records: Option<Vec<RecordRowView>>,
    records_loads: u64,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, view: &AppViewModel) -> String {
        let mut out = String::new();

        if self.selected != Some(view.selected) {
            self.selected = Some(view.selected);
            out.push_str(&form(view));
        }

        if view.run_id != self.run_id {
            self.run_id = view.run_id;
            self.printed = 0;
            self.phase = RunPhase::Idle;
            out.push_str(&format!("--- run {} ---\n", view.run_id));
        }

        if view.response.len() < self.printed {
            self.printed = 0;
        }
        if let Some(delta) = view.response.get(self.printed..) {
            out.push_str(delta);
            self.printed = view.response.len();
        }

        if view.run_phase != self.phase {
            self.phase = view.run_phase;
            if view.run_phase.is_terminal() {
                if !view.response.is_empty() && !view.response.ends_with('\n') {
                    out.push('\n');
                }
                match (&view.run_phase, &view.error) {
                    (RunPhase::Failed, Some(error)) => {
                        out.push_str(&format!("[failed: {error}]\n"))
                    }
                    (phase, _) => out.push_str(&format!("[{phase}]\n")),
                }
            }
        }

        if view.status != self.status {
            self.status = view.status.clone();
            if let Some(status) = &view.status {
                out.push_str(&format!("» {status}\n"));
            }
        }

        let reloaded = view.records_loads != self.records_loads;
        if reloaded || self.records.as_ref() != Some(&view.records) {
            // The first empty list is the initial state, not a loaded one.
            let initial = !reloaded && self.records.is_none() && view.records.is_empty();
            self.records = Some(view.records.clone());
            self.records_loads = view.records_loads;
            if !initial {
                out.push_str(&record_rows(&view.records));
            }
        }

        out
    }
}

/// The selected task with its fields and current values.
pub fn form(view: &AppViewModel) -> String {
    let mut out = format!("{} ({})\n", view.selected.label(), view.selected.id());
    for field in &view.fields {
        let value = if field.value.is_empty() {
            format!("<{}>", field.placeholder)
        } else {
            field.value.replace('\n', "\n      ")
        };
        out.push_str(&format!("  {:<14} {}: {}\n", field.key, field.label, value));
    }
    out
}

pub fn prompt_preview(view: &AppViewModel) -> String {
    format!("--- prompt ---\n{}\n--------------\n", view.prompt_preview.trim_end())
}

/// Every task in catalog order, with the selected one marked.
pub fn task_list(selected: TaskKind) -> String {
    let mut out = String::new();
    for (index, task) in TaskKind::ALL.into_iter().enumerate() {
        let marker = if task == selected { '*' } else { ' ' };
        out.push_str(&format!(
            "{marker}{:>2}. {} ({})\n",
            index + 1,
            task.label(),
            task.id()
        ));
        let keys: Vec<&str> = task.fields().iter().map(|field| field.key).collect();
        out.push_str(&format!("      fields: {}\n", keys.join(", ")));
    }
    out
}

pub fn records_table(records: &[SavedRecord]) -> String {
    let rows: Vec<RecordRowView> = records
        .iter()
        .map(|record| RecordRowView {
            id: record.id,
            created_at: record.created_at,
            symbol: record.symbol.clone(),
            title: record.title.clone(),
            path: record.path.clone(),
        })
        .collect();
    record_rows(&rows)
}

fn record_rows(rows: &[RecordRowView]) -> String {
    if rows.is_empty() {
        return "No saved records.\n".to_string();
    }
    let mut out = format!("Saved records ({}):\n", rows.len());
    for row in rows {
        out.push_str(&format!(
            "  [{}] {} {} {} -> {}\n",
            row.id,
            row.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            row.symbol,
            row.title,
            row.path.display()
        ));
    }
    out
}

pub fn cleanup_summary(summary: &CleanupSummary, dry_run: bool) -> String {
    let verb = if dry_run { "would remove" } else { "removed" };
    let mut out = format!(
        "Indexed records: {}\nReferenced documents {verb}: {}\nReferenced documents missing: {}\nDocuments scanned: {}\nOrphans {verb}: {}\n",
        summary.indexed,
        summary.removed_referenced,
        summary.missing_referenced,
        summary.scanned,
        summary.removed_orphans,
    );
    if !dry_run {
        out.push_str(&format!("Index rows cleared: {}\n", summary.index_cleared));
    }
    if summary.failures > 0 {
        out.push_str(&format!("Failures: {} (see log)\n", summary.failures));
    }
    out
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::{TimeZone, Utc};
    use orbit_core::{AppViewModel, RecordRowView, RunPhase, TaskKind};
    use pretty_assertions::assert_eq;

    use super::{task_list, Renderer};

    fn view(run_id: u64, phase: RunPhase, response: &str) -> AppViewModel {
        AppViewModel {
            selected: TaskKind::TaskParalysis,
            run_id,
            run_phase: phase,
            response: response.to_string(),
            ..AppViewModel::default()
        }
    }

    #[test]
    fn streams_only_new_text() {
        let mut renderer = Renderer::new();
        renderer.render(&view(0, RunPhase::Idle, ""));

        assert_eq!(
            renderer.render(&view(1, RunPhase::Running, "Step 1")),
            "--- run 1 ---\nStep 1"
        );
        assert_eq!(
            renderer.render(&view(1, RunPhase::Completed, "Step 1: open doc")),
            ": open doc\n[completed]\n"
        );
        assert_eq!(renderer.render(&view(1, RunPhase::Completed, "Step 1: open doc")), "");
    }

    #[test]
    fn new_run_starts_from_the_top() {
        let mut renderer = Renderer::new();
        renderer.render(&view(0, RunPhase::Idle, ""));
        renderer.render(&view(1, RunPhase::Running, "first answer"));

        assert_eq!(
            renderer.render(&view(2, RunPhase::Running, "sec")),
            "--- run 2 ---\nsec"
        );
    }

    #[test]
    fn failure_shows_error() {
        let mut renderer = Renderer::new();
        renderer.render(&view(0, RunPhase::Idle, ""));
        renderer.render(&view(1, RunPhase::Running, ""));
        let mut failed = view(1, RunPhase::Failed, "");
        failed.error = Some("http status 404: not found".to_string());

        assert_eq!(renderer.render(&failed), "[failed: http status 404: not found]\n");
    }

    #[test]
    fn status_and_records_print_once() {
        let mut renderer = Renderer::new();
        renderer.render(&view(0, RunPhase::Idle, ""));
        let mut saved = view(0, RunPhase::Idle, "");
        saved.status = Some("Saved /tmp/a.pdf".to_string());
        saved.records = vec![RecordRowView {
            id: 3,
            created_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
            symbol: "S".to_string(),
            title: "Title".to_string(),
            path: PathBuf::from("/tmp/a.pdf"),
        }];

        let out = renderer.render(&saved);
        assert!(out.starts_with("» Saved /tmp/a.pdf\nSaved records (1):\n  [3] "));
        assert!(out.ends_with(" S Title -> /tmp/a.pdf\n"));
        assert_eq!(renderer.render(&saved), "");
    }

    #[test]
    fn every_requested_load_is_listed() {
        let mut renderer = Renderer::new();
        renderer.render(&view(0, RunPhase::Idle, ""));
        let mut loaded = view(0, RunPhase::Idle, "");
        loaded.records = vec![RecordRowView {
            id: 1,
            created_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
            symbol: "S".to_string(),
            title: "Title".to_string(),
            path: PathBuf::from("/tmp/a.pdf"),
        }];
        loaded.records_loads = 1;

        let first = renderer.render(&loaded);
        assert!(first.starts_with("Saved records (1):\n  [1] "));

        loaded.records_loads = 2;
        assert_eq!(renderer.render(&loaded), first);
        assert_eq!(renderer.render(&loaded), "");
    }

    #[test]
    fn empty_load_is_reported() {
        let mut renderer = Renderer::new();
        let mut loaded = view(0, RunPhase::Idle, "");
        loaded.records_loads = 1;
        assert!(renderer.render(&loaded).ends_with("No saved records.\n"));
    }

    #[test]
    fn task_list_marks_selection() {
        let list = task_list(TaskKind::TaskParalysis);
        assert!(list.contains("* 2. "));
        assert!(list.contains("(taskParalysis)"));
        assert!(list.contains("fields: task, time"));
    }
}
