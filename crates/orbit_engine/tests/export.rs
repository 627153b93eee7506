use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use orbit_core::{ExportRequest, TaskKind};
use orbit_engine::{
    export_and_index, layout_document, DocumentExporter, ExportError, LineStyle, PageGeometry,
    PdfExporter, RecordStore,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn request(body: &str) -> ExportRequest {
    let task = TaskKind::TaskParalysis;
    ExportRequest {
        task_id: task.id().to_string(),
        symbol: task.symbol().to_string(),
        title: task.title().to_string(),
        inputs: vec![
            ("Task".to_string(), "write report".to_string()),
            ("Time staring".to_string(), "45 minutes".to_string()),
        ],
        body: body.to_string(),
        suggested_name: task.id().to_string(),
    }
}

fn at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 2, 10, 30, 0).unwrap()
}

struct FailingExporter;

impl DocumentExporter for FailingExporter {
    fn export(&self, _: &ExportRequest, _: DateTime<Utc>) -> Result<PathBuf, ExportError> {
        Err(ExportError::Render("boom".into()))
    }
}

#[test]
fn pdf_export_writes_complete_document() {
    let temp = TempDir::new().unwrap();
    let exporter = PdfExporter::new(temp.path().join("Orbit"));

    let path = exporter
        .export(&request("Step 1: open doc\n\nStep 2: write one sentence"), at())
        .unwrap();

    assert_eq!(
        path.file_name().unwrap().to_string_lossy(),
        "taskParalysis_20250802-103000.pdf"
    );
    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert!(bytes.len() > 200);
}

#[test]
fn empty_body_is_not_exported() {
    let temp = TempDir::new().unwrap();
    let exporter = PdfExporter::new(temp.path().to_path_buf());
    let err = exporter.export(&request("  \n"), at()).unwrap_err();
    assert!(matches!(err, ExportError::EmptyBody));
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn export_and_index_inserts_after_write() {
    let temp = TempDir::new().unwrap();
    let exporter = PdfExporter::new(temp.path().to_path_buf());
    let store = RecordStore::open_in_memory().unwrap();

    let saved = export_and_index(&exporter, &store, &request("Step 1"), at()).unwrap();

    assert!(saved.path.is_file());
    assert_eq!(saved.task_id, "taskParalysis");
    assert_eq!(saved.symbol, "💥");
    assert_eq!(saved.created_at, at());
    let stored = store.get(saved.id).unwrap().expect("indexed");
    assert_eq!(stored, saved);
}

#[test]
fn failed_export_leaves_index_untouched() {
    let store = RecordStore::open_in_memory().unwrap();
    let err = export_and_index(&FailingExporter, &store, &request("Step 1"), at()).unwrap_err();
    assert!(matches!(err, ExportError::Render(_)));
    assert!(store.fetch_all().unwrap().is_empty());
}

#[test]
fn layout_starts_with_title_and_inputs() {
    let pages = layout_document(&request("Body text"), &PageGeometry::default());
    assert_eq!(pages.len(), 1);
    let lines: Vec<_> = pages[0]
        .lines
        .iter()
        .filter(|l| !l.text.is_empty())
        .map(|l| (l.style, l.text.as_str()))
        .collect();
    assert_eq!(lines[0], (LineStyle::Title, "Task paralysis breaker"));
    assert_eq!(lines[1], (LineStyle::Heading, "Inputs"));
    assert_eq!(lines[2], (LineStyle::Label, "Task:"));
    assert_eq!(lines[3], (LineStyle::Body, "  write report"));
    assert_eq!(lines[6].0, LineStyle::Divider);
    assert_eq!(lines[7], (LineStyle::Body, "Body text"));
}

#[test]
fn markdown_body_is_laid_out_without_markers() {
    let body = "# Heading\n\n**Next move**\n\n1. open the doc\n2. type `one` line";
    let pages = layout_document(&request(body), &PageGeometry::default());
    let lines: Vec<_> = pages[0]
        .lines
        .iter()
        .skip_while(|l| l.style != LineStyle::Divider)
        .skip(1)
        .filter(|l| !l.text.is_empty())
        .map(|l| (l.style, l.text.as_str()))
        .collect();
    assert_eq!(
        lines,
        vec![
            (LineStyle::Heading, "Heading"),
            (LineStyle::Strong, "Next move"),
            (LineStyle::Body, "1. open the doc"),
            (LineStyle::Body, "2. type one line"),
        ]
    );
}

#[test]
fn long_bodies_paginate_within_margins() {
    let geometry = PageGeometry::default();
    let body: String = (1..=120).map(|n| format!("Line {n}\n")).collect();
    let pages = layout_document(&request(&body), &geometry);

    assert!(pages.len() >= 3, "expected several pages, got {}", pages.len());
    for page in &pages {
        assert!(!page.lines.is_empty());
        for line in &page.lines {
            assert!(line.baseline_pt > geometry.margin_pt);
            assert!(line.baseline_pt <= geometry.height_pt - geometry.margin_pt);
        }
    }
    let last = pages.last().unwrap().lines.iter().rev().find(|l| !l.text.is_empty());
    assert_eq!(last.map(|l| l.text.as_str()), Some("Line 120"));
}

fn pdf_count(dir: &std::path::Path) -> usize {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "pdf"))
        .count()
}

#[test]
fn saves_in_the_same_second_keep_separate_documents() {
    let temp = TempDir::new().unwrap();
    let exporter = PdfExporter::new(temp.path().to_path_buf());
    let store = RecordStore::open_in_memory().unwrap();
    let later = at() + chrono::Duration::milliseconds(400);

    let first = export_and_index(&exporter, &store, &request("first answer"), at()).unwrap();
    let second = export_and_index(&exporter, &store, &request("second answer"), later).unwrap();

    assert_ne!(first.path, second.path);
    assert_eq!(
        second.path.file_name().unwrap().to_string_lossy(),
        "taskParalysis_20250802-103000-2.pdf"
    );
    assert_eq!(pdf_count(temp.path()), 2);
    assert_eq!(store.fetch_all().unwrap().len(), 2);
    assert!(first.path.is_file());
    assert!(second.path.is_file());
}

#[test]
fn failed_index_insert_removes_the_fresh_document() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("docs");
    let db_path = temp.path().join("orbit.sqlite3");
    let exporter = PdfExporter::new(output.clone());
    let store = RecordStore::open(&db_path).unwrap();

    let other = rusqlite::Connection::open(&db_path).unwrap();
    other.execute("DROP TABLE saved_docs", []).unwrap();
    drop(other);

    let err = export_and_index(&exporter, &store, &request("Step 1"), at()).unwrap_err();

    assert!(matches!(err, ExportError::Store(_)), "unexpected error: {err}");
    assert_eq!(pdf_count(&output), 0);
}
