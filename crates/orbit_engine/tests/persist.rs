use std::fs;

use orbit_engine::{ensure_output_dir, remove_document, AtomicFileWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("Orbit");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn taken_names_get_a_numbered_suffix() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write_new("doc.pdf", b"%PDF-first").unwrap();
    let second = writer.write_new("doc.pdf", b"%PDF-second").unwrap();
    let third = writer.write_new("doc.pdf", b"%PDF-third").unwrap();

    assert_eq!(first.file_name().unwrap(), "doc.pdf");
    assert_eq!(second.file_name().unwrap(), "doc-2.pdf");
    assert_eq!(third.file_name().unwrap(), "doc-3.pdf");
    assert_eq!(fs::read(&first).unwrap(), b"%PDF-first");
    assert_eq!(fs::read(&second).unwrap(), b"%PDF-second");

    let leftovers: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
    assert_eq!(leftovers.len(), 3, "temp files must not linger");
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write_new("doc.pdf", b"data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("doc.pdf").exists());
}

#[test]
fn remove_document_reports_missing_files() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("gone.pdf");
    fs::write(&path, b"x").unwrap();

    assert!(remove_document(&path).unwrap());
    assert!(!remove_document(&path).unwrap());
}
