//! Maintenance sweep over exported documents and their index.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use orbit_logging::{orbit_info, orbit_warn};

use crate::filename::DOCUMENT_EXTENSION;
use crate::persist::remove_document;
use crate::store::{RecordStore, StoreError};

#[derive(Debug, Clone, Default)]
pub struct CleanupOptions {
    /// Report what would happen without touching files or the index.
    pub dry_run: bool,
    /// Leave the index rows in place.
    pub keep_index: bool,
    /// Folders to scan for orphan documents, in addition to the folders of
    /// indexed documents.
    pub scan_dirs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    pub indexed: usize,
    pub removed_referenced: usize,
    pub missing_referenced: usize,
    pub scanned: usize,
    pub removed_orphans: usize,
    pub index_cleared: usize,
    pub failures: usize,
}

/// Removes every indexed document, sweeps orphan documents from the export
/// folders, and clears the index unless asked to keep it.
pub fn cleanup(store: &RecordStore, options: &CleanupOptions) -> Result<CleanupSummary, StoreError> {
    let records = store.fetch_all()?;
    let mut summary = CleanupSummary {
        indexed: records.len(),
        ..CleanupSummary::default()
    };

    let mut referenced = HashSet::new();
    let mut scan_dirs: Vec<PathBuf> = options
        .scan_dirs
        .iter()
        .filter(|dir| dir.is_dir())
        .cloned()
        .collect();

    for record in &records {
        if let Some(parent) = record.path.parent().filter(|dir| dir.is_dir()) {
            if !scan_dirs.iter().any(|dir| dir == parent) {
                scan_dirs.push(parent.to_path_buf());
            }
        }
        if !record.path.exists() {
            orbit_warn!("Missing on disk (record {}): {:?}", record.id, record.path);
            summary.missing_referenced += 1;
            continue;
        }
        referenced.insert(canonical(&record.path));
        if discard(&record.path, options.dry_run) {
            summary.removed_referenced += 1;
        } else {
            summary.failures += 1;
        }
    }

    // The same folder may be reachable under several spellings.
    let mut seen_dirs = HashSet::new();
    scan_dirs.retain(|dir| seen_dirs.insert(canonical(dir)));
    for dir in &scan_dirs {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                orbit_warn!("Cannot scan {:?}: {}", dir, err);
                continue;
            }
        };
        for entry in entries.filter_map(Result::ok) {
            let path = entry.path();
            if !is_document(&path) {
                continue;
            }
            summary.scanned += 1;
            if referenced.contains(&canonical(&path)) {
                continue;
            }
            if discard(&path, options.dry_run) {
                summary.removed_orphans += 1;
            } else {
                summary.failures += 1;
            }
        }
    }

    if !options.keep_index {
        if options.dry_run {
            orbit_info!("[dry-run] Would clear {} index rows", records.len());
        } else {
            summary.index_cleared = store.clear()?;
        }
    }

    orbit_info!("Cleanup finished: {:?}", summary);
    Ok(summary)
}

fn is_document(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION))
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn discard(path: &Path, dry_run: bool) -> bool {
    if dry_run {
        orbit_info!("[dry-run] Would remove {:?}", path);
        return true;
    }
    match remove_document(path) {
        Ok(_) => {
            orbit_info!("Removed {:?}", path);
            true
        }
        Err(err) => {
            orbit_warn!("Failed to remove {:?}: {}", path, err);
            false
        }
    }
}
