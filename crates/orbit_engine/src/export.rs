use std::path::PathBuf;

use chrono::{DateTime, Utc};
use orbit_core::{ExportRequest, SavedRecord};
use orbit_logging::{orbit_error, orbit_info, orbit_warn};

use crate::filename::document_filename;
use crate::layout::{layout_document, PageGeometry};
use crate::pdf::render_pdf;
use crate::persist::{remove_document, AtomicFileWriter, PersistError};
use crate::store::{NewRecord, RecordStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("nothing to export: response is empty")]
    EmptyBody,
    #[error("pdf rendering failed: {0}")]
    Render(String),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("index error: {0}")]
    Store(#[from] StoreError),
}

/// Writes a finished run to a document and returns where it landed.
pub trait DocumentExporter {
    fn export(
        &self,
        request: &ExportRequest,
        created_at: DateTime<Utc>,
    ) -> Result<PathBuf, ExportError>;
}

pub struct PdfExporter {
    writer: AtomicFileWriter,
    geometry: PageGeometry,
}

impl PdfExporter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(output_dir),
            geometry: PageGeometry::default(),
        }
    }

    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }
}

impl DocumentExporter for PdfExporter {
    fn export(
        &self,
        request: &ExportRequest,
        created_at: DateTime<Utc>,
    ) -> Result<PathBuf, ExportError> {
        if request.body.trim().is_empty() {
            return Err(ExportError::EmptyBody);
        }
        let pages = layout_document(request, &self.geometry);
        let bytes = render_pdf(&request.title, &pages, &self.geometry).map_err(ExportError::Render)?;
        let filename = document_filename(&request.suggested_name, created_at);
        let path = self.writer.write_new(&filename, &bytes)?;
        orbit_info!(
            "Exported {} page(s), {} bytes to {:?}",
            pages.len(),
            bytes.len(),
            path
        );
        Ok(path)
    }
}

/// Writes the document, then indexes it.
///
/// The index row is only inserted after the document is fully on disk. If
/// indexing fails the fresh document is removed so no orphan is left behind.
pub fn export_and_index(
    exporter: &dyn DocumentExporter,
    store: &RecordStore,
    request: &ExportRequest,
    created_at: DateTime<Utc>,
) -> Result<SavedRecord, ExportError> {
    let path = exporter.export(request, created_at)?;
    let record = NewRecord {
        created_at,
        task_id: request.task_id.clone(),
        symbol: request.symbol.clone(),
        title: request.title.clone(),
        path,
    };

    match store.insert(&record) {
        Ok(id) => Ok(SavedRecord {
            id,
            created_at: record.created_at,
            task_id: record.task_id,
            symbol: record.symbol,
            title: record.title,
            path: record.path,
        }),
        Err(err) => {
            orbit_error!("Indexing {:?} failed: {}", record.path, err);
            if let Err(remove_err) = remove_document(&record.path) {
                orbit_warn!("Could not remove unindexed {:?}: {}", record.path, remove_err);
            }
            Err(err.into())
        }
    }
}
