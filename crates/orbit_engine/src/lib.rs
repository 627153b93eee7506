//! Orbit engine: generation transport, document export and the record index.
mod cleanup;
mod engine;
mod export;
mod filename;
mod generate;
mod layout;
mod markdown;
mod pdf;
mod persist;
mod store;
mod types;

pub use cleanup::{cleanup, CleanupOptions, CleanupSummary};
pub use engine::EngineHandle;
pub use export::{export_and_index, DocumentExporter, ExportError, PdfExporter};
pub use filename::{document_filename, sanitize_stem, DOCUMENT_EXTENSION};
pub use generate::{
    ChannelChunkSink, ChunkSink, GenerateSettings, Generator, OllamaGenerator, GENERATE_PATH,
};
pub use layout::{layout_document, wrap_text, LineStyle, Page, PageGeometry, PlacedLine};
pub use markdown::{markdown_blocks, TextBlock};
pub use pdf::{render_pdf, to_font_text};
pub use persist::{ensure_output_dir, remove_document, AtomicFileWriter, PersistError};
pub use store::{NewRecord, RecordStore, StoreError};
pub use types::{EngineEvent, FailureKind, GenerateError};
