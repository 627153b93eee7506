use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use orbit_logging::orbit_debug;
use tempfile::{Builder, NamedTempFile};
use thiserror::Error;

/// In-progress writes carry this suffix, so a crash never leaves something
/// that looks like a finished document.
const PARTIAL_SUFFIX: &str = ".part";
const MAX_NAME_ATTEMPTS: u32 = 999;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("export folder {path:?} is unusable: {reason}")]
    OutputDir { path: PathBuf, reason: String },
    #[error("no free file name left for {0}")]
    NamesExhausted(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl PersistError {
    fn output_dir(path: &Path, reason: impl ToString) -> Self {
        PersistError::OutputDir {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// Creates the export folder if needed and checks that it accepts new files.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if !meta.is_dir() => {
            return Err(PersistError::output_dir(dir, "not a directory"));
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|err| PersistError::output_dir(dir, err))?;
            orbit_debug!("Created export folder {:?}", dir);
        }
        Err(err) => return Err(PersistError::output_dir(dir, err)),
    }
    partial_file(dir).map_err(|err| PersistError::output_dir(dir, err))?;
    Ok(())
}

fn partial_file(dir: &Path) -> io::Result<NamedTempFile> {
    Builder::new()
        .prefix(".orbit-")
        .suffix(PARTIAL_SUFFIX)
        .tempfile_in(dir)
}

/// Writes documents into one folder via temp file + rename.
///
/// Readers never observe a partially written document: a name either does
/// not exist yet or holds the complete bytes.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `content` under `filename`, or under `{stem}-2.{ext}`,
    /// `{stem}-3.{ext}`, ... if that name is taken. Existing documents are
    /// never replaced. Returns the path actually used.
    pub fn write_new(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let mut partial = partial_file(&self.dir)?;
        partial.write_all(content)?;
        partial.as_file_mut().sync_all()?;

        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let target = self.dir.join(numbered_name(filename, attempt));
            match partial.persist_noclobber(&target) {
                Ok(_) => {
                    orbit_debug!("Wrote {} bytes to {:?}", content.len(), target);
                    return Ok(target);
                }
                Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                    partial = err.file;
                }
                Err(err) => return Err(PersistError::Io(err.error)),
            }
        }
        Err(PersistError::NamesExhausted(filename.to_string()))
    }
}

fn numbered_name(filename: &str, attempt: u32) -> String {
    if attempt == 1 {
        return filename.to_string();
    }
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}-{attempt}.{ext}"),
        _ => format!("{filename}-{attempt}"),
    }
}

/// Removes a previously exported document. Returns `false` if it was already
/// gone.
pub fn remove_document(path: &Path) -> Result<bool, PersistError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(PersistError::Io(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::numbered_name;

    #[test]
    fn numbering_goes_before_the_extension() {
        assert_eq!(numbered_name("doc.pdf", 1), "doc.pdf");
        assert_eq!(numbered_name("doc.pdf", 3), "doc-3.pdf");
        assert_eq!(numbered_name("README", 2), "README-2");
    }
}
