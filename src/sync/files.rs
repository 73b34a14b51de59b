//! Whole-file reads and staged writes for the data files.
//!
//! Writes go to a temporary file in the target directory first, so a
//! rename can replace the real file in one step.

use miette::Diagnostic;
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors that can occur while touching data files.
#[derive(Error, Diagnostic, Debug)]
pub enum FileError {
    #[error("IO error on {}: {source}", .path.display())]
    #[diagnostic(code(cams::sync::files::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FileError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        FileError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Read a data file. A missing file is `Ok(None)`, not an error.
pub fn read_file(path: &Path) -> Result<Option<String>, FileError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(FileError::io(path, e)),
    }
}

/// Create the directory (and parents) if it does not exist.
pub fn ensure_dir(dir: &Path) -> Result<(), FileError> {
    fs::create_dir_all(dir).map_err(|e| FileError::io(dir, e))
}

/// Content written to a temporary file, waiting to replace its target.
///
/// Dropping a staged file without persisting it removes the temporary file.
#[derive(Debug)]
pub struct StagedFile {
    target: PathBuf,
    temp: NamedTempFile,
}

impl StagedFile {
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Atomically move the staged content over the target file.
    pub fn persist(self) -> Result<(), FileError> {
        let target = self.target;
        self.temp
            .persist(&target)
            .map_err(|e| FileError::io(&target, e.error))?;
        Ok(())
    }
}

/// Write `content` to a temporary file next to `dir/name`.
pub fn stage(dir: &Path, name: &str, content: &str) -> Result<StagedFile, FileError> {
    let target = dir.join(name);
    let temp = NamedTempFile::new_in(dir).map_err(|e| FileError::io(dir, e))?;

    let mut writer = BufWriter::new(temp.as_file());
    writer
        .write_all(content.as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| FileError::io(temp.path(), e))?;
    drop(writer);

    temp.as_file()
        .sync_all()
        .map_err(|e| FileError::io(temp.path(), e))?;

    Ok(StagedFile { target, temp })
}
