//! Transfer manager - high-level load/save operations on a data directory.

use crate::codec::{
    CampSchema, CommitteeSchema, EnquirySchema, Schema, StaffSchema, StudentSchema,
    SuggestionSchema, decode_records, header,
};
use crate::db::Repositories;
use miette::Diagnostic;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use super::{
    export::{ExportError, ExportSummary, export_all},
    files::{FileError, ensure_dir, read_file, stage},
    import::{ImportError, ImportReport, import_all},
    paths::get_data_dir,
};

/// Errors that can occur during transfer operations.
#[derive(Error, Diagnostic, Debug)]
pub enum TransferError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Io(#[from] FileError),
}

/// Transfer manager handles loading and saving one data directory.
#[derive(Debug, Clone)]
pub struct TransferManager {
    data_dir: PathBuf,
}

impl Default for TransferManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferManager {
    /// Create a manager for the default data directory.
    pub fn new() -> Self {
        Self {
            data_dir: get_data_dir(None),
        }
    }

    /// Create a manager for a specific data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn is_initialized(&self) -> bool {
        self.data_dir.is_dir()
    }

    /// Create the data directory and a header-only file for each missing
    /// data file. Existing files are left alone. Returns the files created.
    pub fn init(&self) -> Result<Vec<String>, TransferError> {
        ensure_dir(&self.data_dir)?;

        let mut created = Vec::new();
        for (name, head) in headers() {
            if self.data_dir.join(name).exists() {
                continue;
            }
            stage(&self.data_dir, name, &format!("{}\n", head))?.persist()?;
            created.push(name.to_string());
        }

        info!(dir = %self.data_dir.display(), created = created.len(), "Initialized data directory");
        Ok(created)
    }

    /// Import every data file.
    pub fn load(&self) -> Result<ImportReport, TransferError> {
        Ok(import_all(&self.data_dir)?)
    }

    /// Export every store, replacing the data files.
    pub fn save(&self, repos: &mut Repositories) -> Result<ExportSummary, TransferError> {
        Ok(export_all(repos, &self.data_dir)?)
    }

    /// Per-file record counts, without building stores.
    pub fn status(&self) -> Result<TransferStatus, TransferError> {
        if !self.is_initialized() {
            return Ok(TransferStatus {
                data_dir: self.data_dir.clone(),
                initialized: false,
                files: Vec::new(),
            });
        }

        let files = vec![
            self.file_status::<StaffSchema>()?,
            self.file_status::<StudentSchema>()?,
            self.file_status::<CommitteeSchema>()?,
            self.file_status::<CampSchema>()?,
            self.file_status::<EnquirySchema>()?,
            self.file_status::<SuggestionSchema>()?,
        ];

        Ok(TransferStatus {
            data_dir: self.data_dir.clone(),
            initialized: true,
            files,
        })
    }

    fn file_status<S: Schema>(&self) -> Result<FileStatus, TransferError> {
        let status = match read_file(&self.data_dir.join(S::FILE_NAME))? {
            Some(content) => {
                let decoded = decode_records::<S>(&content);
                FileStatus {
                    file: S::FILE_NAME.to_string(),
                    present: true,
                    records: decoded.records.len(),
                    format_errors: decoded.errors.len(),
                }
            }
            None => FileStatus {
                file: S::FILE_NAME.to_string(),
                present: false,
                records: 0,
                format_errors: 0,
            },
        };
        Ok(status)
    }
}

fn headers() -> [(&'static str, String); 6] {
    [
        (StaffSchema::FILE_NAME, header::<StaffSchema>()),
        (StudentSchema::FILE_NAME, header::<StudentSchema>()),
        (CommitteeSchema::FILE_NAME, header::<CommitteeSchema>()),
        (CampSchema::FILE_NAME, header::<CampSchema>()),
        (EnquirySchema::FILE_NAME, header::<EnquirySchema>()),
        (SuggestionSchema::FILE_NAME, header::<SuggestionSchema>()),
    ]
}

/// Status of the data directory.
#[derive(Debug, Clone, Serialize)]
pub struct TransferStatus {
    pub data_dir: PathBuf,
    pub initialized: bool,
    pub files: Vec<FileStatus>,
}

impl TransferStatus {
    pub fn missing_files(&self) -> Vec<&str> {
        self.files
            .iter()
            .filter(|f| !f.present)
            .map(|f| f.file.as_str())
            .collect()
    }

    pub fn total_records(&self) -> usize {
        self.files.iter().map(|f| f.records).sum()
    }
}

/// Record counts for one data file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStatus {
    pub file: String,
    pub present: bool,
    pub records: usize,
    pub format_errors: usize,
}
