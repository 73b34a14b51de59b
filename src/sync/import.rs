//! Import the six data files into fresh stores.

use crate::codec::{
    CampSchema, CommitteeSchema, EnquirySchema, FormatError, FormatErrorKind, Schema,
    StaffSchema, StudentSchema, SuggestionSchema, decode_records,
};
use crate::db::{DbError, Entity, Repositories, Store, Stores, Violation};
use miette::Diagnostic;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::files::read_file;

/// Errors that abort an import.
#[derive(Error, Diagnostic, Debug)]
pub enum ImportError {
    #[error("Data directory not found: {}", .0.display())]
    #[diagnostic(
        code(cams::sync::import::data_dir_missing),
        help("Pass --data-dir, set CAMS_DATA_DIR, or run `cams init` first")
    )]
    DataDirMissing(PathBuf),

    #[error("Database error: {0}")]
    #[diagnostic(code(cams::sync::import::database))]
    Database(#[from] DbError),
}

/// A data file that exists but could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnreadableFile {
    pub file: String,
    pub error: String,
}

/// Everything an import produced.
///
/// Integrity violations live in `repositories` and block mutation until
/// acknowledged.
#[derive(Debug)]
pub struct ImportReport {
    pub repositories: Repositories,
    pub summary: ImportSummary,
    pub format_errors: Vec<FormatError>,
    pub missing_files: Vec<String>,
    pub unreadable_files: Vec<UnreadableFile>,
}

impl ImportReport {
    pub fn violations(&self) -> &[Violation] {
        self.repositories.violations()
    }

    /// True when nothing at all was wrong with the data.
    pub fn is_clean(&self) -> bool {
        self.format_errors.is_empty()
            && self.unreadable_files.is_empty()
            && self.violations().is_empty()
    }
}

/// Summary of imported entities.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub staff: usize,
    pub students: usize,
    pub committee_members: usize,
    pub camps: usize,
    pub enquiries: usize,
    pub suggestions: usize,
}

impl ImportSummary {
    pub fn total(&self) -> usize {
        self.staff
            + self.students
            + self.committee_members
            + self.camps
            + self.enquiries
            + self.suggestions
    }
}

/// Collects per-file problems while the files are read.
struct Loader<'a> {
    dir: &'a Path,
    format_errors: Vec<FormatError>,
    missing_files: Vec<String>,
    unreadable_files: Vec<UnreadableFile>,
}

impl Loader<'_> {
    fn read(&mut self, name: &str) -> Option<String> {
        match read_file(&self.dir.join(name)) {
            Ok(Some(content)) => Some(content),
            Ok(None) => {
                info!(file = name, "Data file missing, starting empty");
                self.missing_files.push(name.to_string());
                None
            }
            Err(e) => {
                warn!(file = name, error = %e, "Data file unreadable, treating as empty");
                self.unreadable_files.push(UnreadableFile {
                    file: name.to_string(),
                    error: e.to_string(),
                });
                None
            }
        }
    }

    /// Decode one file into `store`. Bad rows and duplicate IDs are
    /// recorded; the rest of the file still loads.
    fn load<S>(&mut self, store: &mut Store<S::Entity>) -> Result<usize, ImportError>
    where
        S: Schema,
        S::Entity: Entity,
    {
        let Some(content) = self.read(S::FILE_NAME) else {
            return Ok(0);
        };

        let decoded = decode_records::<S>(&content);
        let bad_rows = decoded.errors.len();
        self.format_errors.extend(decoded.errors);

        let mut count = 0;
        for (row, entity) in decoded.records {
            match store.load(entity) {
                Ok(()) => count += 1,
                Err(DbError::AlreadyExists { id, .. }) => {
                    self.format_errors.push(FormatError {
                        file: S::FILE_NAME.to_string(),
                        row,
                        field: S::KEY_COLUMN.to_string(),
                        kind: FormatErrorKind::DuplicateId(id),
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }

        if bad_rows > 0 {
            warn!(file = S::FILE_NAME, bad_rows, "Skipped malformed rows");
        }
        info!(file = S::FILE_NAME, records = count, "Imported file");
        Ok(count)
    }
}

/// Import all data files from `input_dir` into fresh stores, then resolve
/// cross references.
///
/// Reads 6 files, in dependency order:
/// - staff.csv
/// - student.csv
/// - committee.csv
/// - camp.csv
/// - enquiry.csv
/// - suggestion.csv
///
/// A missing file leaves its store empty. Only a missing directory is fatal.
#[instrument(skip_all, fields(dir = %input_dir.display()))]
pub fn import_all(input_dir: &Path) -> Result<ImportReport, ImportError> {
    if !input_dir.is_dir() {
        return Err(ImportError::DataDirMissing(input_dir.to_path_buf()));
    }

    let mut loader = Loader {
        dir: input_dir,
        format_errors: Vec::new(),
        missing_files: Vec::new(),
        unreadable_files: Vec::new(),
    };
    let mut stores = Stores::default();
    stores.begin_load();

    let summary = ImportSummary {
        staff: loader.load::<StaffSchema>(&mut stores.users)?,
        students: loader.load::<StudentSchema>(&mut stores.users)?,
        committee_members: loader.load::<CommitteeSchema>(&mut stores.users)?,
        camps: loader.load::<CampSchema>(&mut stores.camps)?,
        enquiries: loader.load::<EnquirySchema>(&mut stores.enquiries)?,
        suggestions: loader.load::<SuggestionSchema>(&mut stores.suggestions)?,
    };

    stores.finish_load();
    let repositories = Repositories::from_loaded(stores);

    info!(
        records = summary.total(),
        format_errors = loader.format_errors.len(),
        violations = repositories.violations().len(),
        "Import finished"
    );

    Ok(ImportReport {
        repositories,
        summary,
        format_errors: loader.format_errors,
        missing_files: loader.missing_files,
        unreadable_files: loader.unreadable_files,
    })
}
