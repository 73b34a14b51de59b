//! Export the stores to the six data files.

use crate::codec::{
    CampSchema, CommitteeSchema, EncodeError, EnquirySchema, Schema, StaffSchema, StudentSchema,
    SuggestionSchema, encode_records,
};
use crate::db::{ReferentialIntegrityError, Repositories, Repository, RoleKind, User};
use miette::Diagnostic;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::files::{FileError, StagedFile, ensure_dir, stage};

/// Errors that can occur during export.
#[derive(Error, Diagnostic, Debug)]
pub enum ExportError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Integrity(#[from] ReferentialIntegrityError),

    #[error("Encode error: {0}")]
    #[diagnostic(code(cams::sync::export::encode))]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Io(#[from] FileError),
}

/// Export every store to the data files in `output_dir`.
///
/// Writes 6 files:
/// - staff.csv
/// - student.csv
/// - committee.csv
/// - camp.csv
/// - enquiry.csv
/// - suggestion.csv
///
/// Every file is encoded and staged before any is replaced, so an encoding
/// or staging failure leaves the existing files untouched. Each file is then
/// replaced atomically, but the six replacements happen one after another:
/// if one fails part-way, the files before it are new and the rest are old,
/// and the set may not resolve until the next successful export. On success
/// the stores are marked saved.
#[instrument(skip_all, fields(dir = %output_dir.display()))]
pub fn export_all(
    repos: &mut Repositories,
    output_dir: &Path,
) -> Result<ExportSummary, ExportError> {
    if let Some(err) = repos.integrity_error() {
        return Err(err.into());
    }

    let by_role = |kind: RoleKind| -> Vec<&User> {
        repos
            .users
            .iter()
            .filter(|u| u.role_kind() == kind)
            .collect()
    };
    let staff = by_role(RoleKind::Staff);
    let students = by_role(RoleKind::Student);
    let committee = by_role(RoleKind::CommitteeMember);

    let summary = ExportSummary {
        staff: staff.len(),
        students: students.len(),
        committee_members: committee.len(),
        camps: repos.camps.len(),
        enquiries: repos.enquiries.len(),
        suggestions: repos.suggestions.len(),
    };

    let files = [
        (StaffSchema::FILE_NAME, encode_records::<StaffSchema, _>(staff)?),
        (StudentSchema::FILE_NAME, encode_records::<StudentSchema, _>(students)?),
        (CommitteeSchema::FILE_NAME, encode_records::<CommitteeSchema, _>(committee)?),
        (CampSchema::FILE_NAME, encode_records::<CampSchema, _>(repos.camps.iter())?),
        (EnquirySchema::FILE_NAME, encode_records::<EnquirySchema, _>(repos.enquiries.iter())?),
        (
            SuggestionSchema::FILE_NAME,
            encode_records::<SuggestionSchema, _>(repos.suggestions.iter())?,
        ),
    ];

    ensure_dir(output_dir)?;
    let staged = files
        .iter()
        .map(|(name, content)| stage(output_dir, name, content))
        .collect::<Result<Vec<StagedFile>, FileError>>()?;

    for (replaced, file) in staged.into_iter().enumerate() {
        debug!(file = %file.target().display(), "Replacing data file");
        file.persist().inspect_err(|e| {
            warn!(replaced, error = %e, "Export stopped after replacing some data files")
        })?;
    }

    repos.mark_saved();
    info!(records = summary.total(), "Export finished");
    Ok(summary)
}

/// Summary of exported entities.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub staff: usize,
    pub students: usize,
    pub committee_members: usize,
    pub camps: usize,
    pub enquiries: usize,
    pub suggestions: usize,
}

impl ExportSummary {
    pub fn total(&self) -> usize {
        self.staff
            + self.students
            + self.committee_members
            + self.camps
            + self.enquiries
            + self.suggestions
    }
}
