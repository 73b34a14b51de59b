//! Transfer module - moves the CAMs dataset between data files and stores.
//!
//! Import reads the six data files in dependency order and resolves cross
//! references; export writes them back atomically.

mod export;
mod files;
mod import;
mod manager;
#[cfg(test)]
mod manager_test;
mod paths;

pub use export::{ExportError, ExportSummary, export_all};
pub use files::{FileError, StagedFile, read_file, stage};
pub use import::{ImportError, ImportReport, ImportSummary, UnreadableFile, import_all};
pub use manager::{FileStatus, TransferError, TransferManager, TransferStatus};
pub use paths::{DATA_DIR_ENV, get_data_dir};
