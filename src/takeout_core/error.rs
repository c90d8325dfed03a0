use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TakeoutError {
    // Configuration errors
    #[error("A target folder must be defined in the JSON settings or as an argument")]
    MissingTarget,

    #[error("Target folder does not exist or is not a directory: {0}")]
    InvalidTarget(PathBuf),

    #[error("{path} is not inside the working root {root}")]
    OutsideWorkingRoot { path: PathBuf, root: PathBuf },

    #[error("Invalid settings in {path}: {reason}")]
    Settings { path: PathBuf, reason: String },

    // Catalog
    #[error("No files to process in {0}")]
    NoFilesFound(PathBuf),

    // Metadata errors, scoped to a single file
    #[error("Failed to read metadata of {path}: {reason}")]
    MetadataParse { path: PathBuf, reason: String },

    #[error("Exiftool error: {0}")]
    Exiftool(String),

    #[error("Date error: {0}")]
    InvalidDate(String),

    // Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walker error: {0}")]
    Walkdir(#[from] walkdir::Error),

    #[error("Refusing to archive {file} over existing {destination}")]
    ArchiveCollision { file: PathBuf, destination: PathBuf },
}

impl TakeoutError {
    /// Failures that only affect the file being processed. The run counts
    /// the file as skipped and moves on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TakeoutError::MetadataParse { .. }
                | TakeoutError::Exiftool(_)
                | TakeoutError::InvalidDate(_)
        )
    }

    pub(crate) fn metadata(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        TakeoutError::MetadataParse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for takeout-sync operations.
pub type Result<T> = std::result::Result<T, TakeoutError>;
