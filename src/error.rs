//! Error types for `todolist_rust`.
//!
//! Extends the library error with database, configuration and sharing
//! failures, and maps every error to the dialog a user sees.

use std::path::PathBuf;
use thiserror::Error;

pub use todolist_lib::TodoError as CoreError;

/// Primary error type for the `td` tool.
#[derive(Error, Debug)]
pub enum TodoError {
    /// Error from the task core (validation, import, export, JSON).
    #[error(transparent)]
    Core(#[from] CoreError),

    // === Storage Errors ===
    /// SQLite database error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Workspace not initialized (no `.todo` directory).
    #[error("Not initialized: run 'td init' first")]
    NotInitialized,

    /// Workspace already initialized.
    #[error("Already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    // === Configuration Errors ===
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// YAML parse error in a config file.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // === Sharing Errors ===
    /// Handing files to the share target failed.
    #[error("Share failed: {reason}")]
    Share { reason: String },

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error in CLI output.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TodoError {
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Core(CoreError::validation(field, reason))
    }

    /// The library error, if this wraps one.
    #[must_use]
    pub const fn core(&self) -> Option<&CoreError> {
        match self {
            Self::Core(inner) => Some(inner),
            _ => None,
        }
    }
}

/// Which user action failed; picks the fallback dialog title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Import,
    Export,
}

/// A title + message pair shown to the user in place of a crash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub title: String,
    pub message: String,
}

impl Dialog {
    #[must_use]
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    /// The file parsed but produced no records. An outcome, not an error.
    #[must_use]
    pub fn no_valid_data() -> Self {
        Self::new("No Valid Data", "No valid data found in the Excel file.")
    }

    /// Map an import or export failure to its dialog.
    ///
    /// Import failures are classified (invalid format, too large, busy);
    /// export failures of any kind collapse into "Export Failed".
    #[must_use]
    pub fn for_error(action: Action, err: &TodoError) -> Self {
        if action == Action::Export {
            return Self::new("Export Failed", format!("Error: {err}"));
        }

        match err.core() {
            Some(CoreError::InvalidFormat { reason }) => Self::new(
                "Invalid Excel Format",
                format!(
                    "{reason}\n\nExpected an .xlsx or .xls file with the task title in the \
                     first column and an optional description in the following columns."
                ),
            ),
            Some(CoreError::FileTooLarge { size, limit }) => Self::new(
                "File Too Large",
                format!(
                    "The selected file is too large ({}MB). Please select a file smaller than {}MB.",
                    size / 1024 / 1024,
                    limit / 1024 / 1024
                ),
            ),
            Some(CoreError::TooManyCells { .. }) => {
                Self::new("File Too Large", "The Excel file is too large to import.")
            }
            Some(CoreError::ImportInProgress) => {
                Self::new("Import Busy", "Import already in progress")
            }
            _ => Self::new("Import Failed", format!("Error: {err}")),
        }
    }
}

impl std::fmt::Display for Dialog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

/// Result type using `TodoError`.
pub type Result<T> = std::result::Result<T, TodoError>;
