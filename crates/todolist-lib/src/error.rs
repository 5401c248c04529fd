//! Error types for `todolist-lib`.
//!
//! Storage-agnostic `TodoError`; the CLI crate wraps it with its
//! database and configuration variants.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::TaskId;

/// Primary error type for todolist-lib operations.
#[derive(Error, Debug)]
pub enum TodoError {
    // === Task Errors ===
    /// Task with the specified ID was not found.
    #[error("Task not found: {id}")]
    TaskNotFound { id: TaskId },

    // === Validation Errors ===
    /// Field validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    // === Import Errors ===
    /// The spreadsheet could not be opened or read.
    #[error("Invalid spreadsheet format: {reason}")]
    InvalidFormat { reason: String },

    /// The input file exceeds the configured size limit.
    #[error("File too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    /// The first sheet holds more cells than the importer will process.
    #[error("Sheet too large: {cells} cells (limit {limit})")]
    TooManyCells { cells: usize, limit: usize },

    /// Another import has not finished yet.
    #[error("Import already in progress")]
    ImportInProgress,

    // === Export Errors ===
    /// Writing the spreadsheet failed.
    #[error("Export error: {0}")]
    Export(String),

    // === View Errors ===
    /// A screen-scoped handle was used after it was released.
    #[error("View is no longer attached: {0}")]
    Disposed(&'static str),

    // === Storage Errors ===
    /// Generic storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// File not found at the specified path.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TodoError {
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn invalid_format(reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            reason: reason.into(),
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for TodoError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Export(err.to_string())
    }
}

/// Result type using `TodoError`.
pub type Result<T> = std::result::Result<T, TodoError>;
