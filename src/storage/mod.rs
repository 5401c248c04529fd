//! `SQLite` storage layer for `td`.
//!
//! This module provides the persistence layer using `SQLite` with:
//! - WAL mode for concurrent reads
//! - Transaction discipline for bulk writes (`insert_all`, `replace_all`)
//! - A process-wide shared instance, opened once and never torn down
//!
//! # Submodules
//!
//! - [`sqlite`] - `SqliteStorage`, the `TaskStore` implementation

pub mod sqlite;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::OnceCell;

use crate::error::{CoreError, Result};

pub use sqlite::{SqliteStorage, TASKS_TABLE_SCHEMA};

static SHARED: OnceCell<Mutex<SqliteStorage>> = OnceCell::new();

/// The process-wide database, opened on first use.
///
/// Concurrent first callers block on the initialization lock; exactly one
/// opens the file. Later calls return the same instance whatever `path`
/// they pass.
///
/// # Errors
///
/// Returns the open error of the first call. A failed open is retried by
/// the next call.
pub fn shared(path: &Path, seed: Option<&Path>) -> Result<&'static Mutex<SqliteStorage>> {
    let storage = SHARED.get_or_try_init(|| {
        tracing::debug!(path = %path.display(), "Opening shared task database");
        SqliteStorage::open_with_seed(path, seed).map(Mutex::new)
    })?;
    Ok(storage)
}

/// Lock the shared database for one command.
///
/// # Errors
///
/// Returns the open error, or `Storage` if a previous holder panicked.
pub fn lock_shared(
    path: &Path,
    seed: Option<&Path>,
) -> Result<MutexGuard<'static, SqliteStorage>> {
    let guard = shared(path, seed)?
        .lock()
        .map_err(|_| CoreError::Storage("task database lock poisoned".to_string()))?;
    if guard.path().is_some_and(|p| p != path) {
        tracing::warn!(
            requested = %path.display(),
            "Shared database already open at another path"
        );
    }
    Ok(guard)
}
