//! Spreadsheet -> storage.

use std::fs;
use std::path::Path;

use serde::Serialize;
use todolist_lib::import::import_path;
use todolist_lib::{ImportMode, ImportOptions, TaskStore};

use super::{ImportGate, spinner};
use crate::error::{CoreError, Result};

/// Limits and presentation for one import.
#[derive(Debug, Clone, Copy)]
pub struct ImportSettings {
    pub mode: ImportMode,
    pub max_bytes: u64,
    pub max_cells: usize,
    pub progress: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImportOutcome {
    Imported { count: usize, mode: ImportMode },
    /// The file parsed but held no data rows; storage is untouched.
    NoValidData,
}

/// Reject files over the size limit before parsing them.
///
/// # Errors
///
/// Returns `FileNotFound`, `Io`, or `FileTooLarge`.
pub fn check_size(path: &Path, max_bytes: u64) -> Result<u64> {
    let meta = fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CoreError::FileNotFound(path.to_path_buf())
        } else {
            CoreError::Io(e)
        }
    })?;
    let size = meta.len();
    tracing::debug!(size, limit = max_bytes, "Import file size");
    if size > max_bytes {
        return Err(CoreError::FileTooLarge {
            size,
            limit: max_bytes,
        }
        .into());
    }
    Ok(size)
}

/// Import `path` into `store`.
///
/// # Errors
///
/// Returns `ImportInProgress` if the gate is held, the size or parse error,
/// or the storage error of the write. Storage is only touched once the
/// file has parsed.
pub fn run_import<S: TaskStore + ?Sized>(
    gate: &ImportGate,
    store: &mut S,
    path: &Path,
    settings: &ImportSettings,
) -> Result<ImportOutcome> {
    let _ticket = gate.try_acquire()?;
    tracing::info!(path = %path.display(), mode = %settings.mode, "Starting import");

    check_size(path, settings.max_bytes)?;

    let pb = spinner(settings.progress, "Importing spreadsheet...");
    let options = ImportOptions {
        max_cells: settings.max_cells,
    };
    let parsed = import_path(path, &options);
    pb.finish_and_clear();
    let tasks = parsed?;

    if tasks.is_empty() {
        tracing::warn!(path = %path.display(), "No valid data rows in spreadsheet");
        return Ok(ImportOutcome::NoValidData);
    }

    let count = match settings.mode {
        ImportMode::Replace => store.replace_all(&tasks)?,
        ImportMode::Append => store.insert_all(&tasks)?,
    };
    tracing::info!(count, mode = %settings.mode, "Import finished");

    Ok(ImportOutcome::Imported {
        count,
        mode: settings.mode,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TodoError;
    use rust_xlsxwriter::Workbook;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use todolist_lib::{InMemoryStore, Task};

    fn settings(mode: ImportMode) -> ImportSettings {
        ImportSettings {
            mode,
            max_bytes: 10 * 1024 * 1024,
            max_cells: 1000,
            progress: false,
        }
    }

    fn sheet(dir: &Path, rows: &[&[&str]]) -> PathBuf {
        let path = dir.join("import.xlsx");
        let mut workbook = Workbook::new();
        let ws = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    ws.write_string(
                        u32::try_from(r).unwrap(),
                        u16::try_from(c).unwrap(),
                        *value,
                    )
                    .unwrap();
                }
            }
        }
        workbook.save(&path).unwrap();
        path
    }

    fn titles(store: &InMemoryStore) -> Vec<String> {
        store.get_all().unwrap().into_iter().map(|t| t.title).collect()
    }

    #[test]
    fn test_replace_clears_existing() {
        let dir = TempDir::new().unwrap();
        let path = sheet(dir.path(), &[&["Title", "Description"], &["Checkup", "Bring ID"]]);
        let mut store = InMemoryStore::new();
        store.insert(&Task::new("Old", None)).unwrap();

        let outcome = run_import(&ImportGate::new(), &mut store, &path, &settings(ImportMode::Replace))
            .unwrap();
        assert_eq!(
            outcome,
            ImportOutcome::Imported {
                count: 1,
                mode: ImportMode::Replace
            }
        );
        assert_eq!(titles(&store), vec!["Checkup"]);
    }

    #[test]
    fn test_append_keeps_existing() {
        let dir = TempDir::new().unwrap();
        let path = sheet(dir.path(), &[&["Checkup"]]);
        let mut store = InMemoryStore::new();
        store.insert(&Task::new("Old", None)).unwrap();

        run_import(&ImportGate::new(), &mut store, &path, &settings(ImportMode::Append)).unwrap();
        assert_eq!(titles(&store), vec!["Checkup", "Old"]);
    }

    #[test]
    fn test_no_valid_data_leaves_storage() {
        let dir = TempDir::new().unwrap();
        let path = sheet(dir.path(), &[&["Title", "Description"], &["", "orphan description"]]);
        let mut store = InMemoryStore::new();
        store.insert(&Task::new("Keep", None)).unwrap();

        let outcome = run_import(&ImportGate::new(), &mut store, &path, &settings(ImportMode::Replace))
            .unwrap();
        assert_eq!(outcome, ImportOutcome::NoValidData);
        assert_eq!(titles(&store), vec!["Keep"]);
    }

    #[test]
    fn test_size_precheck() {
        let dir = TempDir::new().unwrap();
        let path = sheet(dir.path(), &[&["Checkup"]]);
        let mut store = InMemoryStore::new();
        let mut tiny = settings(ImportMode::Replace);
        tiny.max_bytes = 10;

        let err = run_import(&ImportGate::new(), &mut store, &path, &tiny).unwrap_err();
        assert!(matches!(
            err,
            TodoError::Core(CoreError::FileTooLarge { limit: 10, .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let mut store = InMemoryStore::new();
        let err = run_import(
            &ImportGate::new(),
            &mut store,
            Path::new("/no/such/backup.xlsx"),
            &settings(ImportMode::Replace),
        )
        .unwrap_err();
        assert!(matches!(err, TodoError::Core(CoreError::FileNotFound(_))));
    }

    #[test]
    fn test_gate_released_after_failure() {
        let dir = TempDir::new().unwrap();
        let bogus = dir.path().join("notes.xlsx");
        fs::write(&bogus, b"definitely not a zip").unwrap();
        let gate = ImportGate::new();
        let mut store = InMemoryStore::new();

        let err = run_import(&gate, &mut store, &bogus, &settings(ImportMode::Replace)).unwrap_err();
        assert!(matches!(err, TodoError::Core(CoreError::InvalidFormat { .. })));
        assert!(!gate.is_busy());
    }

    #[test]
    fn test_busy_gate_rejects() {
        let dir = TempDir::new().unwrap();
        let path = sheet(dir.path(), &[&["Checkup"]]);
        let gate = ImportGate::new();
        let _held = gate.try_acquire().unwrap();
        let mut store = InMemoryStore::new();

        let err = run_import(&gate, &mut store, &path, &settings(ImportMode::Replace)).unwrap_err();
        assert!(matches!(err, TodoError::Core(CoreError::ImportInProgress)));
        assert!(store.is_empty());
    }
}
