//! JSON file I/O for task backups and seed files.
//!
//! The file is a single pretty-printed array of `{"title", "description"}`
//! objects. Identifiers are never written; stores assign fresh ones on load.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{Result, TodoError};
use crate::model::{Task, TaskRecord};

/// Load tasks from a JSON array file.
///
/// Records are returned unstored (`TaskId::UNASSIGNED`), in file order.
///
/// # Errors
///
/// Returns `FileNotFound` if the file does not exist, `Io` if it cannot be
/// read, or `Json` if it is not an array of task records.
pub fn load(path: &Path) -> Result<Vec<Task>> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            TodoError::FileNotFound(path.to_path_buf())
        } else {
            TodoError::Io(e)
        }
    })?;

    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let records: Vec<TaskRecord> = serde_json::from_str(&content)?;
    Ok(records.into_iter().map(Task::from).collect())
}

/// Serialize tasks to the pretty-printed backup form.
///
/// # Errors
///
/// Returns `Json` if serialization fails.
pub fn to_string(tasks: &[Task]) -> Result<String> {
    let records: Vec<TaskRecord> = tasks.iter().map(TaskRecord::from).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

/// Save tasks to a JSON file with atomic write.
///
/// Uses write-to-temp + rename for atomicity.
///
/// # Errors
///
/// Returns `Io` if the file cannot be written.
pub fn save(path: &Path, tasks: &[Task]) -> Result<()> {
    let json = to_string(tasks)?;

    let tmp_path = path.with_extension("json.tmp");
    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(json.as_bytes())?;
    file.write_all(b"\n")?;
    file.flush()?;
    drop(file);

    fs::rename(&tmp_path, path)?;
    Ok(())
}
