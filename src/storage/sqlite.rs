//! `SQLite` task store.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, Row, params};
use todolist_lib::store::validate_all;
use todolist_lib::{Task, TaskId, TaskStore};

use crate::error::{CoreError, Result};

pub const TASKS_TABLE_SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT
);
";

/// Task storage backed by a single `SQLite` file.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStorage {
    /// Open (or create) the database at `path` and apply the schema.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the file cannot be opened or the schema fails,
    /// `Io` if the parent directory cannot be created.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_seed(path, None)
    }

    /// Like [`open`](Self::open), but a database created by this call is
    /// pre-populated from `seed` (a JSON backup file) when its table is empty.
    ///
    /// Seeding failures are logged and leave the database empty.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open).
    pub fn open_with_seed(path: &Path, seed: Option<&Path>) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let created = !path.exists();
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(TASKS_TABLE_SCHEMA)?;

        let mut storage = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        tracing::debug!(path = %path.display(), created, "Opened task database");

        if created {
            if let Some(seed) = seed {
                match storage.seed_from(seed) {
                    Ok(n) => tracing::info!(count = n, seed = %seed.display(), "Seeded new database"),
                    Err(e) => tracing::warn!(seed = %seed.display(), error = %e, "Seeding failed"),
                }
            }
        }

        Ok(storage)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the schema cannot be applied.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(TASKS_TABLE_SCHEMA)?;
        Ok(Self { conn, path: None })
    }

    /// Insert the records of a JSON backup file if the table is empty.
    /// Returns how many were inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a record is invalid.
    pub fn seed_from(&mut self, seed: &Path) -> Result<usize> {
        if self.count()? > 0 {
            return Ok(0);
        }
        let tasks = todolist_lib::json::load(seed)?;
        // File order: the first record gets the lowest ID.
        Ok(self.insert_all(&tasks)?)
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn insert_row(conn: &Connection, task: &Task) -> rusqlite::Result<TaskId> {
        conn.execute(
            "INSERT INTO tasks (title, description) VALUES (?1, ?2)",
            params![task.title, task.description],
        )?;
        Ok(TaskId(conn.last_insert_rowid()))
    }
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: TaskId(row.get(0)?),
        title: row.get(1)?,
        description: row.get(2)?,
    })
}

fn db_err(e: rusqlite::Error) -> CoreError {
    CoreError::Storage(e.to_string())
}

impl TaskStore for SqliteStorage {
    fn insert(&mut self, task: &Task) -> todolist_lib::Result<Task> {
        task.validate()?;
        let id = Self::insert_row(&self.conn, task).map_err(db_err)?;
        tracing::trace!(id = %id, "Inserted task");
        Ok(task.clone().with_id(id))
    }

    fn insert_all(&mut self, tasks: &[Task]) -> todolist_lib::Result<usize> {
        validate_all(tasks)?;
        let tx = self.conn.transaction().map_err(db_err)?;
        for task in tasks {
            Self::insert_row(&tx, task).map_err(db_err)?;
        }
        tx.commit().map_err(db_err)?;
        Ok(tasks.len())
    }

    fn update(&mut self, task: &Task) -> todolist_lib::Result<()> {
        task.validate()?;
        let changed = self
            .conn
            .execute(
                "UPDATE tasks SET title = ?1, description = ?2 WHERE id = ?3",
                params![task.title, task.description, task.id.0],
            )
            .map_err(db_err)?;
        if changed == 0 {
            return Err(CoreError::TaskNotFound { id: task.id });
        }
        Ok(())
    }

    fn get_by_id(&self, id: TaskId) -> todolist_lib::Result<Task> {
        self.conn
            .query_row(
                "SELECT id, title, description FROM tasks WHERE id = ?1",
                params![id.0],
                task_from_row,
            )
            .optional()
            .map_err(db_err)?
            .ok_or(CoreError::TaskNotFound { id })
    }

    fn get_all(&self) -> todolist_lib::Result<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, description FROM tasks ORDER BY id DESC")
            .map_err(db_err)?;
        let rows = stmt.query_map([], task_from_row).map_err(db_err)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_err)
    }

    fn count(&self) -> todolist_lib::Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))
            .map_err(db_err)?;
        usize::try_from(n).map_err(|e| CoreError::Storage(e.to_string()))
    }

    fn delete_all(&mut self) -> todolist_lib::Result<usize> {
        let removed = self.conn.execute("DELETE FROM tasks", []).map_err(db_err)?;
        Ok(removed)
    }

    fn replace_all(&mut self, tasks: &[Task]) -> todolist_lib::Result<usize> {
        validate_all(tasks)?;
        let tx = self.conn.transaction().map_err(db_err)?;
        let removed = tx.execute("DELETE FROM tasks", []).map_err(db_err)?;
        for task in tasks {
            Self::insert_row(&tx, task).map_err(db_err)?;
        }
        tx.commit().map_err(db_err)?;
        tracing::debug!(removed, inserted = tasks.len(), "Replaced all tasks");
        Ok(tasks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn titles(store: &SqliteStorage) -> Vec<String> {
        store
            .get_all()
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect()
    }

    #[test]
    fn test_insert_and_get() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let stored = storage
            .insert(&Task::new("Take aspirin", Some("Daily".to_string())))
            .unwrap();
        assert!(stored.id.is_assigned());

        let fetched = storage.get_by_id(stored.id).unwrap();
        assert_eq!(fetched, stored);
        assert_eq!(storage.count().unwrap(), 1);
    }

    #[test]
    fn test_get_all_id_descending() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        storage.insert(&Task::new("Blood test", None)).unwrap();
        storage.insert(&Task::new("Take aspirin", None)).unwrap();
        assert_eq!(titles(&storage), vec!["Take aspirin", "Blood test"]);
    }

    #[test]
    fn test_description_null_roundtrip() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let stored = storage.insert(&Task::new("No notes", None)).unwrap();
        assert_eq!(storage.get_by_id(stored.id).unwrap().description, None);
    }

    #[test]
    fn test_blank_title_rejected() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        assert!(matches!(
            storage.insert(&Task::new("  ", None)),
            Err(CoreError::Validation { .. })
        ));
        assert!(storage.insert_all(&[Task::new("ok", None), Task::new("", None)]).is_err());
        assert_eq!(storage.count().unwrap(), 0);
    }

    #[test]
    fn test_update_and_missing() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let mut task = storage.insert(&Task::new("Original", None)).unwrap();
        task.title = "Edited".to_string();
        storage.update(&task).unwrap();
        assert_eq!(storage.get_by_id(task.id).unwrap().title, "Edited");

        let ghost = Task::new("Ghost", None).with_id(TaskId(404));
        assert!(matches!(
            storage.update(&ghost),
            Err(CoreError::TaskNotFound { id: TaskId(404) })
        ));
        assert!(matches!(
            storage.get_by_id(TaskId(404)),
            Err(CoreError::TaskNotFound { .. })
        ));
    }

    #[test]
    fn test_replace_all() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        storage.insert(&Task::new("Old", None)).unwrap();
        let n = storage
            .replace_all(&[Task::new("A", None), Task::new("B", None)])
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(titles(&storage), vec!["B", "A"]);

        // Invalid batch leaves storage untouched.
        assert!(storage.replace_all(&[Task::new("", None)]).is_err());
        assert_eq!(storage.count().unwrap(), 2);
    }

    #[test]
    fn test_delete_all_counts() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        storage
            .insert_all(&[Task::new("A", None), Task::new("B", None)])
            .unwrap();
        assert_eq!(storage.delete_all().unwrap(), 2);
        assert_eq!(storage.count().unwrap(), 0);
    }

    #[test]
    fn test_persists_across_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("tasks.db");
        {
            let mut storage = SqliteStorage::open(&path).unwrap();
            storage.insert(&Task::new("Persisted", None)).unwrap();
        }
        let storage = SqliteStorage::open(&path).unwrap();
        assert_eq!(titles(&storage), vec!["Persisted"]);
        assert_eq!(storage.path(), Some(path.as_path()));
    }

    #[test]
    fn test_seed_only_on_creation() {
        let dir = TempDir::new().unwrap();
        let seed = dir.path().join("seed.json");
        std::fs::write(
            &seed,
            r#"[{"title": "First", "description": null}, {"title": "Second", "description": "x"}]"#,
        )
        .unwrap();
        let db = dir.path().join("tasks.db");

        let mut storage = SqliteStorage::open_with_seed(&db, Some(&seed)).unwrap();
        // Seeded in file order, so storage order (newest first) is reversed.
        assert_eq!(titles(&storage), vec!["Second", "First"]);
        assert_eq!(storage.get_by_id(TaskId(1)).unwrap().title, "First");
        assert_eq!(
            storage.get_by_id(TaskId(2)).unwrap().description.as_deref(),
            Some("x")
        );
        storage.delete_all().unwrap();
        drop(storage);

        let storage = SqliteStorage::open_with_seed(&db, Some(&seed)).unwrap();
        assert_eq!(storage.count().unwrap(), 0);
    }

    #[test]
    fn test_bad_seed_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let seed = dir.path().join("seed.json");
        std::fs::write(&seed, "not json").unwrap();
        let storage = SqliteStorage::open_with_seed(&dir.path().join("t.db"), Some(&seed)).unwrap();
        assert_eq!(storage.count().unwrap(), 0);
    }
}
