//! Task storage: the `TaskStore` trait and an in-memory implementation.
//!
//! `InMemoryStore` keeps tasks in a `BTreeMap` keyed by ID and can be
//! loaded from / saved to a JSON backup file. The SQLite-backed store lives
//! in the CLI crate and implements the same trait.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, TodoError};
use crate::json;
use crate::model::{Task, TaskId};

/// Create/read/update/list/delete over task records.
///
/// `get_all` returns tasks newest first (ID descending). Every write
/// validates the title before touching storage.
pub trait TaskStore {
    /// Insert one task and return it with its assigned ID.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank title, or a storage error.
    fn insert(&mut self, task: &Task) -> Result<Task>;

    /// Insert many tasks in order; returns how many were inserted.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if any title is blank (nothing is inserted).
    fn insert_all(&mut self, tasks: &[Task]) -> Result<usize>;

    /// Overwrite title and description of an existing task.
    ///
    /// # Errors
    ///
    /// Returns `TaskNotFound` or `Validation`.
    fn update(&mut self, task: &Task) -> Result<()>;

    /// # Errors
    ///
    /// Returns `TaskNotFound` if no task has this ID.
    fn get_by_id(&self, id: TaskId) -> Result<Task>;

    /// All tasks, ID descending.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the read fails.
    fn get_all(&self) -> Result<Vec<Task>>;

    /// # Errors
    ///
    /// Returns a storage error if the read fails.
    fn count(&self) -> Result<usize>;

    /// Remove every task; returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the delete fails.
    fn delete_all(&mut self) -> Result<usize>;

    /// Clear storage, then insert `tasks`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` before deleting anything if a title is blank.
    fn replace_all(&mut self, tasks: &[Task]) -> Result<usize> {
        validate_all(tasks)?;
        self.delete_all()?;
        self.insert_all(tasks)
    }
}

impl<S: TaskStore + ?Sized> TaskStore for &mut S {
    fn insert(&mut self, task: &Task) -> Result<Task> {
        (**self).insert(task)
    }

    fn insert_all(&mut self, tasks: &[Task]) -> Result<usize> {
        (**self).insert_all(tasks)
    }

    fn update(&mut self, task: &Task) -> Result<()> {
        (**self).update(task)
    }

    fn get_by_id(&self, id: TaskId) -> Result<Task> {
        (**self).get_by_id(id)
    }

    fn get_all(&self) -> Result<Vec<Task>> {
        (**self).get_all()
    }

    fn count(&self) -> Result<usize> {
        (**self).count()
    }

    fn delete_all(&mut self) -> Result<usize> {
        (**self).delete_all()
    }

    fn replace_all(&mut self, tasks: &[Task]) -> Result<usize> {
        (**self).replace_all(tasks)
    }
}

/// Validate a batch up front so a bad record never leaves a partial write.
///
/// # Errors
///
/// Returns the first `Validation` error.
pub fn validate_all(tasks: &[Task]) -> Result<()> {
    tasks.iter().try_for_each(Task::validate)
}

/// In-memory task store.
///
/// All data lives in memory. Use `open()` to load from a JSON file
/// and `save()` to persist back.
#[derive(Debug)]
pub struct InMemoryStore {
    tasks: BTreeMap<TaskId, Task>,
    next_id: i64,
    json_path: Option<PathBuf>,
    dirty: bool,
}

impl InMemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
            next_id: 1,
            json_path: None,
            dirty: false,
        }
    }

    /// Open and load from a JSON file. A missing file opens an empty store
    /// that will be created on `save()`.
    ///
    /// Records are assigned IDs in reverse file order, so the first record in
    /// the file (the newest one in a backup) gets the highest ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let loaded = match json::load(path) {
            Ok(tasks) => tasks,
            Err(TodoError::FileNotFound(_)) => Vec::new(),
            Err(e) => return Err(e),
        };

        let mut store = Self::new();
        store.json_path = Some(path.to_path_buf());
        for task in loaded.iter().rev() {
            store.insert(task)?;
        }
        store.dirty = false;
        Ok(store)
    }

    /// Save to the file that was opened.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if no file path is set, or `Io` on write failure.
    pub fn save(&mut self) -> Result<()> {
        let path = self
            .json_path
            .clone()
            .ok_or_else(|| TodoError::Storage("No file path set; use save_to()".to_string()))?;
        self.save_to(&path)?;
        self.dirty = false;
        Ok(())
    }

    /// Save to a specific file path.
    ///
    /// # Errors
    ///
    /// Returns `Io` on write failure.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        json::save(path.as_ref(), &self.ordered())
    }

    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn ordered(&self) -> Vec<Task> {
        self.tasks.values().rev().cloned().collect()
    }

    fn allocate_id(&mut self) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore for InMemoryStore {
    fn insert(&mut self, task: &Task) -> Result<Task> {
        task.validate()?;
        let id = self.allocate_id();
        let stored = task.clone().with_id(id);
        self.tasks.insert(id, stored.clone());
        self.dirty = true;
        Ok(stored)
    }

    fn insert_all(&mut self, tasks: &[Task]) -> Result<usize> {
        validate_all(tasks)?;
        for task in tasks {
            self.insert(task)?;
        }
        Ok(tasks.len())
    }

    fn update(&mut self, task: &Task) -> Result<()> {
        task.validate()?;
        let existing = self
            .tasks
            .get_mut(&task.id)
            .ok_or(TodoError::TaskNotFound { id: task.id })?;
        existing.title.clone_from(&task.title);
        existing.description.clone_from(&task.description);
        self.dirty = true;
        Ok(())
    }

    fn get_by_id(&self, id: TaskId) -> Result<Task> {
        self.tasks
            .get(&id)
            .cloned()
            .ok_or(TodoError::TaskNotFound { id })
    }

    fn get_all(&self) -> Result<Vec<Task>> {
        Ok(self.ordered())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.tasks.len())
    }

    fn delete_all(&mut self) -> Result<usize> {
        let removed = self.tasks.len();
        self.tasks.clear();
        if removed > 0 {
            self.dirty = true;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(store: &impl TaskStore) -> Vec<String> {
        store
            .get_all()
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect()
    }

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let mut store = InMemoryStore::new();
        let a = store.insert(&Task::new("Blood test", None)).unwrap();
        let b = store.insert(&Task::new("Take aspirin", None)).unwrap();
        assert!(a.id.is_assigned());
        assert!(b.id > a.id);
        assert_eq!(store.get_by_id(a.id).unwrap().title, "Blood test");
    }

    #[test]
    fn test_get_all_newest_first() {
        let mut store = InMemoryStore::new();
        store.insert(&Task::new("Blood test", None)).unwrap();
        store.insert(&Task::new("Take aspirin", None)).unwrap();
        assert_eq!(titles(&store), vec!["Take aspirin", "Blood test"]);
    }

    #[test]
    fn test_blank_title_rejected() {
        let mut store = InMemoryStore::new();
        let result = store.insert(&Task::new("   ", None));
        assert!(matches!(result, Err(TodoError::Validation { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn test_insert_all_is_all_or_nothing() {
        let mut store = InMemoryStore::new();
        let batch = vec![Task::new("Good", None), Task::new("", None)];
        assert!(store.insert_all(&batch).is_err());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_update() {
        let mut store = InMemoryStore::new();
        let mut task = store.insert(&Task::new("Original", None)).unwrap();
        task.title = "Updated".to_string();
        task.description = Some("<i>notes</i>".to_string());
        store.update(&task).unwrap();

        let fetched = store.get_by_id(task.id).unwrap();
        assert_eq!(fetched.title, "Updated");
        assert_eq!(fetched.description.as_deref(), Some("<i>notes</i>"));
    }

    #[test]
    fn test_update_nonexistent() {
        let mut store = InMemoryStore::new();
        let ghost = Task::new("Ghost", None).with_id(TaskId(99));
        assert!(matches!(
            store.update(&ghost),
            Err(TodoError::TaskNotFound { id: TaskId(99) })
        ));
    }

    #[test]
    fn test_replace_all_clears_first() {
        let mut store = InMemoryStore::new();
        store.insert(&Task::new("Old", None)).unwrap();
        let inserted = store
            .replace_all(&[Task::new("New A", None), Task::new("New B", None)])
            .unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(titles(&store), vec!["New B", "New A"]);
    }

    #[test]
    fn test_replace_all_rejects_before_deleting() {
        let mut store = InMemoryStore::new();
        store.insert(&Task::new("Keep me", None)).unwrap();
        assert!(store.replace_all(&[Task::new(" ", None)]).is_err());
        assert_eq!(titles(&store), vec!["Keep me"]);
    }

    #[test]
    fn test_ids_not_reused_after_delete_all() {
        let mut store = InMemoryStore::new();
        let first = store.insert(&Task::new("One", None)).unwrap();
        store.delete_all().unwrap();
        let second = store.insert(&Task::new("Two", None)).unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn test_roundtrip_save_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");

        let mut store = InMemoryStore::open(&path).unwrap();
        assert!(store.is_empty());
        store.insert(&Task::new("Blood test", None)).unwrap();
        store
            .insert(&Task::new("Take aspirin", Some("Daily".to_string())))
            .unwrap();
        assert!(store.is_dirty());
        store.save().unwrap();
        assert!(!store.is_dirty());

        let reopened = InMemoryStore::open(&path).unwrap();
        assert_eq!(titles(&reopened), vec!["Take aspirin", "Blood test"]);
        assert!(!reopened.is_dirty());
    }

    #[test]
    fn test_save_without_path() {
        let mut store = InMemoryStore::new();
        assert!(matches!(store.save(), Err(TodoError::Storage(_))));
    }
}
