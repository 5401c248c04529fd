//! Core data types for todolist-lib.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TodoError};

/// Storage-assigned task identifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl TaskId {
    /// Placeholder for records that have not been stored yet.
    pub const UNASSIGNED: Self = Self(0);

    #[must_use]
    pub const fn is_assigned(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let digits = s.strip_prefix('#').unwrap_or(s);
        match digits.parse::<i64>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(TodoError::validation("id", format!("not a task id: {s}"))),
        }
    }
}

/// A to-do entry: a title plus an optional rich-text (HTML) description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Task {
    /// Storage-assigned ID; `TaskId::UNASSIGNED` until inserted.
    #[serde(default)]
    pub id: TaskId,

    /// Title (never blank once stored).
    pub title: String,

    /// HTML or plain-text body. `None` when absent, never coerced to "".
    #[serde(default)]
    pub description: Option<String>,
}

impl Task {
    /// Build an unstored task.
    #[must_use]
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: TaskId::UNASSIGNED,
            title: title.into(),
            description,
        }
    }

    /// Check the storage invariants.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the title is blank.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(TodoError::validation("title", "cannot be empty"));
        }
        Ok(())
    }

    /// Same task with a storage-assigned ID.
    #[must_use]
    pub fn with_id(mut self, id: TaskId) -> Self {
        self.id = id;
        self
    }
}

/// Wire shape of a task in JSON backups and seed files: no identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskRecord {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
        }
    }
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        Self::new(record.title, record.description)
    }
}
