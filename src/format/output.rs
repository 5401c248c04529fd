use serde::{Deserialize, Serialize};
use todolist_lib::Task;

use crate::error::Dialog;

/// Task with its description flattened to text, for list views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSummary {
    #[serde(flatten)]
    pub task: Task,
    pub preview: Option<String>,
}

impl From<Task> for TaskSummary {
    fn from(task: Task) -> Self {
        let preview = task
            .description
            .as_deref()
            .map(super::html_to_text)
            .filter(|s| !s.is_empty());
        Self { task, preview }
    }
}

/// List output: the filtered tasks plus how many exist in total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskList {
    pub query: Option<String>,
    pub total: usize,
    pub shown: usize,
    pub tasks: Vec<TaskSummary>,
}

/// Error dialog in machine-readable form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogOutput {
    pub error: String,
    pub message: String,
}

impl From<&Dialog> for DialogOutput {
    fn from(dialog: &Dialog) -> Self {
        Self {
            error: dialog.title.clone(),
            message: dialog.message.clone(),
        }
    }
}

/// Aggregate count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Count {
    pub count: usize,
}
