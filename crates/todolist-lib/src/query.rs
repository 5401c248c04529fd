//! Search filtering and partial updates for tasks.

use crate::error::Result;
use crate::model::Task;

/// Fields to update on a task. Outer `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
}

impl TaskUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }

    /// Apply to a copy of `task` and validate the result.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the new title is blank.
    pub fn apply(&self, task: &Task) -> Result<Task> {
        let mut updated = task.clone();
        if let Some(title) = &self.title {
            updated.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            updated.description.clone_from(description);
        }
        updated.validate()?;
        Ok(updated)
    }
}

/// Compute the displayed list for a search query.
///
/// A blank query shows everything; otherwise tasks whose title contains the
/// trimmed query, ignoring case. Either way the result is sorted by title,
/// case-insensitively. The input is left untouched.
#[must_use]
pub fn filter_tasks(tasks: &[Task], query: &str) -> Vec<Task> {
    let needle = query.trim().to_lowercase();
    let mut shown: Vec<(String, &Task)> = tasks
        .iter()
        .map(|task| (task.title.to_lowercase(), task))
        .filter(|(title, _)| needle.is_empty() || title.contains(&needle))
        .collect();
    shown.sort_by(|a, b| a.0.cmp(&b.0));
    shown.into_iter().map(|(_, task)| task.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskId;

    fn tasks() -> Vec<Task> {
        vec![
            Task::new("take aspirin", None).with_id(TaskId(3)),
            Task::new("Blood test", None).with_id(TaskId(2)),
            Task::new("Aspirin refill", None).with_id(TaskId(1)),
        ]
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn test_blank_query_sorts_everything() {
        let all = tasks();
        let shown = filter_tasks(&all, "   ");
        assert_eq!(titles(&shown), vec!["Aspirin refill", "Blood test", "take aspirin"]);
        // Input order is unchanged.
        assert_eq!(all[0].title, "take aspirin");
    }

    #[test]
    fn test_query_is_case_insensitive_substring() {
        let shown = filter_tasks(&tasks(), " ASPIRIN ");
        assert_eq!(titles(&shown), vec!["Aspirin refill", "take aspirin"]);
    }

    #[test]
    fn test_no_match() {
        assert!(filter_tasks(&tasks(), "x-ray").is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let once = filter_tasks(&tasks(), "a");
        let twice = filter_tasks(&once, "a");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_update_apply() {
        let task = Task::new("Old", Some("keep".to_string())).with_id(TaskId(1));

        let retitled = TaskUpdate {
            title: Some("  New ".to_string()),
            ..Default::default()
        }
        .apply(&task)
        .unwrap();
        assert_eq!(retitled.title, "New");
        assert_eq!(retitled.description.as_deref(), Some("keep"));

        let cleared = TaskUpdate {
            description: Some(None),
            ..Default::default()
        }
        .apply(&task)
        .unwrap();
        assert_eq!(cleared.description, None);

        let blank = TaskUpdate {
            title: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(blank.apply(&task).is_err());
        assert!(TaskUpdate::default().is_empty());
    }
}
