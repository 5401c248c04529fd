//! List-screen state: the filtered task list and screen-scoped handles.

use crate::error::{Result, TodoError};
use crate::model::Task;
use crate::query::filter_tasks;

/// The task list as a screen shows it.
///
/// Holds the full list from storage and the current query, and recomputes
/// the displayed rows whenever either changes. Selecting a row calls
/// `on_select`; the view knows nothing else about the screen around it.
pub struct TaskListView<F> {
    all: Vec<Task>,
    query: String,
    shown: Vec<Task>,
    on_select: F,
}

impl<F: FnMut(&Task)> TaskListView<F> {
    pub const fn new(on_select: F) -> Self {
        Self {
            all: Vec::new(),
            query: String::new(),
            shown: Vec::new(),
            on_select,
        }
    }

    /// Storage changed.
    pub fn set_tasks(&mut self, tasks: &[Task]) {
        self.all = tasks.to_vec();
        self.refresh();
    }

    /// The search text changed.
    pub fn set_query(&mut self, query: &str) {
        query.clone_into(&mut self.query);
        self.refresh();
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn shown(&self) -> &[Task] {
        &self.shown
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.all.len()
    }

    /// Whether the "no data" placeholder applies: storage itself is empty,
    /// not merely the search result.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Select the row at `position` (0-based). Returns false if out of range.
    pub fn select(&mut self, position: usize) -> bool {
        match self.shown.get(position) {
            Some(task) => {
                (self.on_select)(task);
                true
            }
            None => false,
        }
    }

    fn refresh(&mut self) {
        self.shown = filter_tasks(&self.all, &self.query);
    }
}

/// A value that lives only while its screen does.
///
/// Acquired when the screen is built and released by [`Binding::dispose`]
/// (or on drop). Access after release is an error rather than a panic.
#[derive(Debug)]
pub struct Binding<T> {
    name: &'static str,
    inner: Option<T>,
}

impl<T> Binding<T> {
    #[must_use]
    pub const fn new(name: &'static str, value: T) -> Self {
        Self {
            name,
            inner: Some(value),
        }
    }

    /// # Errors
    ///
    /// Returns `Disposed` after `dispose()`.
    pub fn get(&self) -> Result<&T> {
        self.inner.as_ref().ok_or(TodoError::Disposed(self.name))
    }

    /// # Errors
    ///
    /// Returns `Disposed` after `dispose()`.
    pub fn get_mut(&mut self) -> Result<&mut T> {
        self.inner.as_mut().ok_or(TodoError::Disposed(self.name))
    }

    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.inner.is_some()
    }

    /// Release the value. Idempotent.
    pub fn dispose(&mut self) -> Option<T> {
        let released = self.inner.take();
        if released.is_some() {
            tracing::debug!(binding = self.name, "Binding disposed");
        }
        released
    }
}
