//! Change notification over any `TaskStore`.
//!
//! `WatchedStore` forwards every call to the wrapped store. After each
//! successful write it re-reads the full list and hands it to every
//! subscriber, so list views stay current without polling.

use crate::error::Result;
use crate::model::{Task, TaskId};
use crate::store::TaskStore;

type Listener = Box<dyn FnMut(&[Task])>;

/// Handle returned by [`WatchedStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(usize);

pub struct WatchedStore<S> {
    inner: S,
    listeners: Vec<(Subscription, Listener)>,
    next_subscription: usize,
}

impl<S: TaskStore> WatchedStore<S> {
    #[must_use]
    pub const fn new(inner: S) -> Self {
        Self {
            inner,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Register a listener. It is called at once with the current list and
    /// again after every write.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the initial read fails; the listener is
    /// not registered in that case.
    pub fn subscribe(&mut self, mut listener: impl FnMut(&[Task]) + 'static) -> Result<Subscription> {
        let current = self.inner.get_all()?;
        listener(&current);

        let subscription = Subscription(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((subscription, Box::new(listener)));
        Ok(subscription)
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(s, _)| *s != subscription);
        self.listeners.len() != before
    }

    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn notify(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        match self.inner.get_all() {
            Ok(tasks) => {
                for (_, listener) in &mut self.listeners {
                    listener(&tasks);
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to refresh task list for subscribers"),
        }
    }
}

impl<S: TaskStore> TaskStore for WatchedStore<S> {
    fn insert(&mut self, task: &Task) -> Result<Task> {
        let stored = self.inner.insert(task)?;
        self.notify();
        Ok(stored)
    }

    fn insert_all(&mut self, tasks: &[Task]) -> Result<usize> {
        let inserted = self.inner.insert_all(tasks)?;
        self.notify();
        Ok(inserted)
    }

    fn update(&mut self, task: &Task) -> Result<()> {
        self.inner.update(task)?;
        self.notify();
        Ok(())
    }

    fn get_by_id(&self, id: TaskId) -> Result<Task> {
        self.inner.get_by_id(id)
    }

    fn get_all(&self) -> Result<Vec<Task>> {
        self.inner.get_all()
    }

    fn count(&self) -> Result<usize> {
        self.inner.count()
    }

    fn delete_all(&mut self) -> Result<usize> {
        let removed = self.inner.delete_all()?;
        self.notify();
        Ok(removed)
    }

    fn replace_all(&mut self, tasks: &[Task]) -> Result<usize> {
        let inserted = self.inner.replace_all(tasks)?;
        self.notify();
        Ok(inserted)
    }
}
