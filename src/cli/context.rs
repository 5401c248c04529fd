//! Per-invocation state shared by the commands.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::MutexGuard;

use todolist_lib::{InMemoryStore, TaskStore};

use super::Cli;
use crate::config::{Config, JSON_FILE, WORKSPACE_DIR};
use crate::error::{Result, TodoError};
use crate::storage::{SqliteStorage, lock_shared};

#[derive(Debug, Clone)]
pub struct Context {
    pub json: bool,
    pub quiet: bool,
    pub no_db: bool,
    /// The `.todo` workspace directory.
    pub dir: PathBuf,
}

impl Context {
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            json: cli.json,
            quiet: cli.quiet,
            no_db: cli.no_db,
            dir: PathBuf::from(WORKSPACE_DIR),
        }
    }

    /// Configuration for an initialized workspace.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` if the workspace directory is missing, or a
    /// config error.
    pub fn config(&self) -> Result<Config> {
        if !self.dir.is_dir() {
            return Err(TodoError::NotInitialized);
        }
        Config::load(&self.dir)
    }

    #[must_use]
    pub fn json_path(&self) -> PathBuf {
        self.dir.join(JSON_FILE)
    }

    /// Open the task store this invocation works on.
    ///
    /// # Errors
    ///
    /// Returns the open error of the database or JSON file.
    pub fn open_store(&self, config: &Config) -> Result<Backend> {
        if self.no_db {
            tracing::debug!(path = %self.json_path().display(), "Using JSON task store");
            return Ok(Backend::Json(InMemoryStore::open(self.json_path())?));
        }
        let guard = lock_shared(&config.database, config.seed_file.as_deref())?;
        Ok(Backend::Sqlite(guard))
    }

    /// Whether to draw spinners.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        !self.json && !self.quiet && std::io::stderr().is_terminal()
    }
}

/// The store behind a command.
pub enum Backend {
    Sqlite(MutexGuard<'static, SqliteStorage>),
    Json(InMemoryStore),
}

impl Backend {
    pub fn store(&mut self) -> &mut dyn TaskStore {
        match self {
            Self::Sqlite(guard) => &mut **guard,
            Self::Json(store) => store,
        }
    }

    #[must_use]
    pub fn reader(&self) -> &dyn TaskStore {
        match self {
            Self::Sqlite(guard) => &**guard,
            Self::Json(store) => store,
        }
    }

    /// Persist pending changes. `SQLite` writes are already durable.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON file cannot be written.
    pub fn finish(self) -> Result<()> {
        if let Self::Json(mut store) = self {
            if store.is_dirty() {
                store.save()?;
                tracing::debug!(tasks = store.len(), "Saved JSON task store");
            }
        }
        Ok(())
    }
}
