//! `todolist-lib` - task records and their spreadsheet/JSON exchange.
//!
//! Storage-agnostic core of the `td` tool: the task model, the spreadsheet
//! importer and exporter, JSON backups, search filtering, and the
//! `TaskStore` trait with an in-memory implementation.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use todolist_lib::{ImportOptions, InMemoryStore, TaskStore};
//! use todolist_lib::import::import_path;
//!
//! let mut store = InMemoryStore::open("tasks.json").unwrap();
//!
//! // Replace everything with the rows of a spreadsheet
//! let tasks = import_path(Path::new("backup.xlsx"), &ImportOptions::default()).unwrap();
//! store.replace_all(&tasks).unwrap();
//!
//! store.save().unwrap();
//! ```

pub mod cell;
pub mod error;
pub mod export;
pub mod import;
pub mod json;
pub mod model;
pub mod query;
pub mod store;
pub mod view;
pub mod watch;

pub use error::{Result, TodoError};
pub use export::{ExportBundle, ExportOptions, ExportOutcome};
pub use import::{ImportMode, ImportOptions};
pub use model::{Task, TaskId, TaskRecord};
pub use query::{TaskUpdate, filter_tasks};
pub use store::{InMemoryStore, TaskStore};
pub use view::{Binding, TaskListView};
pub use watch::{Subscription, WatchedStore};
