//! `todolist_rust` - task list with spreadsheet backup import/export
//!
//! This crate provides the `td` CLI tool on top of `todolist-lib`, which
//! holds the task model and the spreadsheet/JSON reconciliation logic.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`cli`] - Command-line interface using clap
//! - [`storage`] - `SQLite` task store and the shared database instance
//! - [`sync`] - Import/export sessions (in-flight guard, progress, sharing)
//! - [`share`] - Share targets for exported backup files
//! - [`config`] - Layered YAML configuration
//! - [`error`] - Error types and user-facing dialogs
//! - [`format`] - Output formatting (text, JSON)
//! - [`logging`] - `tracing` subscriber setup

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod share;
pub mod storage;
pub mod sync;

pub use error::{Result, TodoError};
