//! Output formatting for `td`.
//!
//! Supports both human-readable text output and machine-parseable JSON.
//! With `--json`, stdout carries only JSON; diagnostics go to stderr.
//!
//! # JSON Output Types
//!
//! - [`TaskSummary`] - Task with a plain-text description preview (list)
//! - [`TaskList`] - Filtered list with totals (list)
//! - [`DialogOutput`] - Import/export failure dialog
//! - [`Count`] - Task count

mod output;
mod text;

pub use output::{Count, DialogOutput, TaskList, TaskSummary};
pub use text::{format_task_line, html_to_plain, html_to_text, pad, truncate};

use serde::Serialize;

use crate::error::Result;

/// Print `value` as pretty JSON on stdout.
///
/// # Errors
///
/// Returns `Json` if serialization fails.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
