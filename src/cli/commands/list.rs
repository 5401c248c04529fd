//! List command implementation.
//!
//! Title-sorted list with case-insensitive search, and `TaskList` JSON
//! output.

use todolist_lib::filter_tasks;

use crate::cli::{Context, ListArgs};
use crate::error::Result;
use crate::format::{TaskList, TaskSummary, format_task_line, print_json};

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or read.
pub fn execute(args: &ListArgs, ctx: &Context) -> Result<()> {
    let config = ctx.config()?;
    let backend = ctx.open_store(&config)?;

    let all = backend.reader().get_all()?;
    let query = args.query.as_deref().unwrap_or("");
    let shown = filter_tasks(&all, query);
    tracing::debug!(total = all.len(), shown = shown.len(), query, "Listed tasks");

    if ctx.json {
        let output = TaskList {
            query: args.query.clone(),
            total: all.len(),
            shown: shown.len(),
            tasks: shown.into_iter().map(TaskSummary::from).collect(),
        };
        print_json(&output)?;
    } else if all.is_empty() {
        println!("No tasks yet. Add one with 'td add' or 'td import'.");
    } else if shown.is_empty() {
        println!("No tasks match '{}'.", query.trim());
    } else {
        for task in &shown {
            println!("{}", format_task_line(task));
        }
        println!("\n{} of {} task(s)", shown.len(), all.len());
    }

    Ok(())
}
