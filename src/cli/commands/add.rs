use todolist_lib::Task;

use crate::cli::{AddArgs, Context};
use crate::error::Result;
use crate::format::print_json;

/// Execute the add command.
///
/// # Errors
///
/// Returns an error if the title is blank or the store cannot be written.
pub fn execute(args: &AddArgs, ctx: &Context) -> Result<()> {
    let config = ctx.config()?;
    let mut backend = ctx.open_store(&config)?;

    let description = args
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);
    let task = Task::new(args.title.trim(), description);

    let stored = backend.store().insert(&task)?;
    backend.finish()?;
    tracing::info!(id = %stored.id, "Task added");

    if ctx.json {
        print_json(&stored)?;
    } else {
        println!("Created #{}: {}", stored.id, stored.title);
    }
    Ok(())
}
