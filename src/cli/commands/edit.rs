use todolist_lib::TaskUpdate;

use crate::cli::{Context, EditArgs};
use crate::error::{Result, TodoError};
use crate::format::print_json;

/// Execute the edit command.
///
/// # Errors
///
/// Returns an error if nothing would change, the task is not found, or the
/// new title is blank.
pub fn execute(args: &EditArgs, ctx: &Context) -> Result<()> {
    let update = TaskUpdate {
        title: args.title.clone(),
        description: if args.clear_description {
            Some(None)
        } else {
            args.description.clone().map(Some)
        },
    };
    if update.is_empty() {
        return Err(TodoError::validation(
            "edit",
            "nothing to change; pass --title, --description or --clear-description",
        ));
    }

    let config = ctx.config()?;
    let mut backend = ctx.open_store(&config)?;
    let current = backend.reader().get_by_id(args.id)?;
    let edited = update.apply(&current)?;
    backend.store().update(&edited)?;
    backend.finish()?;
    tracing::info!(id = %edited.id, "Task updated");

    if ctx.json {
        print_json(&edited)?;
    } else {
        println!("Updated #{}: {}", edited.id, edited.title);
    }
    Ok(())
}
