//! Show command implementation.

use crate::cli::{Context, ShowArgs};
use crate::error::Result;
use crate::format::{html_to_plain, print_json};

/// Wrap width for descriptions.
const WRAP_WIDTH: usize = 80;

/// Execute the show command.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the task is not found.
pub fn execute(args: &ShowArgs, ctx: &Context) -> Result<()> {
    let config = ctx.config()?;
    let backend = ctx.open_store(&config)?;
    let task = backend.reader().get_by_id(args.id)?;

    if ctx.json {
        print_json(&task)?;
        return Ok(());
    }

    println!("#{} {}", task.id, task.title);
    if let Some(desc) = &task.description {
        let body = if args.raw {
            desc.clone()
        } else {
            html_to_plain(desc, WRAP_WIDTH)
        };
        if !body.is_empty() {
            println!("\n{body}");
        }
    }
    Ok(())
}
