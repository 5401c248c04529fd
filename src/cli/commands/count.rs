use crate::cli::Context;
use crate::error::Result;
use crate::format::{Count, print_json};

/// Execute the count command.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn execute(ctx: &Context) -> Result<()> {
    let config = ctx.config()?;
    let backend = ctx.open_store(&config)?;
    let count = backend.reader().count()?;

    if ctx.json {
        print_json(&Count { count })?;
    } else {
        println!("{count}");
    }
    Ok(())
}
