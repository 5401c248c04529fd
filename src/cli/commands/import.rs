//! Import command: spreadsheet -> storage, reported as a dialog.

use todolist_lib::ImportMode;

use crate::cli::{Context, ImportArgs, show_dialog};
use crate::error::{Dialog, Result};
use crate::format::print_json;
use crate::sync::{ImportGate, ImportOutcome, ImportSettings, run_import};

static IMPORT_GATE: ImportGate = ImportGate::new();

/// Execute the import command.
///
/// # Errors
///
/// Returns the size, format, or storage error; the caller turns it into a
/// dialog.
pub fn execute(args: &ImportArgs, ctx: &Context) -> Result<()> {
    let config = ctx.config()?;
    let settings = ImportSettings {
        mode: args.mode().unwrap_or(config.import_mode),
        max_bytes: config.max_import_bytes(),
        max_cells: config.max_import_cells,
        progress: ctx.show_progress(),
    };

    let mut backend = ctx.open_store(&config)?;
    let outcome = run_import(&IMPORT_GATE, backend.store(), &args.file, &settings)?;
    backend.finish()?;

    match outcome {
        ImportOutcome::NoValidData => show_dialog(ctx, &Dialog::no_valid_data()),
        ImportOutcome::Imported { count, mode } => {
            if ctx.json {
                print_json(&outcome)
            } else {
                let dialog = success_dialog(count, mode);
                println!("{}\n{}", dialog.title, dialog.message);
                Ok(())
            }
        }
    }
}

fn success_dialog(count: usize, mode: ImportMode) -> Dialog {
    let message = match mode {
        ImportMode::Replace => {
            format!("Successfully imported {count} records. All previous data has been replaced.")
        }
        ImportMode::Append => {
            format!("Successfully imported {count} records. Existing data was kept.")
        }
    };
    Dialog::new("Import Successful", message)
}
