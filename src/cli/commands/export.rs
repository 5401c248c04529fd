//! Export command: storage -> backup files -> share target.

use std::io;

use chrono::Utc;

use crate::cli::{Context, ExportArgs};
use crate::error::Result;
use crate::format::print_json;
use crate::share::{ChooserShare, FolderShare, ShareTarget};
use crate::sync::export::Sharing;
use crate::sync::{ExportReport, ExportSettings, run_export};

/// Execute the export command.
///
/// # Errors
///
/// Returns the storage, write, or share error; the caller turns it into a
/// dialog.
pub fn execute(args: &ExportArgs, ctx: &Context) -> Result<()> {
    let config = ctx.config()?;
    let settings = ExportSettings {
        dir: args.out.clone().unwrap_or_else(|| config.export_dir.clone()),
        include_json: !args.no_json && config.export_json,
        progress: ctx.show_progress(),
    };
    let share_dir = args.share_to.clone().or_else(|| config.share_dir.clone());

    let folder = share_dir.map(FolderShare::new);
    // With --json, stdout is reserved for the report.
    let chooser: Box<dyn ShareTarget> = if ctx.json {
        Box::new(ChooserShare::new(io::stderr()))
    } else {
        Box::new(ChooserShare::stdout())
    };
    let sharing = Sharing {
        primary: folder.as_ref().map_or(chooser.as_ref(), |f| f as &dyn ShareTarget),
        fallback: chooser.as_ref(),
    };

    let backend = ctx.open_store(&config)?;
    let timestamp = Utc::now().timestamp_millis();
    let report = run_export(backend.reader(), &settings, timestamp, Some(sharing))?;

    if ctx.json {
        return print_json(&report);
    }

    match &report {
        ExportReport::NothingToExport => println!("No data to export"),
        ExportReport::Exported {
            files,
            task_count,
            shared_via,
            ..
        } => {
            println!("Exported {task_count} record(s):");
            for file in files {
                println!("  {}", file.display());
            }
            if let (Some(via), Some(folder)) = (shared_via, &folder) {
                if via == folder.name() {
                    println!("Copied to {}", folder.dest.display());
                }
            }
        }
    }
    Ok(())
}
