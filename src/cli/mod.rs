//! Command-line interface for `td`.
//!
//! This module provides the CLI parsing and command routing using clap.

pub mod commands;
mod context;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use todolist_lib::{ImportMode, TaskId};

use crate::error::{Action, Dialog, TodoError};
use crate::format::{DialogOutput, print_json};
use crate::logging;

pub use context::{Backend, Context};

/// `td` - task list with spreadsheet backup import/export.
#[derive(Parser, Debug)]
#[command(name = "td")]
#[command(
    author,
    version,
    about = "Task list with spreadsheet backups (SQLite + xlsx/JSON)",
    long_about = None,
    after_help = "Workspace data lives in ./.todo (tasks.db, config.yaml)."
)]
pub struct Cli {
    /// Output format: text (default) or json
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Operate without `SQLite` (tasks kept in .todo/tasks.json)
    #[arg(long, global = true)]
    pub no_db: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a td workspace
    Init(InitArgs),

    /// Add a task
    Add(AddArgs),

    /// List tasks sorted by title, optionally filtered
    List(ListArgs),

    /// Show task details
    Show(ShowArgs),

    /// Change a task's title or description
    Edit(EditArgs),

    /// Count tasks
    Count,

    /// Import tasks from an .xlsx/.xls spreadsheet
    Import(ImportArgs),

    /// Export tasks to a spreadsheet (and JSON) backup
    Export(ExportArgs),

    /// Interactive list with live search
    Browse,

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Recreate the database even if one exists
    #[arg(long)]
    pub force: bool,

    /// JSON backup to pre-populate the new database with
    #[arg(long, value_name = "FILE")]
    pub seed: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Task title
    pub title: String,

    /// Description (HTML or plain text)
    #[arg(short, long)]
    pub description: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Case-insensitive title filter
    pub query: Option<String>,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Task ID (e.g. 7 or #7)
    pub id: TaskId,

    /// Print the description as stored, without stripping markup
    #[arg(long)]
    pub raw: bool,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Task ID (e.g. 7 or #7)
    pub id: TaskId,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New description
    #[arg(long, conflicts_with = "clear_description")]
    pub description: Option<String>,

    /// Remove the description
    #[arg(long)]
    pub clear_description: bool,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Spreadsheet to import (.xlsx or .xls)
    pub file: PathBuf,

    /// Keep existing tasks and add the imported ones
    #[arg(long, conflicts_with = "replace")]
    pub append: bool,

    /// Delete all existing tasks first (default unless configured)
    #[arg(long)]
    pub replace: bool,
}

impl ImportArgs {
    /// Mode chosen on the command line, if any.
    #[must_use]
    pub const fn mode(&self) -> Option<ImportMode> {
        if self.append {
            Some(ImportMode::Append)
        } else if self.replace {
            Some(ImportMode::Replace)
        } else {
            None
        }
    }
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Directory to write backup files into
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Write only the spreadsheet
    #[arg(long)]
    pub no_json: bool,

    /// Copy the backup into this (synced) folder
    #[arg(long, value_name = "DIR")]
    pub share_to: Option<PathBuf>,
}

/// Marker for failures already shown to the user as a dialog.
#[derive(Debug)]
pub struct Reported;

impl std::fmt::Display for Reported {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("error already reported")
    }
}

impl std::error::Error for Reported {}

/// Run the CLI.
///
/// # Errors
///
/// Returns an error if the command fails to execute. Import and export
/// failures are printed as dialogs first and surface as [`Reported`].
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet, None)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    let ctx = Context::from_cli(&cli);
    let Some(command) = cli.command else {
        println!("td - task list with spreadsheet backups. Use --help for usage.");
        return Ok(());
    };
    tracing::debug!(command = command.name(), no_db = ctx.no_db, "Dispatching");

    match command {
        Commands::Init(args) => commands::init::execute(&args, &ctx)?,
        Commands::Add(args) => commands::add::execute(&args, &ctx)?,
        Commands::List(args) => commands::list::execute(&args, &ctx)?,
        Commands::Show(args) => commands::show::execute(&args, &ctx)?,
        Commands::Edit(args) => commands::edit::execute(&args, &ctx)?,
        Commands::Count => commands::count::execute(&ctx)?,
        Commands::Import(args) => {
            with_dialog(Action::Import, &ctx, commands::import::execute(&args, &ctx))?;
        }
        Commands::Export(args) => {
            with_dialog(Action::Export, &ctx, commands::export::execute(&args, &ctx))?;
        }
        Commands::Browse => commands::browse::execute(&ctx)?,
        Commands::Completions { shell } => commands::completions::execute(shell),
    }

    Ok(())
}

/// Show a failed import/export as its dialog instead of a bare error.
fn with_dialog(action: Action, ctx: &Context, result: crate::Result<()>) -> Result<()> {
    let Err(err) = result else {
        return Ok(());
    };
    tracing::error!(error = %err, ?action, "Command failed");
    let dialog = Dialog::for_error(action, &err);
    show_dialog(ctx, &dialog).map_err(anyhow::Error::from)?;
    Err(Reported.into())
}

/// Print a dialog: JSON on stdout with `--json`, text on stderr otherwise.
pub(crate) fn show_dialog(ctx: &Context, dialog: &Dialog) -> Result<(), TodoError> {
    if ctx.json {
        print_json(&DialogOutput::from(dialog))
    } else {
        eprintln!("{}\n{}", dialog.title, dialog.message);
        Ok(())
    }
}

impl Commands {
    const fn name(&self) -> &'static str {
        match self {
            Self::Init(_) => "init",
            Self::Add(_) => "add",
            Self::List(_) => "list",
            Self::Show(_) => "show",
            Self::Edit(_) => "edit",
            Self::Count => "count",
            Self::Import(_) => "import",
            Self::Export(_) => "export",
            Self::Browse => "browse",
            Self::Completions { .. } => "completions",
        }
    }
}
