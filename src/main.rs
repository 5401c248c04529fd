//! `td` - task list with spreadsheet backups.
//!
//! Tasks live in a local `SQLite` database (or a JSON file with `--no-db`)
//! and round-trip through .xlsx/.json backup files.

use todolist_rust::cli::{Reported, run};

fn main() {
    if let Err(e) = run() {
        if !e.is::<Reported>() {
            eprintln!("Error: {e}");
        }
        std::process::exit(1);
    }
}
