use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use todolist_lib::{InMemoryStore, TaskStore};

use crate::cli::{Context, InitArgs};
use crate::config::{CONFIG_FILE, CONFIG_TEMPLATE, Config};
use crate::error::{Result, TodoError};
use crate::format::print_json;
use crate::storage::SqliteStorage;

#[derive(Serialize)]
struct InitOutput<'a> {
    workspace: &'a Path,
    store: &'a Path,
    seeded: usize,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns an error if the directory or store cannot be created, or the
/// workspace already has a store and `--force` was not given.
pub fn execute(args: &InitArgs, ctx: &Context) -> Result<()> {
    let dir = ctx.dir.as_path();
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }

    // Write config.yaml template
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        fs::write(&config_path, CONFIG_TEMPLATE)?;
    }

    // Write .gitignore
    let gitignore_path = dir.join(".gitignore");
    if !gitignore_path.exists() {
        let gitignore = r"# Database
*.db
*.db-shm
*.db-wal

# Backups
exports/
";
        fs::write(gitignore_path, gitignore)?;
    }

    let config = Config::load(dir)?;
    let seed = args.seed.clone().or_else(|| config.seed_file.clone());

    let (store_path, seeded) = if ctx.no_db {
        init_json(ctx, args.force, seed.as_deref())?
    } else {
        init_sqlite(&config, args.force, seed.as_deref())?
    };

    if ctx.json {
        print_json(&InitOutput {
            workspace: dir,
            store: &store_path,
            seeded,
        })?;
    } else {
        println!("Initialized td workspace in {}/", dir.display());
        if seeded > 0 {
            println!("Loaded {seeded} task(s) from seed file");
        }
    }
    Ok(())
}

fn init_sqlite(config: &Config, force: bool, seed: Option<&Path>) -> Result<(PathBuf, usize)> {
    let db_path = config.database.clone();
    if db_path.exists() {
        if !force {
            return Err(TodoError::AlreadyInitialized { path: db_path });
        }
        for suffix in ["", "-wal", "-shm"] {
            let mut name = db_path.clone().into_os_string();
            name.push(suffix);
            match fs::remove_file(&name) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        tracing::info!(path = %db_path.display(), "Removed existing database");
    }

    // Initialize DB (creates file and applies schema)
    let mut storage = SqliteStorage::open(&db_path)?;
    let seeded = match seed {
        Some(seed) => storage.seed_from(seed)?,
        None => 0,
    };
    Ok((db_path, seeded))
}

fn init_json(ctx: &Context, force: bool, seed: Option<&Path>) -> Result<(PathBuf, usize)> {
    let path = ctx.json_path();
    if path.exists() && !force {
        return Err(TodoError::AlreadyInitialized { path });
    }

    let mut store = InMemoryStore::new();
    let seeded = match seed {
        Some(seed) => {
            let tasks = todolist_lib::json::load(seed)?;
            store.insert_all(&tasks)?
        }
        None => 0,
    };
    store.save_to(&path)?;
    Ok((path, seeded))
}
