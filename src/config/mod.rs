//! Configuration management for `td`.
//!
//! Configuration is loaded from YAML files with support for:
//! - User config (`<config_dir>/todolist/config.yaml`)
//! - Workspace config (`.todo/config.yaml`)
//! - Environment variable overrides (`TD_*`)
//!
//! Later layers win. CLI flags are applied on top by the commands.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use todolist_lib::ImportMode;
use todolist_lib::import::DEFAULT_MAX_CELLS;

use crate::error::{Result, TodoError};

pub const WORKSPACE_DIR: &str = ".todo";
pub const DB_FILE: &str = "tasks.db";
pub const JSON_FILE: &str = "tasks.json";
pub const CONFIG_FILE: &str = "config.yaml";
pub const EXPORT_SUBDIR: &str = "exports";

pub const DEFAULT_MAX_IMPORT_MB: u64 = 10;

/// One configuration source. Unset keys fall through to earlier layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub database: Option<PathBuf>,
    pub max_import_mb: Option<u64>,
    pub max_import_cells: Option<usize>,
    pub import_mode: Option<ImportMode>,
    pub export_dir: Option<PathBuf>,
    pub export_json: Option<bool>,
    pub share_dir: Option<PathBuf>,
    pub seed_file: Option<PathBuf>,
}

impl ConfigLayer {
    /// Parse a YAML layer. An empty document is an empty layer.
    ///
    /// # Errors
    ///
    /// Returns `Yaml` if the document is malformed or has unknown keys.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Read a layer from disk; a missing file is an empty layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        tracing::debug!(path = %path.display(), "Loading config layer");
        let text = fs::read_to_string(path)?;
        Self::from_yaml(&text).map_err(|e| {
            TodoError::Config(format!("{}: {e}", path.display()))
        })
    }

    /// Build a layer from `TD_*` variables looked up through `var`.
    ///
    /// # Errors
    ///
    /// Returns `Config` if a numeric or mode variable does not parse.
    pub fn from_env_with(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut layer = Self {
            database: var("TD_DB").map(PathBuf::from),
            export_dir: var("TD_EXPORT_DIR").map(PathBuf::from),
            share_dir: var("TD_SHARE_DIR").map(PathBuf::from),
            ..Self::default()
        };

        if let Some(raw) = var("TD_MAX_IMPORT_MB") {
            let mb = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| TodoError::Config(format!("TD_MAX_IMPORT_MB: not a number: {raw}")))?;
            layer.max_import_mb = Some(mb);
        }
        if let Some(raw) = var("TD_IMPORT_MODE") {
            let mode = raw
                .parse::<ImportMode>()
                .map_err(|e| TodoError::Config(format!("TD_IMPORT_MODE: {e}")))?;
            layer.import_mode = Some(mode);
        }
        Ok(layer)
    }

    /// Overlay `other` on top of `self`.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            database: other.database.or(self.database),
            max_import_mb: other.max_import_mb.or(self.max_import_mb),
            max_import_cells: other.max_import_cells.or(self.max_import_cells),
            import_mode: other.import_mode.or(self.import_mode),
            export_dir: other.export_dir.or(self.export_dir),
            export_json: other.export_json.or(self.export_json),
            share_dir: other.share_dir.or(self.share_dir),
            seed_file: other.seed_file.or(self.seed_file),
        }
    }
}

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database: PathBuf,
    pub max_import_mb: u64,
    pub max_import_cells: usize,
    pub import_mode: ImportMode,
    pub export_dir: PathBuf,
    pub export_json: bool,
    pub share_dir: Option<PathBuf>,
    pub seed_file: Option<PathBuf>,
}

impl Config {
    /// Defaults for a workspace rooted at `workspace` (the `.todo` dir).
    #[must_use]
    pub fn defaults(workspace: &Path) -> Self {
        Self {
            database: workspace.join(DB_FILE),
            max_import_mb: DEFAULT_MAX_IMPORT_MB,
            max_import_cells: DEFAULT_MAX_CELLS,
            import_mode: ImportMode::default(),
            export_dir: workspace.join(EXPORT_SUBDIR),
            export_json: true,
            share_dir: None,
            seed_file: None,
        }
    }

    /// Load all layers for `workspace`.
    ///
    /// # Errors
    ///
    /// Returns an error if any config file or environment override is invalid.
    pub fn load(workspace: &Path) -> Result<Self> {
        let user = user_config_path()
            .map(|p| ConfigLayer::from_file(&p))
            .transpose()?
            .unwrap_or_default();
        let local = ConfigLayer::from_file(&workspace.join(CONFIG_FILE))?;
        let env = ConfigLayer::from_env_with(|k| std::env::var(k).ok())?;

        Ok(Self::defaults(workspace).apply(user.merge(local).merge(env)))
    }

    #[must_use]
    pub fn apply(self, layer: ConfigLayer) -> Self {
        Self {
            database: layer.database.unwrap_or(self.database),
            max_import_mb: layer.max_import_mb.unwrap_or(self.max_import_mb),
            max_import_cells: layer.max_import_cells.unwrap_or(self.max_import_cells),
            import_mode: layer.import_mode.unwrap_or(self.import_mode),
            export_dir: layer.export_dir.unwrap_or(self.export_dir),
            export_json: layer.export_json.unwrap_or(self.export_json),
            share_dir: layer.share_dir.or(self.share_dir),
            seed_file: layer.seed_file.or(self.seed_file),
        }
    }

    #[must_use]
    pub const fn max_import_bytes(&self) -> u64 {
        self.max_import_mb.saturating_mul(1024 * 1024)
    }
}

/// `<config_dir>/todolist/config.yaml`, if the platform has a config dir.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("todolist").join(CONFIG_FILE))
}

/// Template written by `td init`.
pub const CONFIG_TEMPLATE: &str = r"# td workspace configuration
# database: .todo/tasks.db
# max_import_mb: 10
# max_import_cells: 5000000
# import_mode: replace        # or: append
# export_dir: .todo/exports
# export_json: true
# share_dir: ~/Drive/backups
# seed_file: seed.json
";
