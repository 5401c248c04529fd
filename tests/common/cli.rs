//! Helpers for running the `td` binary inside a throwaway workspace.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use assert_cmd::Command;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

/// A temp directory acting as the project root, with its own config home.
pub struct TdWorkspace {
    _temp: TempDir,
    pub root: PathBuf,
    pub config_home: PathBuf,
}

impl TdWorkspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create temp dir");
        let root = temp.path().join("project");
        let config_home = temp.path().join("config");
        std::fs::create_dir_all(&root).expect("create project dir");
        std::fs::create_dir_all(&config_home).expect("create config dir");
        Self {
            _temp: temp,
            root,
            config_home,
        }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Write a spreadsheet whose rows are given as strings; "" leaves a cell empty.
    pub fn write_sheet(&self, name: &str, rows: &[&[&str]]) -> PathBuf {
        let path = self.path(name);
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    sheet
                        .write_string(
                            u32::try_from(r).expect("row"),
                            u16::try_from(c).expect("col"),
                            *value,
                        )
                        .expect("write cell");
                }
            }
        }
        workbook.save(&path).expect("save workbook");
        path
    }
}

pub struct TdOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl TdOutput {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}):\n{}", self.stdout))
    }
}

/// Run `td` in the workspace root with a clean environment.
pub fn run_td<I, S>(workspace: &TdWorkspace, args: I, label: &str) -> TdOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_td_with_env(workspace, args, &[], label)
}

pub fn run_td_with_env<I, S>(
    workspace: &TdWorkspace,
    args: I,
    env: &[(&str, &str)],
    label: &str,
) -> TdOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::cargo_bin("td").expect("td binary");
    cmd.current_dir(&workspace.root)
        .env("XDG_CONFIG_HOME", &workspace.config_home)
        .env("HOME", &workspace.config_home)
        .env_remove("RUST_LOG");
    for var in [
        "TD_DB",
        "TD_MAX_IMPORT_MB",
        "TD_IMPORT_MODE",
        "TD_EXPORT_DIR",
        "TD_SHARE_DIR",
    ] {
        cmd.env_remove(var);
    }
    for (key, value) in env {
        cmd.env(key, value);
    }
    cmd.args(args);

    let output = cmd.output().expect("run td");
    let result = TdOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    if !result.status.success() {
        eprintln!("[{label}] td exited with {}:\n{}", result.status, result.stderr);
    }
    result
}

/// All string cells of the first sheet of a workbook.
pub fn sheet_rows(path: &Path) -> (String, Vec<Vec<String>>) {
    use calamine::{Data, Reader, open_workbook_auto};

    let mut workbook = open_workbook_auto(path).expect("open workbook");
    let name = workbook.sheet_names()[0].clone();
    let range = workbook.worksheet_range(&name).expect("read sheet");
    let rows = range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::String(s) => s.clone(),
                    Data::Empty => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect();
    (name, rows)
}
