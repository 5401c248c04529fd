//! Storage -> spreadsheet (+ JSON) -> share target.
//!
//! There is no in-flight guard here: two overlapping exports each write
//! their own timestamped files.

use std::path::PathBuf;

use serde::Serialize;
use todolist_lib::export::export_tasks;
use todolist_lib::{ExportOptions, ExportOutcome, TaskStore};

use super::spinner;
use crate::error::Result;
use crate::share::{ShareRequest, ShareTarget, share_with_fallback};

#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub dir: PathBuf,
    pub include_json: bool,
    pub progress: bool,
}

/// Where exported files go after they are written.
#[derive(Clone, Copy)]
pub struct Sharing<'a> {
    pub primary: &'a dyn ShareTarget,
    pub fallback: &'a dyn ShareTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExportReport {
    NothingToExport,
    Exported {
        files: Vec<PathBuf>,
        uris: Vec<String>,
        task_count: usize,
        shared_via: Option<String>,
    },
}

/// Export every stored task, then hand the files to `sharing` if given.
///
/// If sharing fails the files just written are removed.
///
/// # Errors
///
/// Returns the storage, write, or share error.
pub fn run_export<S: TaskStore + ?Sized>(
    store: &S,
    settings: &ExportSettings,
    timestamp: i64,
    sharing: Option<Sharing<'_>>,
) -> Result<ExportReport> {
    let tasks = store.get_all()?;

    let pb = spinner(settings.progress, "Exporting tasks...");
    let written = export_tasks(
        &tasks,
        timestamp,
        &ExportOptions {
            dir: settings.dir.clone(),
            include_json: settings.include_json,
        },
    );
    pb.finish_and_clear();

    let bundle = match written? {
        ExportOutcome::NothingToExport => return Ok(ExportReport::NothingToExport),
        ExportOutcome::Written(bundle) => bundle,
    };

    let request = match ShareRequest::new(&bundle.files, bundle.task_count) {
        Ok(request) => request,
        Err(e) => {
            bundle.discard();
            return Err(e);
        }
    };

    let shared_via = match sharing {
        None => None,
        Some(Sharing { primary, fallback }) => {
            match share_with_fallback(primary, fallback, &request) {
                Ok(name) => Some(name.to_string()),
                Err(e) => {
                    tracing::error!(error = %e, "Sharing failed, removing export files");
                    bundle.discard();
                    return Err(e);
                }
            }
        }
    };

    Ok(ExportReport::Exported {
        files: request.files,
        uris: request.uris,
        task_count: bundle.task_count,
        shared_via,
    })
}
