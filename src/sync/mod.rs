//! Spreadsheet import/export sessions for `td`.
//!
//! This module handles:
//! - Import: spreadsheet -> storage (size precheck, replace/append)
//! - Export: storage -> spreadsheet + JSON -> share target
//! - The in-flight guard that keeps imports from overlapping
//! - The progress spinner shown while work runs

pub mod export;
pub mod import;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{CoreError, Result};

pub use export::{ExportReport, ExportSettings, run_export};
pub use import::{ImportOutcome, ImportSettings, run_import};

/// Rejects a second import while one is running.
#[derive(Debug, Default)]
pub struct ImportGate {
    busy: AtomicBool,
}

impl ImportGate {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
        }
    }

    /// Claim the gate. It is released when the ticket drops, on every path.
    ///
    /// # Errors
    ///
    /// Returns `ImportInProgress` if a ticket is outstanding.
    pub fn try_acquire(&self) -> Result<ImportTicket<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("Import already in progress, ignoring request");
            return Err(CoreError::ImportInProgress.into());
        }
        Ok(ImportTicket { gate: self })
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Held for the duration of one import.
#[derive(Debug)]
pub struct ImportTicket<'a> {
    gate: &'a ImportGate,
}

impl Drop for ImportTicket<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}

/// Spinner for a blocking step; hidden when `visible` is false.
pub(crate) fn spinner(visible: bool, message: &'static str) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TodoError;

    #[test]
    fn test_gate_rejects_overlap() {
        let gate = ImportGate::new();
        let ticket = gate.try_acquire().unwrap();
        assert!(gate.is_busy());
        assert!(matches!(
            gate.try_acquire(),
            Err(TodoError::Core(CoreError::ImportInProgress))
        ));
        drop(ticket);
        assert!(!gate.is_busy());
        assert!(gate.try_acquire().is_ok());
    }

    #[test]
    fn test_gate_released_on_error_path() {
        fn failing(gate: &ImportGate) -> Result<()> {
            let _ticket = gate.try_acquire()?;
            Err(TodoError::Config("boom".to_string()))
        }

        let gate = ImportGate::new();
        assert!(failing(&gate).is_err());
        assert!(!gate.is_busy());
    }
}
