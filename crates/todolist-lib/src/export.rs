//! Spreadsheet and JSON export of task records.
//!
//! Records are written in the order given (storage order, newest first);
//! nothing is re-sorted. Output names embed the caller's timestamp.

use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook};

use crate::error::Result;
use crate::json;
use crate::model::Task;

pub const SHEET_NAME: &str = "Medical Data";
pub const FILE_STEM: &str = "medical_data_backup";
pub const HEADER: [&str; 2] = ["Title", "Description"];

// Character units (6000 and 15000 in 1/256ths).
const TITLE_COLUMN_WIDTH: f64 = 23.44;
const DESCRIPTION_COLUMN_WIDTH: f64 = 58.59;

/// Where and what to write.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub dir: PathBuf,
    pub include_json: bool,
}

/// Files produced by one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBundle {
    pub files: Vec<PathBuf>,
    pub task_count: usize,
}

impl ExportBundle {
    /// Delete the produced files, ignoring ones already gone.
    pub fn discard(&self) {
        for file in &self.files {
            if let Err(e) = fs::remove_file(file) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %file.display(), error = %e, "Failed to remove export file");
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The task list was empty; no files were written.
    NothingToExport,
    Written(ExportBundle),
}

/// `medical_data_backup_<timestamp>.<ext>`
#[must_use]
pub fn backup_file_name(timestamp: i64, ext: &str) -> String {
    format!("{FILE_STEM}_{timestamp}.{ext}")
}

/// Export tasks to a spreadsheet and, optionally, a JSON file.
///
/// # Errors
///
/// Returns `Io` if the output directory cannot be created, `Export` if the
/// workbook cannot be written, or `Json` for JSON failures. Files written
/// before the failure are removed.
pub fn export_tasks(tasks: &[Task], timestamp: i64, options: &ExportOptions) -> Result<ExportOutcome> {
    if tasks.is_empty() {
        tracing::debug!("Nothing to export");
        return Ok(ExportOutcome::NothingToExport);
    }

    fs::create_dir_all(&options.dir)?;

    let mut bundle = ExportBundle {
        files: Vec::new(),
        task_count: tasks.len(),
    };

    let xlsx_path = options.dir.join(backup_file_name(timestamp, "xlsx"));
    write_workbook(tasks, &xlsx_path)?;
    bundle.files.push(xlsx_path);

    if options.include_json {
        let json_path = options.dir.join(backup_file_name(timestamp, "json"));
        if let Err(e) = json::save(&json_path, tasks) {
            bundle.discard();
            return Err(e);
        }
        bundle.files.push(json_path);
    }

    tracing::info!(tasks = tasks.len(), files = bundle.files.len(), "Export written");
    Ok(ExportOutcome::Written(bundle))
}

/// Write the two-column spreadsheet: bold header, then one row per task.
///
/// # Errors
///
/// Returns `Export` if the workbook cannot be built or saved.
#[allow(clippy::cast_possible_truncation)]
pub fn write_workbook(tasks: &[Task], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    for (col, label) in HEADER.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *label, &header_format)?;
    }

    for (index, task) in tasks.iter().enumerate() {
        let row = index as u32 + 1;
        sheet.write_string(row, 0, task.title.as_str())?;
        sheet.write_string(row, 1, task.description.as_deref().unwrap_or(""))?;
    }

    sheet.set_column_width(0, TITLE_COLUMN_WIDTH)?;
    sheet.set_column_width(1, DESCRIPTION_COLUMN_WIDTH)?;

    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{ImportOptions, import_path};
    use crate::model::TaskId;
    use calamine::{Data, Reader, open_workbook_auto};
    use proptest::prelude::*;

    fn stored(id: i64, title: &str, description: Option<&str>) -> Task {
        Task::new(title, description.map(str::to_string)).with_id(TaskId(id))
    }

    fn options(dir: &Path, include_json: bool) -> ExportOptions {
        ExportOptions {
            dir: dir.to_path_buf(),
            include_json,
        }
    }

    fn sheet_strings(path: &Path) -> (String, Vec<Vec<String>>) {
        let mut workbook = open_workbook_auto(path).unwrap();
        let name = workbook.sheet_names()[0].clone();
        let range = workbook.worksheet_range(&name).unwrap();
        let rows = range
            .rows()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Data::String(s) => s.clone(),
                        _ => String::new(),
                    })
                    .collect()
            })
            .collect();
        (name, rows)
    }

    #[test]
    fn test_empty_list_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = export_tasks(&[], 1, &options(dir.path(), true)).unwrap();
        assert_eq!(outcome, ExportOutcome::NothingToExport);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_rows_follow_storage_order() {
        let dir = tempfile::tempdir().unwrap();
        // Storage order: newest first.
        let tasks = vec![
            stored(2, "Take aspirin", Some("Daily")),
            stored(1, "Blood test", None),
        ];

        let outcome = export_tasks(&tasks, 1_700_000_000_000, &options(dir.path(), false)).unwrap();
        let ExportOutcome::Written(bundle) = outcome else {
            panic!("expected files");
        };
        assert_eq!(bundle.task_count, 2);
        assert_eq!(
            bundle.files,
            vec![dir.path().join("medical_data_backup_1700000000000.xlsx")]
        );

        let (name, rows) = sheet_strings(&bundle.files[0]);
        assert_eq!(name, SHEET_NAME);
        assert_eq!(
            rows,
            vec![
                vec!["Title".to_string(), "Description".to_string()],
                vec!["Take aspirin".to_string(), "Daily".to_string()],
                vec!["Blood test".to_string(), String::new()],
            ]
        );
    }

    fn zip_entry(path: &Path, name: &str) -> String {
        use std::io::Read;
        let mut archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
        let mut xml = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut xml).unwrap();
        xml
    }

    #[test]
    fn test_header_bold_and_column_widths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("styled.xlsx");
        write_workbook(&[stored(1, "Blood test", None)], &path).unwrap();

        let sheet = zip_entry(&path, "xl/worksheets/sheet1.xml");
        // Widths are stored with Calibri 11 padding: 23.44 -> 24.140625, 58.59 -> 59.28515625.
        assert!(sheet.contains(r#"<col min="1" max="1" width="24.140625" customWidth="1"/>"#));
        assert!(sheet.contains(r#"<col min="2" max="2" width="59.28515625" customWidth="1"/>"#));
        assert!(sheet.contains(r#"<c r="A1" s="1" t="s">"#));
        assert!(sheet.contains(r#"<c r="B1" s="1" t="s">"#));
        assert!(sheet.contains(r#"<c r="A2" t="s">"#));

        let styles = zip_entry(&path, "xl/styles.xml");
        assert!(styles.contains("<b/>"));
    }

    #[test]
    fn test_json_written_alongside() {
        let dir = tempfile::tempdir().unwrap();
        let tasks = vec![stored(5, "Checkup", Some("<p>Bring ID</p>"))];

        let ExportOutcome::Written(bundle) = export_tasks(&tasks, 42, &options(dir.path(), true)).unwrap()
        else {
            panic!("expected files");
        };
        assert_eq!(bundle.files.len(), 2);
        assert!(bundle.files[1].ends_with("medical_data_backup_42.json"));

        let raw = fs::read_to_string(&bundle.files[1]).unwrap();
        assert!(!raw.contains("\"id\""));
        let loaded = json::load(&bundle.files[1]).unwrap();
        assert_eq!(loaded[0].description.as_deref(), Some("<p>Bring ID</p>"));
    }

    #[test]
    fn test_discard_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        let tasks = vec![stored(1, "One", None)];
        let ExportOutcome::Written(bundle) = export_tasks(&tasks, 7, &options(dir.path(), true)).unwrap()
        else {
            panic!("expected files");
        };

        bundle.discard();
        assert!(bundle.files.iter().all(|f| !f.exists()));
        bundle.discard();
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_export_then_import_roundtrips(
            entries in prop::collection::vec(
                ("[A-Za-z][A-Za-z0-9 ]{0,15}[A-Za-z0-9]", "<p>[A-Za-z0-9 |]{1,20}</p>"),
                1..6,
            ),
        ) {
            let tasks: Vec<Task> = entries
                .iter()
                .enumerate()
                .map(|(i, (title, desc))| stored(i as i64 + 1, title, Some(desc)))
                .collect();
            prop_assume!(tasks.iter().all(|t| !crate::import::is_header_keyword(&t.title)));

            let dir = tempfile::tempdir().unwrap();
            let ExportOutcome::Written(bundle) =
                export_tasks(&tasks, 1, &options(dir.path(), false)).unwrap()
            else {
                panic!("expected files");
            };

            let imported = import_path(&bundle.files[0], &ImportOptions::default()).unwrap();
            prop_assert_eq!(imported.len(), tasks.len());
            for (original, back) in tasks.iter().zip(&imported) {
                prop_assert_eq!(&back.title, &original.title);
                prop_assert_eq!(&back.description, &original.description);
            }
        }
    }
}
