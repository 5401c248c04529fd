//! Spreadsheet import: workbook rows to task records.
//!
//! Only the first sheet is read. Each row is classified as a header (first
//! cell is a known column label) or data; data rows yield a title from
//! column A and an optional description made of the remaining non-blank
//! cells joined with `" | "`.
//!
//! The importer never touches storage. Whether the records replace or extend
//! the existing ones is the caller's choice (see [`ImportMode`]).

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io::{Read, Seek};
use std::path::Path;
use std::str::FromStr;

use calamine::{
    Data, Reader, Sheets, Xlsx, XlsxError, open_workbook_auto, open_workbook_auto_from_rs,
};
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::error::{Result, TodoError};
use crate::model::Task;

/// First-cell values that mark a header row (compared trimmed, lower-cased).
pub const HEADER_KEYWORDS: [&str; 7] = [
    "title",
    "name",
    "task",
    "item",
    "subject",
    "description",
    "desc",
];

/// Joins the trailing cells of a row into the description.
pub const DESCRIPTION_SEPARATOR: &str = " | ";

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const XLS_MIME: &str = "application/vnd.ms-excel";

/// Default cap on the `rows * columns` extent of the first sheet.
pub const DEFAULT_MAX_CELLS: usize = 5_000_000;

/// How imported records are reconciled with stored ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// Clear storage, then insert.
    #[default]
    Replace,
    /// Insert alongside existing records.
    Append,
}

impl ImportMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Append => "append",
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ImportMode {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "replace" | "replace_all" | "replace-all" => Ok(Self::Replace),
            "append" => Ok(Self::Append),
            other => Err(TodoError::validation(
                "import_mode",
                format!("expected 'replace' or 'append', got '{other}'"),
            )),
        }
    }
}

/// Importer limits.
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    pub max_cells: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            max_cells: DEFAULT_MAX_CELLS,
        }
    }
}

/// MIME type for a spreadsheet path, judged by extension.
#[must_use]
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "xlsx" => Some(XLSX_MIME),
        "xls" => Some(XLS_MIME),
        _ => None,
    }
}

/// Import tasks from a spreadsheet file.
///
/// # Errors
///
/// Returns `InvalidFormat` if the file type is not accepted or the workbook
/// cannot be read, and `TooManyCells` if the first sheet exceeds the cap.
pub fn import_path(path: &Path, options: &ImportOptions) -> Result<Vec<Task>> {
    if mime_for_path(path).is_none() {
        return Err(TodoError::invalid_format(format!(
            "Unsupported file type '{}': expected .xlsx or .xls",
            path.display()
        )));
    }

    let mut workbook = open_workbook_auto(path)
        .map_err(|e| TodoError::invalid_format(format!("Error parsing Excel file: {e}")))?;
    import_workbook(&mut workbook, options)
}

/// Import tasks from an in-memory or otherwise seekable spreadsheet stream.
///
/// # Errors
///
/// Same as [`import_path`].
pub fn import_reader<RS>(reader: RS, options: &ImportOptions) -> Result<Vec<Task>>
where
    RS: Read + Seek + Clone,
{
    let mut workbook = open_workbook_auto_from_rs(reader)
        .map_err(|e| TodoError::invalid_format(format!("Error parsing Excel file: {e}")))?;
    import_workbook(&mut workbook, options)
}

fn import_workbook<RS>(workbook: &mut Sheets<RS>, options: &ImportOptions) -> Result<Vec<Task>>
where
    RS: Read + Seek,
{
    let Some(sheet) = workbook.sheet_names().into_iter().next() else {
        return Err(TodoError::invalid_format("Workbook contains no sheets"));
    };

    let cells = match workbook {
        Sheets::Xlsx(xlsx) => stream_xlsx(xlsx, &sheet, options.max_cells)?,
        other => load_range(other, &sheet, options.max_cells)?,
    };

    let rows = cells.rows();
    let tasks = rows_to_tasks(&rows);
    tracing::debug!(sheet = %sheet, rows = rows.len(), tasks = tasks.len(), "Parsed sheet");
    Ok(tasks)
}

/// Non-empty cells of a sheet by absolute `(row, column)`, and which of
/// them hold a formula.
#[derive(Debug, Default)]
struct SheetCells {
    values: BTreeMap<(u32, u32), Data>,
    formulas: HashSet<(u32, u32)>,
}

impl SheetCells {
    /// Render each non-empty row to text. Column A always comes first (blank
    /// if absent); the remaining non-empty cells follow in column order.
    fn rows(&self) -> Vec<Vec<String>> {
        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut current = None;
        for (&(row, col), data) in &self.values {
            if current != Some(row) {
                current = Some(row);
                rows.push(Vec::new());
            }
            let Some(cells) = rows.last_mut() else {
                continue;
            };
            if cells.is_empty() && col > 0 {
                cells.push(Cell::Absent.to_text());
            }
            let cell = if self.formulas.contains(&(row, col)) {
                Cell::Formula(data)
            } else {
                Cell::Value(data)
            };
            cells.push(cell.to_text());
        }
        rows
    }
}

/// Bounding box of the cells seen so far.
#[derive(Debug, Clone, Copy)]
struct Extent {
    start: (u32, u32),
    end: (u32, u32),
}

impl Extent {
    const fn at(pos: (u32, u32)) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    fn include(&mut self, (row, col): (u32, u32)) {
        self.start = (self.start.0.min(row), self.start.1.min(col));
        self.end = (self.end.0.max(row), self.end.1.max(col));
    }

    /// Cells a dense grid over this box would hold.
    fn cells(self) -> u64 {
        let height = u64::from(self.end.0.saturating_sub(self.start.0)) + 1;
        let width = u64::from(self.end.1.saturating_sub(self.start.1)) + 1;
        height.saturating_mul(width)
    }
}

fn check_cells(cells: u64, limit: usize) -> Result<()> {
    let cells = usize::try_from(cells).unwrap_or(usize::MAX);
    if cells > limit {
        return Err(TodoError::TooManyCells { cells, limit });
    }
    Ok(())
}

/// Read an xlsx sheet cell by cell. The declared dimension is checked
/// before any cell is read and the observed extent after each one, so an
/// oversized or sparse-but-huge sheet is rejected without building a grid.
fn stream_xlsx<RS>(xlsx: &mut Xlsx<RS>, sheet: &str, max_cells: usize) -> Result<SheetCells>
where
    RS: Read + Seek,
{
    let read_err =
        |e: XlsxError| TodoError::invalid_format(format!("Failed to read sheet '{sheet}': {e}"));
    let mut cells = SheetCells::default();

    {
        let mut reader = xlsx.worksheet_cells_reader(sheet).map_err(read_err)?;
        let declared = reader.dimensions();
        check_cells(
            Extent {
                start: declared.start,
                end: declared.end,
            }
            .cells(),
            max_cells,
        )?;

        let mut extent: Option<Extent> = None;
        while let Some(cell) = reader.next_cell().map_err(read_err)? {
            let pos = cell.get_position();
            let data = Data::from(cell.get_value().clone());
            if data == Data::Empty {
                continue;
            }
            let seen = extent.get_or_insert(Extent::at(pos));
            seen.include(pos);
            check_cells(seen.cells(), max_cells)?;
            cells.values.insert(pos, data);
        }
    }

    // Formula positions are optional; without them every cell is a value.
    match xlsx.worksheet_cells_reader(sheet) {
        Ok(mut reader) => loop {
            match reader.next_formula() {
                Ok(Some(formula)) => {
                    if !formula.get_value().is_empty() {
                        cells.formulas.insert(formula.get_position());
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::debug!(sheet, error = %e, "Formula scan stopped; treating rest as values");
                    break;
                }
            }
        },
        Err(e) => {
            tracing::debug!(sheet, error = %e, "No formula data; treating cells as values");
        }
    }
    Ok(cells)
}

/// Read a sheet through the dense range API (xls and other formats, whose
/// grids are bounded by the format itself).
#[allow(clippy::cast_possible_truncation)]
fn load_range<RS>(workbook: &mut Sheets<RS>, sheet: &str, max_cells: usize) -> Result<SheetCells>
where
    RS: Read + Seek,
{
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| TodoError::invalid_format(format!("Failed to read sheet '{sheet}': {e}")))?;
    let (height, width) = range.get_size();
    check_cells((height as u64).saturating_mul(width as u64), max_cells)?;

    let mut cells = SheetCells::default();
    let Some((first_row, first_col)) = range.start() else {
        return Ok(cells);
    };
    for (row, col, data) in range.used_cells() {
        let pos = (first_row + row as u32, first_col + col as u32);
        cells.values.insert(pos, data.clone());
    }

    match workbook.worksheet_formula(sheet) {
        Ok(formulas) => {
            if let Some((f_row, f_col)) = formulas.start() {
                for (row, col, formula) in formulas.used_cells() {
                    if !formula.is_empty() {
                        cells
                            .formulas
                            .insert((f_row + row as u32, f_col + col as u32));
                    }
                }
            }
        }
        Err(e) => {
            tracing::debug!(sheet, error = %e, "No formula data; treating cells as values");
        }
    }
    Ok(cells)
}

/// Convert already-coerced rows to tasks, in row order.
pub fn rows_to_tasks<R: AsRef<[String]>>(rows: &[R]) -> Vec<Task> {
    let mut tasks = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        let cells = row.as_ref();
        if cells.is_empty() {
            continue;
        }
        if is_header_row(cells) {
            tracing::debug!(row = index, value = %cells[0].trim(), "Skipping header row");
            continue;
        }
        if let Some(task) = task_from_cells(cells) {
            tasks.push(task);
        }
    }
    tasks
}

/// True if the row's first cell is a header keyword.
#[must_use]
pub fn is_header_row(cells: &[String]) -> bool {
    cells.first().is_some_and(|first| is_header_keyword(first))
}

#[must_use]
pub fn is_header_keyword(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    HEADER_KEYWORDS.contains(&value.as_str())
}

/// Build a task from one data row.
///
/// The title is column A; a blank title drops the row even when later cells
/// have content. The description is `None` unless another cell is non-blank.
#[must_use]
pub fn task_from_cells(cells: &[String]) -> Option<Task> {
    let (first, rest) = cells.split_first()?;
    let title = first.trim();
    if title.is_empty() {
        return None;
    }

    let extra: Vec<&str> = rest
        .iter()
        .map(|cell| cell.trim())
        .filter(|cell| !cell.is_empty())
        .collect();
    let description = if extra.is_empty() {
        None
    } else {
        Some(extra.join(DESCRIPTION_SEPARATOR))
    };

    Some(Task::new(title, description))
}
