//! Reading the `Rename Index` sheet back with calamine

use calamine::{Data, Reader, open_workbook_auto};
use std::path::Path;
use tracing::{debug, info, trace};

use super::{COL_CURRENT, COL_NEW, COL_NOTES, COL_PREFIX, RENAME_SHEET, TemplateRow, is_workbook_path};
use crate::error::{RenamerResult, TemplateError, TemplateResult};
use crate::paths::check_workbook_available;

/// Read every data row of the `Rename Index` sheet.
///
/// The workbook is opened fresh on each call and closed before returning, so
/// the user can keep editing it in Excel between a preview and an apply.
pub fn read_rename_index(path: &Path) -> RenamerResult<Vec<TemplateRow>> {
	check_workbook_available(path)?;
	let rows = read_rows(path)?;
	info!("Template: {} rows from {}", rows.len(), path.display());
	Ok(rows)
}

/// Whether `path` opens as a workbook with a `Rename Index` sheet
pub fn has_rename_sheet(path: &Path) -> bool {
	if !is_workbook_path(path) {
		return false;
	}
	match open_workbook_auto(path) {
		Ok(workbook) => workbook.sheet_names().iter().any(|s| s == RENAME_SHEET),
		Err(e) => {
			trace!("Not a readable workbook {}: {}", path.display(), e);
			false
		}
	}
}

fn read_rows(path: &Path) -> TemplateResult<Vec<TemplateRow>> {
	if !is_workbook_path(path) {
		return Err(TemplateError::UnsupportedFormat {
			path: path.to_path_buf(),
		});
	}

	let range = {
		let mut workbook = open_workbook_auto(path)?;
		if !workbook.sheet_names().iter().any(|s| s == RENAME_SHEET) {
			return Err(TemplateError::MissingSheet {
				path: path.to_path_buf(),
				sheet: RENAME_SHEET.to_string(),
			});
		}
		workbook.worksheet_range(RENAME_SHEET)?
	};

	let mut lines = range.rows();
	let Some(header) = lines.next() else {
		return Err(TemplateError::MissingColumn {
			column: COL_CURRENT.to_string(),
		});
	};
	let columns = ColumnMap::from_header(header)?;
	debug!("Template: header {:?}", columns);

	let mut rows = Vec::new();
	for (idx, cells) in lines.enumerate() {
		if cells.iter().all(|c| cell_text(c).is_empty()) {
			trace!("Template: blank data row {} ignored", idx + 1);
			continue;
		}
		rows.push(TemplateRow {
			row_number: idx + 1,
			current_filename: columns.text(cells, Some(columns.current)),
			prefix: columns.text(cells, columns.prefix),
			new_filename: columns.text(cells, columns.new_filename),
			notes: columns.text(cells, columns.notes),
		});
	}
	Ok(rows)
}

/// Column positions found in the header row
#[derive(Debug)]
struct ColumnMap {
	current: usize,
	prefix: Option<usize>,
	new_filename: Option<usize>,
	notes: Option<usize>,
}

impl ColumnMap {
	fn from_header(header: &[Data]) -> TemplateResult<Self> {
		let find = |name: &str| header.iter().position(|c| cell_text(c) == name);
		let current = find(COL_CURRENT).ok_or_else(|| TemplateError::MissingColumn {
			column: COL_CURRENT.to_string(),
		})?;
		Ok(Self {
			current,
			prefix: find(COL_PREFIX),
			new_filename: find(COL_NEW),
			notes: find(COL_NOTES),
		})
	}

	fn text(&self, cells: &[Data], column: Option<usize>) -> String {
		column
			.and_then(|i| cells.get(i))
			.map(cell_text)
			.unwrap_or_default()
	}
}

/// Cell contents as trimmed text; whole numbers print without a fraction.
pub(crate) fn cell_text(cell: &Data) -> String {
	match cell {
		Data::Empty => String::new(),
		Data::String(s) => s.trim().to_string(),
		Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
		other => other.to_string().trim().to_string(),
	}
}
