//! The `Rename Index` spreadsheet: layout, reading, writing, discovery
//!
//! Column B (`Current_Filename`) is the key every row is matched by. The other
//! columns only shape the new name (`Prefix`, `New_Filename`) or end up in the
//! rename log (`Notes`).

use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, trace};

pub mod reader;
pub mod writer;

pub use reader::{has_rename_sheet, read_rename_index};
pub use writer::{TemplateSummary, write_blank_template, write_scanned_template};

/// Name of the sheet holding the rows
pub const RENAME_SHEET: &str = "Rename Index";
/// Name of the sheet with usage notes
pub const INSTRUCTIONS_SHEET: &str = "Instructions";

pub const COL_ROW: &str = "Row";
pub const COL_CURRENT: &str = "Current_Filename";
pub const COL_PREFIX: &str = "Prefix";
pub const COL_NEW: &str = "New_Filename";
pub const COL_NOTES: &str = "Notes";

/// Header row, in sheet order
pub const HEADERS: [&str; 5] = [COL_ROW, COL_CURRENT, COL_PREFIX, COL_NEW, COL_NOTES];

/// Workbook formats the reader accepts
pub const WORKBOOK_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xlsb", "xls"];

/// One data row of the `Rename Index` sheet, every cell as trimmed text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateRow {
	/// 1-based position among the data rows
	pub row_number: usize,
	pub current_filename: String,
	pub prefix: String,
	pub new_filename: String,
	pub notes: String,
}

impl TemplateRow {
	pub fn new(row_number: usize, current_filename: impl Into<String>) -> Self {
		Self {
			row_number,
			current_filename: current_filename.into(),
			..Default::default()
		}
	}

	pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = prefix.into();
		self
	}

	pub fn new_filename(mut self, new_filename: impl Into<String>) -> Self {
		self.new_filename = new_filename.into();
		self
	}

	pub fn notes(mut self, notes: impl Into<String>) -> Self {
		self.notes = notes.into();
		self
	}
}

/// `sheet-index-YYYYMMDD.xlsx`
pub fn default_template_name(date: NaiveDate) -> String {
	format!("sheet-index-{}.xlsx", date.format("%Y%m%d"))
}

pub fn is_workbook_path(path: &Path) -> bool {
	path.extension()
		.and_then(|e| e.to_str())
		.is_some_and(|e| WORKBOOK_EXTENSIONS.iter().any(|w| w.eq_ignore_ascii_case(e)))
}

/// Newest template in `folder` that has a `Rename Index` sheet.
///
/// Generated `sheet-index-*.xlsx` files are preferred; any other `.xlsx` is
/// only considered when none exist.
pub fn find_latest_template(folder: &Path) -> Option<PathBuf> {
	let entries = fs::read_dir(folder).ok()?;
	let mut generated = Vec::new();
	let mut other = Vec::new();

	for entry in entries.flatten() {
		let path = entry.path();
		let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
			continue;
		};
		if !path.is_file() || !name.to_ascii_lowercase().ends_with(".xlsx") || name.starts_with("~$") {
			continue;
		}
		let modified = entry
			.metadata()
			.and_then(|m| m.modified())
			.unwrap_or(SystemTime::UNIX_EPOCH);
		if name.starts_with("sheet-index-") {
			generated.push((modified, path));
		} else {
			other.push((modified, path));
		}
	}

	let mut candidates = if generated.is_empty() { other } else { generated };
	candidates.sort_by(|a, b| b.0.cmp(&a.0));

	for (_, path) in candidates {
		trace!("Auto-pull: checking {}", path.display());
		if has_rename_sheet(&path) {
			debug!("Auto-pull: using {}", path.display());
			return Some(path);
		}
	}
	None
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;
	use tempfile::TempDir;

	#[test_log::test]
	fn test_default_template_name() {
		let date = NaiveDate::from_ymd_opt(2025, 12, 27).unwrap();
		assert_eq!(default_template_name(date), "sheet-index-20251227.xlsx");
	}

	#[test_log::test]
	fn test_is_workbook_path() {
		assert!(is_workbook_path(Path::new("index.xlsx")));
		assert!(is_workbook_path(Path::new("INDEX.XLS")));
		assert!(is_workbook_path(Path::new("macro.xlsm")));
		assert!(!is_workbook_path(Path::new("index.csv")));
		assert!(!is_workbook_path(Path::new("xlsx")));
	}

	fn set_mtime(path: &Path, secs_after_epoch: u64) {
		let file = fs::File::options().write(true).open(path).unwrap();
		file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs_after_epoch))
			.unwrap();
	}

	#[test_log::test]
	fn test_find_latest_template_prefers_newest_generated() {
		let temp_dir = TempDir::new().unwrap();
		let dir = temp_dir.path();

		let older = dir.join("sheet-index-20250101.xlsx");
		let newer = dir.join("sheet-index-20250201.xlsx");
		let unrelated = dir.join("budget.xlsx");
		write_blank_template(&older).unwrap();
		write_blank_template(&newer).unwrap();
		write_blank_template(&unrelated).unwrap();
		set_mtime(&older, 1_000_000);
		set_mtime(&newer, 2_000_000);
		set_mtime(&unrelated, 3_000_000);

		assert_eq!(find_latest_template(dir), Some(newer));
	}

	#[test_log::test]
	fn test_find_latest_template_skips_foreign_workbooks() {
		let temp_dir = TempDir::new().unwrap();
		let dir = temp_dir.path();
		assert_eq!(find_latest_template(dir), None);

		// Not a workbook at all: ignored rather than an error
		fs::write(dir.join("broken.xlsx"), b"garbage").unwrap();
		assert_eq!(find_latest_template(dir), None);

		let good = dir.join("names.xlsx");
		write_blank_template(&good).unwrap();
		assert_eq!(find_latest_template(dir), Some(good));
	}
}
