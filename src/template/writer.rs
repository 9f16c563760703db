//! Writing scanned and blank templates with rust_xlsxwriter

use chrono::Local;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::{Path, PathBuf};
use tracing::info;

use super::{HEADERS, INSTRUCTIONS_SHEET, RENAME_SHEET};
use crate::error::TemplateResult;
use crate::scan::ScannedFile;

const MAX_COLUMN_WIDTH: usize = 50;

/// What a template write produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSummary {
	pub path: PathBuf,
	pub rows: usize,
}

/// Write a template with one row per scanned file.
///
/// Prefixes are the 1-based row index padded to three digits and
/// `New_Filename` starts out as the current stem, so an untouched template
/// in prefix mode yields `001-<stem><ext>`.
pub fn write_scanned_template(
	path: &Path,
	files: &[ScannedFile],
	extension: &str,
) -> TemplateResult<TemplateSummary> {
	let rows: Vec<[String; 5]> = files
		.iter()
		.enumerate()
		.map(|(i, file)| {
			let idx = i + 1;
			[
				idx.to_string(),
				file.name.clone(),
				format!("{idx:03}"),
				file_stem(&file.name).to_string(),
				String::new(),
			]
		})
		.collect();

	let mut workbook = Workbook::new();
	write_rename_sheet(workbook.add_worksheet(), &rows)?;

	let now = Local::now();
	let instructions = [
		"SHEET RENAME - INSTRUCTIONS".to_string(),
		String::new(),
		"CRITICAL: Column B (Current_Filename) is used to match files!".to_string(),
		String::new(),
		"HOW TO USE:".to_string(),
		"1. Edit columns C, D, E as needed".to_string(),
		"2. Column B: Current_Filename (MUST match existing file)".to_string(),
		"3. Column C: Prefix (used in Prefix mode)".to_string(),
		"4. Column D: New_Filename (primary rename value)".to_string(),
		"5. Column E: Notes (logged to file)".to_string(),
		String::new(),
		"IMPORTANT: Do not change Column B unless you know what you're doing!".to_string(),
		"The program uses Column B to find the correct file to rename.".to_string(),
		String::new(),
		"Prefix mode: <Prefix><Delimiter><Column D><ext>".to_string(),
		"Replace mode: <Column D><ext>".to_string(),
		String::new(),
		format!("Scanned: {} files", files.len()),
		format!("Extension: {extension}"),
		format!("Date: {}", now.format("%Y-%m-%d %H:%M")),
	];
	write_instructions_sheet(workbook.add_worksheet(), &instructions)?;

	workbook.save(path)?;
	info!("Template: wrote {} rows to {}", rows.len(), path.display());
	Ok(TemplateSummary {
		path: path.to_path_buf(),
		rows: rows.len(),
	})
}

/// Write the three-row example template for filling in by hand.
pub fn write_blank_template(path: &Path) -> TemplateResult<TemplateSummary> {
	let rows: Vec<[String; 5]> = ["A", "B", "C"]
		.iter()
		.enumerate()
		.map(|(i, letter)| {
			let idx = i + 1;
			[
				idx.to_string(),
				format!("example{idx}.pdf"),
				format!("{idx:03}"),
				format!("Document-{letter}"),
				String::new(),
			]
		})
		.collect();

	let mut workbook = Workbook::new();
	write_rename_sheet(workbook.add_worksheet(), &rows)?;
	write_instructions_sheet(
		workbook.add_worksheet(),
		&[
			"SHEET RENAME - BLANK TEMPLATE".to_string(),
			"Fill Column B with exact filenames that exist in your folder!".to_string(),
		],
	)?;

	workbook.save(path)?;
	info!("Template: wrote blank template to {}", path.display());
	Ok(TemplateSummary {
		path: path.to_path_buf(),
		rows: rows.len(),
	})
}

fn write_rename_sheet(sheet: &mut Worksheet, rows: &[[String; 5]]) -> TemplateResult<()> {
	sheet.set_name(RENAME_SHEET)?;
	let header_format = Format::new().set_bold();

	let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.chars().count()).collect();
	for (col, header) in HEADERS.iter().enumerate() {
		sheet.write_string_with_format(0, col as u16, *header, &header_format)?;
	}

	for (i, row) in rows.iter().enumerate() {
		let r = (i + 1) as u32;
		// Row index stays numeric; Prefix is text so leading zeros survive
		sheet.write_number(r, 0, (i + 1) as f64)?;
		for (col, value) in row.iter().enumerate().skip(1) {
			if !value.is_empty() {
				sheet.write_string(r, col as u16, value)?;
			}
		}
		for (col, value) in row.iter().enumerate() {
			widths[col] = widths[col].max(value.chars().count());
		}
	}

	for (col, width) in widths.iter().enumerate() {
		sheet.set_column_width(col as u16, ((width + 2).min(MAX_COLUMN_WIDTH)) as f64)?;
	}
	Ok(())
}

fn write_instructions_sheet(sheet: &mut Worksheet, lines: &[String]) -> TemplateResult<()> {
	sheet.set_name(INSTRUCTIONS_SHEET)?;
	for (i, line) in lines.iter().enumerate() {
		if !line.is_empty() {
			sheet.write_string(i as u32, 0, line)?;
		}
	}
	sheet.set_column_width(0, 80)?;
	Ok(())
}

/// Name without its last extension, `.bashrc` stays whole
pub(crate) fn file_stem(name: &str) -> &str {
	Path::new(name)
		.file_stem()
		.and_then(|s| s.to_str())
		.unwrap_or(name)
}

#[cfg(test)]
mod tests {
	use super::*;
	use calamine::{Reader, open_workbook_auto};
	use tempfile::TempDir;

	#[test_log::test]
	fn test_file_stem() {
		assert_eq!(file_stem("report.pdf"), "report");
		assert_eq!(file_stem("archive.tar.gz"), "archive.tar");
		assert_eq!(file_stem(".bashrc"), ".bashrc");
		assert_eq!(file_stem("noext"), "noext");
	}

	#[test_log::test]
	fn test_scanned_template_layout() {
		let temp_dir = TempDir::new().unwrap();
		let book = temp_dir.path().join("sheet-index-20250101.xlsx");
		let files: Vec<ScannedFile> = (1..=12)
			.map(|i| ScannedFile {
				path: temp_dir.path().join(format!("scan {i}.pdf")),
				name: format!("scan {i}.pdf"),
			})
			.collect();

		let summary = write_scanned_template(&book, &files, ".pdf").unwrap();
		assert_eq!(summary.rows, 12);

		let mut workbook = open_workbook_auto(&book).unwrap();
		assert_eq!(
			workbook.sheet_names(),
			vec![RENAME_SHEET.to_string(), INSTRUCTIONS_SHEET.to_string()]
		);
		let range = workbook.worksheet_range(RENAME_SHEET).unwrap();
		let header: Vec<String> = range.rows().next().unwrap().iter().map(|c| c.to_string()).collect();
		assert_eq!(header, HEADERS.map(String::from).to_vec());

		let last = range.rows().last().unwrap();
		assert_eq!(last[1].to_string(), "scan 12.pdf");
		assert_eq!(last[2].to_string(), "012");
		assert_eq!(last[3].to_string(), "scan 12");

		let notes = workbook.worksheet_range(INSTRUCTIONS_SHEET).unwrap();
		let text: Vec<String> = notes.rows().map(|r| r[0].to_string()).collect();
		assert!(text.iter().any(|l| l == "Scanned: 12 files"));
		assert!(text.iter().any(|l| l == "Extension: .pdf"));
	}
}
