//! Matching sheet rows to files and deciding what each row does

use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, trace};

use crate::config::RenameMode;
use crate::naming::target_name;
use crate::paths::{is_safe_file_name, same_file};
use crate::scan::{FileIndex, Lookup};
use crate::template::TemplateRow;

/// Why a rename candidate cannot go ahead as planned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
	/// An earlier row already renames a file to this name
	PlannedTwice,
	/// A different file already has this name
	TargetExists,
}

/// What one row of the sheet will do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanAction {
	/// Column B is blank
	EmptyKey,
	/// No scanned file has the name in column B
	NotFound { name: String },
	/// Several scanned files share the name in column B
	Ambiguous { name: String, candidates: Vec<PathBuf> },
	/// The generated name is not a bare file name
	InvalidTarget { source: PathBuf, target: String },
	/// The generated name equals the current one
	Unchanged { source: PathBuf },
	Rename {
		source: PathBuf,
		target: PathBuf,
		notes: String,
		collision: Option<Collision>,
	},
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
	pub row_number: usize,
	/// Column B as written in the sheet
	pub current_filename: String,
	pub action: PlanAction,
}

/// Parameters that shape generated names
#[derive(Debug, Clone, Copy)]
pub struct NamingOptions<'a> {
	pub mode: RenameMode,
	pub extension: &'a str,
	pub delimiter: &'a str,
}

/// Counts over a plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanSummary {
	/// Rows that rename a file, colliding or not
	pub changes: usize,
	/// Blank, unmatched or ambiguous column B
	pub missing: usize,
	pub collisions: usize,
	pub invalid: usize,
	pub unchanged: usize,
}

/// Every row of a sheet resolved against one folder scan
#[derive(Debug, Clone, Default)]
pub struct RenamePlan {
	pub entries: Vec<PlanEntry>,
	/// Files the folder scan found
	pub files_in_folder: usize,
}

impl RenamePlan {
	/// Resolve `rows` in sheet order.
	///
	/// Matching is by exact file name from column B only; row position is
	/// never used, so a reused template cannot rename the wrong file.
	pub fn build(rows: &[TemplateRow], index: &FileIndex, naming: NamingOptions<'_>) -> Self {
		let mut claimed: HashSet<PathBuf> = HashSet::new();
		let mut entries = Vec::with_capacity(rows.len());

		for row in rows {
			let name = row.current_filename.as_str();
			let action = if name.is_empty() {
				PlanAction::EmptyKey
			} else {
				match index.lookup(name) {
					Lookup::Missing => PlanAction::NotFound {
						name: name.to_string(),
					},
					Lookup::Ambiguous(paths) => PlanAction::Ambiguous {
						name: name.to_string(),
						candidates: paths.to_vec(),
					},
					Lookup::Found(source) => {
						let new_name = target_name(row, name, naming.mode, naming.extension, naming.delimiter);
						if new_name == name {
							PlanAction::Unchanged {
								source: source.to_path_buf(),
							}
						} else if !is_safe_file_name(&new_name) {
							PlanAction::InvalidTarget {
								source: source.to_path_buf(),
								target: new_name,
							}
						} else {
							let target = source.with_file_name(&new_name);
							let collision = if claimed.contains(&target) {
								Some(Collision::PlannedTwice)
							} else if target.exists() && !same_file(source, &target) {
								Some(Collision::TargetExists)
							} else {
								claimed.insert(target.clone());
								None
							};
							PlanAction::Rename {
								source: source.to_path_buf(),
								target,
								notes: row.notes.clone(),
								collision,
							}
						}
					}
				}
			};
			trace!("Plan: row {} -> {:?}", row.row_number, action);
			entries.push(PlanEntry {
				row_number: row.row_number,
				current_filename: row.current_filename.clone(),
				action,
			});
		}

		let plan = Self {
			entries,
			files_in_folder: index.total_files(),
		};
		debug!("Plan: {:?}", plan.summary());
		plan
	}

	pub fn summary(&self) -> PlanSummary {
		let mut summary = PlanSummary::default();
		for entry in &self.entries {
			match &entry.action {
				PlanAction::EmptyKey | PlanAction::NotFound { .. } | PlanAction::Ambiguous { .. } => {
					summary.missing += 1
				}
				PlanAction::InvalidTarget { .. } => summary.invalid += 1,
				PlanAction::Unchanged { .. } => summary.unchanged += 1,
				PlanAction::Rename { collision, .. } => {
					summary.changes += 1;
					if collision.is_some() {
						summary.collisions += 1;
					}
				}
			}
		}
		summary
	}

	/// Rows read from the sheet
	pub fn rows(&self) -> usize {
		self.entries.len()
	}

	/// Something to rename and every row matched a file
	pub fn is_runnable(&self) -> bool {
		let summary = self.summary();
		summary.changes > 0 && summary.missing == 0
	}

	/// Number of rows that will attempt a rename
	pub fn rename_candidates(&self) -> usize {
		self.entries
			.iter()
			.filter(|e| matches!(e.action, PlanAction::Rename { .. }))
			.count()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::scan::FileScanner;
	use std::fs;
	use tempfile::TempDir;

	const NAMING: NamingOptions<'static> = NamingOptions {
		mode: RenameMode::Prefix,
		extension: ".pdf",
		delimiter: "-",
	};

	fn folder(names: &[&str]) -> (TempDir, FileIndex) {
		let temp_dir = TempDir::new().unwrap();
		for name in names {
			fs::write(temp_dir.path().join(name), name).unwrap();
		}
		let files = FileScanner::new(temp_dir.path()).scan().unwrap();
		let index = FileIndex::new(&files);
		(temp_dir, index)
	}

	#[test_log::test]
	fn test_rows_match_by_name_not_position() {
		let (dir, index) = folder(&["a.pdf", "b.pdf"]);
		// Rows listed in reverse: each must still hit its own file
		let rows = vec![
			TemplateRow::new(1, "b.pdf").prefix("001").new_filename("Bravo"),
			TemplateRow::new(2, "a.pdf").prefix("002").new_filename("Alpha"),
		];
		let plan = RenamePlan::build(&rows, &index, NAMING);

		assert_eq!(
			plan.entries[0].action,
			PlanAction::Rename {
				source: dir.path().join("b.pdf"),
				target: dir.path().join("001-Bravo.pdf"),
				notes: String::new(),
				collision: None,
			}
		);
		assert!(matches!(
			&plan.entries[1].action,
			PlanAction::Rename { target, .. } if *target == dir.path().join("002-Alpha.pdf")
		));
		assert!(plan.is_runnable());
		assert_eq!(plan.files_in_folder, 2);
	}

	#[test_log::test]
	fn test_skips_and_missing_counts() {
		let (_dir, index) = folder(&["a.pdf", "keep.pdf"]);
		let rows = vec![
			TemplateRow::new(1, ""),
			TemplateRow::new(2, "ghost.pdf").new_filename("x"),
			TemplateRow::new(3, "keep.pdf"),
			TemplateRow::new(4, "a.pdf").new_filename("Alpha"),
		];
		let plan = RenamePlan::build(&rows, &index, NAMING);
		let summary = plan.summary();

		assert_eq!(plan.entries[0].action, PlanAction::EmptyKey);
		assert!(matches!(plan.entries[1].action, PlanAction::NotFound { ref name } if name == "ghost.pdf"));
		assert!(matches!(plan.entries[2].action, PlanAction::Unchanged { .. }));
		assert_eq!(summary.missing, 2);
		assert_eq!(summary.unchanged, 1);
		assert_eq!(summary.changes, 1);
		assert!(!plan.is_runnable());
	}

	#[test_log::test]
	fn test_collisions() {
		let (_dir, index) = folder(&["a.pdf", "b.pdf", "taken.pdf"]);
		let rows = vec![
			TemplateRow::new(1, "a.pdf").new_filename("same"),
			TemplateRow::new(2, "b.pdf").new_filename("same"),
			TemplateRow::new(3, "taken.pdf").new_filename("taken-2"),
			TemplateRow::new(4, "a.pdf").new_filename("taken"),
		];
		let plan = RenamePlan::build(&rows, &index, NAMING);

		let collisions: Vec<Option<Collision>> = plan
			.entries
			.iter()
			.map(|e| match &e.action {
				PlanAction::Rename { collision, .. } => *collision,
				other => panic!("unexpected {other:?}"),
			})
			.collect();
		assert_eq!(
			collisions,
			vec![
				None,
				Some(Collision::PlannedTwice),
				None,
				Some(Collision::TargetExists),
			]
		);
		assert_eq!(plan.summary().collisions, 2);
		assert_eq!(plan.summary().changes, 4);
	}

	#[test_log::test]
	fn test_invalid_target_name() {
		let (_dir, index) = folder(&["a.pdf"]);
		let rows = vec![TemplateRow::new(1, "a.pdf").new_filename("../escape")];
		let plan = RenamePlan::build(&rows, &index, NAMING);

		assert!(matches!(
			plan.entries[0].action,
			PlanAction::InvalidTarget { ref target, .. } if target == "../escape.pdf"
		));
		assert_eq!(plan.summary().invalid, 1);
		assert_eq!(plan.rename_candidates(), 0);
	}

	#[test_log::test]
	fn test_untouched_upper_case_extension_is_unchanged() {
		let (dir, index) = folder(&["LOUD.PDF"]);
		let rows = vec![TemplateRow::new(1, "LOUD.PDF").prefix("001").new_filename("LOUD")];
		let replace = NamingOptions {
			mode: RenameMode::Replace,
			..NAMING
		};
		let plan = RenamePlan::build(&rows, &index, replace);

		assert_eq!(
			plan.entries[0].action,
			PlanAction::Unchanged {
				source: dir.path().join("LOUD.PDF")
			}
		);
		assert_eq!(plan.summary().changes, 0);

		let plan = RenamePlan::build(&rows, &index, NAMING);
		assert!(matches!(
			&plan.entries[0].action,
			PlanAction::Rename { target, .. } if *target == dir.path().join("001-LOUD.PDF")
		));
	}

	#[test_log::test]
	fn test_same_name_in_two_subfolders_is_ambiguous() {
		let temp_dir = TempDir::new().unwrap();
		for sub in ["2023", "2024"] {
			fs::create_dir(temp_dir.path().join(sub)).unwrap();
			fs::write(temp_dir.path().join(sub).join("report.pdf"), sub).unwrap();
		}
		fs::write(temp_dir.path().join("single.pdf"), "single").unwrap();
		let files = FileScanner::new(temp_dir.path()).recursive(true).scan().unwrap();
		let index = FileIndex::new(&files);

		let rows = vec![
			TemplateRow::new(1, "report.pdf").new_filename("Annual"),
			TemplateRow::new(2, "single.pdf").new_filename("One"),
		];
		let plan = RenamePlan::build(&rows, &index, NAMING);

		assert_eq!(
			plan.entries[0].action,
			PlanAction::Ambiguous {
				name: "report.pdf".to_string(),
				candidates: vec![
					temp_dir.path().join("2023").join("report.pdf"),
					temp_dir.path().join("2024").join("report.pdf"),
				],
			}
		);
		assert_eq!(plan.summary().missing, 1);
		assert_eq!(plan.rename_candidates(), 1);
		assert!(!plan.is_runnable());
	}
}
