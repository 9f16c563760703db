//! Human-readable dry view of a rename plan

use std::fmt;

use crate::plan::{Collision, PlanAction, PlanSummary, RenamePlan};

const RULE_WIDTH: usize = 120;

/// Text rendering of a [`RenamePlan`]; building it never touches the filesystem.
#[derive(Debug, Clone)]
pub struct PreviewReport {
	pub plan: RenamePlan,
}

impl PreviewReport {
	pub fn new(plan: RenamePlan) -> Self {
		Self { plan }
	}

	pub fn summary(&self) -> PlanSummary {
		self.plan.summary()
	}

	/// Same rule the apply step is gated on
	pub fn is_runnable(&self) -> bool {
		self.plan.is_runnable()
	}
}

fn file_name(path: &std::path::Path) -> String {
	path.file_name()
		.map(|n| n.to_string_lossy().into_owned())
		.unwrap_or_else(|| path.display().to_string())
}

impl fmt::Display for PreviewReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let heavy = "=".repeat(RULE_WIDTH);
		let light = "-".repeat(RULE_WIDTH);

		writeln!(f, "{heavy}")?;
		writeln!(f, "PREVIEW OF CHANGES (strict Current_Filename matching)")?;
		writeln!(f, "{heavy}\n")?;
		writeln!(
			f,
			"Total files in folder: {} | Rows in sheet: {}\n",
			self.plan.files_in_folder,
			self.plan.rows()
		)?;
		writeln!(f, "{light}\n")?;

		for entry in &self.plan.entries {
			let n = entry.row_number;
			match &entry.action {
				PlanAction::EmptyKey => {
					writeln!(f, "! Row {n}: Empty Current_Filename (SKIPPED)")?;
					writeln!(f, "   Fix: Column B must contain the exact existing filename\n")?;
				}
				PlanAction::NotFound { name } => {
					writeln!(f, "! Row {n}: File not found: '{name}'")?;
					writeln!(f, "   Check: Does this exact filename exist in the target folder?\n")?;
				}
				PlanAction::Ambiguous { name, candidates } => {
					writeln!(f, "! Row {n}: '{name}' exists in {} folders (SKIPPED)", candidates.len())?;
					for path in candidates {
						writeln!(f, "   - {}", path.display())?;
					}
					writeln!(f)?;
				}
				PlanAction::InvalidTarget { source, target } => {
					writeln!(f, "{n:3}. BEFORE: {}", file_name(source))?;
					writeln!(f, "     AFTER:  {target}")?;
					writeln!(f, "     ! ERROR: New name must be a plain file name\n")?;
				}
				PlanAction::Unchanged { source } => {
					writeln!(f, "{n:3}. (no change) {}\n", file_name(source))?;
				}
				PlanAction::Rename {
					source,
					target,
					collision,
					..
				} => {
					writeln!(f, "{n:3}. BEFORE: {}", file_name(source))?;
					writeln!(f, "     AFTER:  {}", file_name(target))?;
					match collision {
						Some(Collision::PlannedTwice) => writeln!(
							f,
							"     ! WARNING: Target name collision detected (used by an earlier row)"
						)?,
						Some(Collision::TargetExists) => writeln!(
							f,
							"     ! WARNING: Target name collision detected (file already exists)"
						)?,
						None => {}
					}
					writeln!(f)?;
				}
			}
		}

		let summary = self.summary();
		writeln!(f, "{light}")?;
		writeln!(f, "\nSummary: {} file(s) will be renamed", summary.changes)?;
		if summary.missing > 0 {
			writeln!(f, "! Missing/Unmatched files: {}", summary.missing)?;
			writeln!(
				f,
				"  Action: Check Column B (Current_Filename) matches exact filenames"
			)?;
		}
		if summary.collisions > 0 {
			writeln!(f, "! Collisions: {} (resolve before running)", summary.collisions)?;
		}
		if summary.invalid > 0 {
			writeln!(f, "! Invalid new names: {}", summary.invalid)?;
		}
		if summary.changes == 0 {
			writeln!(f, "\n! No files will be renamed. Check Column B values!")?;
		}
		Ok(())
	}
}
