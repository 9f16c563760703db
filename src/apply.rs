//! Carrying out a rename plan: backup, renames, and the per-run log file

use chrono::{DateTime, Local};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::backup::{BackupReport, create_backup};
use crate::error::RenamerResult;
use crate::paths::same_file;
use crate::plan::{NamingOptions, PlanAction, RenamePlan};
use crate::scan::ScannedFile;

const LOG_RULE_WIDTH: usize = 70;

/// Progress through the rename candidates of a plan
#[derive(Debug, Clone)]
pub struct ApplyProgress {
	pub total_items: usize,
	pub processed_items: usize,
	pub current_item: Option<String>,
}

impl ApplyProgress {
	pub fn new(total_items: usize) -> Self {
		Self {
			total_items,
			processed_items: 0,
			current_item: None,
		}
	}

	pub fn update(&mut self, processed: usize, current_item: Option<String>) {
		self.processed_items = processed;
		self.current_item = current_item;
	}

	pub fn percentage(&self) -> f64 {
		if self.total_items == 0 {
			100.0
		} else {
			(self.processed_items as f64 / self.total_items as f64) * 100.0
		}
	}
}

pub type ProgressCallback = Arc<dyn Fn(ApplyProgress) + Send + Sync>;

/// Everything an apply run needs besides the plan itself
#[derive(Clone)]
pub struct ApplyContext<'a> {
	pub target_folder: &'a Path,
	pub template_path: &'a Path,
	pub naming: NamingOptions<'a>,
	pub backup: bool,
	pub dry_run: bool,
	pub progress_callback: Option<ProgressCallback>,
}

/// What an apply run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
	pub log_path: PathBuf,
	pub backup: Option<BackupReport>,
	/// Files renamed, or that would have been in a dry run
	pub renamed: usize,
	pub errors: usize,
	pub skipped: usize,
	pub dry_run: bool,
}

impl ApplyReport {
	pub fn total_processed(&self) -> usize {
		self.renamed + self.errors + self.skipped
	}
}

/// `rename_log_YYYYMMDD_HHMMSS.txt`
pub fn log_file_name(at: DateTime<Local>) -> String {
	format!("rename_log_{}.txt", at.format("%Y%m%d_%H%M%S"))
}

fn file_name(path: &Path) -> String {
	path.file_name()
		.map(|n| n.to_string_lossy().into_owned())
		.unwrap_or_else(|| path.display().to_string())
}

/// Run `plan` against the filesystem.
///
/// Rows are handled in sheet order and every rename is re-checked against the
/// folder as it is at that moment: a target that exists and is a different
/// file is an error, never an overwrite. In a dry run nothing is renamed but
/// names claimed or freed by earlier rows are tracked the same way, so the log
/// matches what a real run would do. The log file is written in both modes.
pub fn apply_plan(
	plan: &RenamePlan,
	files: &[ScannedFile],
	context: &ApplyContext<'_>,
) -> RenamerResult<ApplyReport> {
	let started = Local::now();
	info!(
		"Apply: {} rows against {} (dry run: {})",
		plan.rows(),
		context.target_folder.display(),
		context.dry_run
	);

	let backup = if context.backup && !context.dry_run {
		Some(create_backup(context.target_folder, files)?)
	} else {
		None
	};

	let log_path = context.target_folder.join(log_file_name(started));
	let mut log = BufWriter::new(File::create(&log_path)?);
	write_header(&mut log, context, backup.as_ref(), started)?;

	let total = plan.rename_candidates();
	let mut progress = ApplyProgress::new(total);
	let mut processed = 0;

	let mut renamed = 0;
	let mut errors = 0;
	let mut skipped = 0;
	// Sources already moved away, and targets taken, during this run
	let mut moved: HashSet<PathBuf> = HashSet::new();
	let mut claimed: HashSet<PathBuf> = HashSet::new();

	for entry in &plan.entries {
		let n = entry.row_number;
		match &entry.action {
			PlanAction::EmptyKey => {
				writeln!(log, "⚠ Row {n}: Empty Current_Filename (skipped)")?;
				skipped += 1;
			}
			PlanAction::NotFound { name } => {
				writeln!(log, "⚠ Row {n}: File not found: '{name}' (skipped)")?;
				skipped += 1;
			}
			PlanAction::Ambiguous { name, candidates } => {
				writeln!(
					log,
					"⚠ Row {n}: '{name}' matches {} files in subfolders (skipped)",
					candidates.len()
				)?;
				skipped += 1;
			}
			PlanAction::Unchanged { source } => {
				writeln!(log, "○ {} (no change)", file_name(source))?;
				skipped += 1;
			}
			PlanAction::InvalidTarget { source, target } => {
				writeln!(log, "✗ {}", file_name(source))?;
				writeln!(log, "  ERROR: Invalid new name: {target}\n")?;
				errors += 1;
			}
			PlanAction::Rename {
				source,
				target,
				notes,
				..
			} => {
				let old_name = file_name(source);
				let new_name = file_name(target);

				if moved.contains(source) {
					writeln!(
						log,
						"⚠ Row {n}: File not found: '{old_name}' (already renamed by an earlier row, skipped)"
					)?;
					skipped += 1;
				} else {
					let occupied = claimed.contains(target)
						|| (target.exists() && !moved.contains(target) && !same_file(source, target));

					if occupied {
						warn!("Apply: target exists for {} -> {}", old_name, new_name);
						writeln!(log, "✗ {old_name}")?;
						writeln!(log, "  ERROR: Target exists: {new_name}\n")?;
						errors += 1;
					} else {
						let result = if context.dry_run {
							Ok(())
						} else {
							fs::rename(source, target)
						};
						match result {
							Ok(()) => {
								debug!("Apply: {} -> {}", old_name, new_name);
								writeln!(log, "✓ {old_name}")?;
								writeln!(log, "  → {new_name}")?;
								if !notes.is_empty() {
									writeln!(log, "  User Note: {notes}")?;
								}
								writeln!(log)?;
								renamed += 1;
								moved.insert(source.clone());
								claimed.insert(target.clone());
							}
							Err(e) => {
								warn!("Apply: could not rename {}: {}", source.display(), e);
								writeln!(log, "✗ {old_name}")?;
								writeln!(log, "  ERROR: {e}\n")?;
								errors += 1;
							}
						}
					}
				}

				processed += 1;
				progress.update(processed, Some(old_name));
				if let Some(ref cb) = context.progress_callback {
					cb(progress.clone());
				}
			}
		}
	}

	let heavy = "=".repeat(LOG_RULE_WIDTH);
	writeln!(log, "\n{heavy}")?;
	writeln!(log, "SUMMARY")?;
	writeln!(log, "{heavy}")?;
	writeln!(log, "Renamed: {renamed} | Errors: {errors} | Skipped: {skipped}")?;
	writeln!(log, "Total processed: {}", renamed + errors + skipped)?;
	log.flush()?;

	info!(
		"Apply: renamed {} errors {} skipped {} (log {})",
		renamed,
		errors,
		skipped,
		log_path.display()
	);
	Ok(ApplyReport {
		log_path,
		backup,
		renamed,
		errors,
		skipped,
		dry_run: context.dry_run,
	})
}

fn write_header(
	log: &mut impl Write,
	context: &ApplyContext<'_>,
	backup: Option<&BackupReport>,
	started: DateTime<Local>,
) -> std::io::Result<()> {
	let heavy = "=".repeat(LOG_RULE_WIDTH);
	writeln!(log, "SHEET RENAME - Log File")?;
	writeln!(log, "{heavy}")?;
	writeln!(log, "Timestamp: {}\n", started.format("%Y-%m-%d %H:%M:%S"))?;
	writeln!(log, "Template: {}", context.template_path.display())?;
	writeln!(log, "Target: {}", context.target_folder.display())?;
	writeln!(
		log,
		"Mode: {} | Delimiter: '{}' | Extension: {}",
		context.naming.mode, context.naming.delimiter, context.naming.extension
	)?;
	writeln!(log, "Matching: Strict Current_Filename (Column B) matching")?;
	if context.dry_run {
		writeln!(log, "Dry run: no files were renamed")?;
	}
	if let Some(backup) = backup {
		writeln!(log, "Backup: {}", backup.folder.display())?;
	}
	writeln!(log)?;
	writeln!(log, "{heavy}\n")?;
	Ok(())
}
