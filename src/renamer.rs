//! Main API: the scan → template → preview → apply workflow

use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::apply::{ApplyContext, ApplyReport, ProgressCallback, apply_plan};
use crate::config::RenamerConfig;
use crate::error::{RenamerError, RenamerResult, TemplateError};
use crate::filter::PathFilter;
use crate::paths::{check_workbook_available, validate_local_path};
use crate::plan::{NamingOptions, RenamePlan};
use crate::preview::PreviewReport;
use crate::scan::{FileIndex, FileScanner, ScannedFile};
use crate::template::{
	self, RENAME_SHEET, TemplateSummary, default_template_name, find_latest_template,
	has_rename_sheet, read_rename_index,
};

/// Drives one configured rename job.
///
/// Nothing is cached between calls: every `plan`, `preview` and `apply`
/// re-reads the sheet and re-scans the folder, so edits made in Excel in
/// between are always picked up and the workbook is never held open.
pub struct Renamer {
	pub config: RenamerConfig,
	progress_callback: Option<ProgressCallback>,
}

/// A fresh plan together with the inputs it was built from
#[derive(Debug, Clone)]
pub struct PreparedRun {
	pub template_path: PathBuf,
	pub target_folder: PathBuf,
	pub extension: String,
	pub files: Vec<ScannedFile>,
	pub plan: RenamePlan,
}

impl Renamer {
	pub fn new(config: RenamerConfig) -> Self {
		Self {
			config,
			progress_callback: None,
		}
	}

	/// Attach a progress callback for apply runs
	pub fn with_progress_callback(mut self, cb: ProgressCallback) -> Self {
		self.progress_callback = Some(cb);
		self
	}

	fn target_folder(&self) -> RenamerResult<PathBuf> {
		let folder = self
			.config
			.target_folder
			.clone()
			.ok_or_else(|| RenamerError::Config("no target folder set".to_string()))?;
		validate_local_path(&folder)?;
		if !folder.is_dir() {
			return Err(RenamerError::FolderNotFound { path: folder });
		}
		Ok(folder)
	}

	fn scanner(&self, folder: &Path, extension: &str) -> RenamerResult<FileScanner> {
		Ok(FileScanner::new(folder)
			.extension(extension)
			.recursive(self.config.recursive)
			.with_path_filter(PathFilter::new(self.config.exclude.as_slice())?))
	}

	/// Scan the target folder with the configured extension and filters
	pub fn scan(&self) -> RenamerResult<Vec<ScannedFile>> {
		let folder = self.target_folder()?;
		let extension = self.config.normalized_extension()?;
		self.scanner(&folder, &extension)?.scan()
	}

	/// Default location for a new template: the target folder, today's name
	pub fn default_template_path(&self) -> RenamerResult<PathBuf> {
		Ok(self
			.target_folder()?
			.join(default_template_name(Local::now().date_naive())))
	}

	/// Scan the folder and write a template listing every matching file.
	///
	/// An empty scan is reported as zero rows and no workbook is written. An
	/// existing `output` is only replaced when `overwrite` is set.
	pub fn create_template(&self, output: &Path, overwrite: bool) -> RenamerResult<TemplateSummary> {
		check_output(output, overwrite)?;
		let extension = self.config.normalized_extension()?;
		let files = self.scan()?;
		if files.is_empty() {
			info!("Template: no *{} files, nothing written", extension);
			return Ok(TemplateSummary {
				path: output.to_path_buf(),
				rows: 0,
			});
		}
		Ok(template::write_scanned_template(output, &files, &extension)?)
	}

	/// Write the three-row example template
	pub fn create_blank_template(&self, output: &Path, overwrite: bool) -> RenamerResult<TemplateSummary> {
		check_output(output, overwrite)?;
		Ok(template::write_blank_template(output)?)
	}

	/// The template to work from: the configured one, or with auto-pull the
	/// newest template in the target folder. Checked to be local, present,
	/// unlocked and to carry the `Rename Index` sheet.
	pub fn resolve_template(&self) -> RenamerResult<PathBuf> {
		let path = match &self.config.template_path {
			Some(path) => path.clone(),
			None if self.config.auto_pull => {
				let folder = self.target_folder()?;
				let latest = find_latest_template(&folder)
					.ok_or_else(|| RenamerError::NoTemplate { folder: folder.clone() })?;
				info!("Auto-pulled template {}", latest.display());
				latest
			}
			None => return Err(RenamerError::Config("no template set".to_string())),
		};

		if !path.is_file() {
			return Err(RenamerError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("template {} does not exist", path.display()),
			)));
		}
		check_workbook_available(&path)?;
		if !has_rename_sheet(&path) {
			return Err(TemplateError::MissingSheet {
				path,
				sheet: RENAME_SHEET.to_string(),
			}
			.into());
		}
		Ok(path)
	}

	/// Validate inputs, read the sheet and scan the folder, then match them up
	pub fn prepare(&self) -> RenamerResult<PreparedRun> {
		let target_folder = self.target_folder()?;
		let extension = self.config.normalized_extension()?;
		let template_path = self.resolve_template()?;

		let rows = read_rename_index(&template_path)?;
		let files = self.scanner(&target_folder, &extension)?.scan()?;
		let index = FileIndex::new(&files);
		let plan = RenamePlan::build(&rows, &index, NamingOptions {
			mode: self.config.mode,
			extension: &extension,
			delimiter: &self.config.delimiter,
		});
		debug!("Prepared plan with {} rows", plan.rows());

		Ok(PreparedRun {
			template_path,
			target_folder,
			extension,
			files,
			plan,
		})
	}

	/// Current plan for the configured job
	pub fn plan(&self) -> RenamerResult<RenamePlan> {
		Ok(self.prepare()?.plan)
	}

	pub fn preview(&self) -> RenamerResult<PreviewReport> {
		Ok(PreviewReport::new(self.plan()?))
	}

	/// Back up (unless disabled or dry run), rename, and write the log
	pub fn apply(&self) -> RenamerResult<ApplyReport> {
		let run = self.prepare()?;
		let context = ApplyContext {
			target_folder: &run.target_folder,
			template_path: &run.template_path,
			naming: NamingOptions {
				mode: self.config.mode,
				extension: &run.extension,
				delimiter: &self.config.delimiter,
			},
			backup: self.config.backup,
			dry_run: self.config.dry_run,
			progress_callback: self.progress_callback.clone(),
		};
		apply_plan(&run.plan, &run.files, &context)
	}
}

/// Local path, and not an existing file unless the caller allows replacing it
fn check_output(output: &Path, overwrite: bool) -> RenamerResult<()> {
	validate_local_path(output)?;
	if !overwrite && output.exists() {
		return Err(RenamerError::OutputExists {
			path: output.to_path_buf(),
		});
	}
	Ok(())
}
