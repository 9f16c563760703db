//! Copy-before-rename backups

use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::RenamerResult;
use crate::scan::ScannedFile;

/// Outcome of a backup pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupReport {
	pub folder: PathBuf,
	pub copied: usize,
	pub failed: usize,
}

/// `backup_YYYYMMDD_HHMMSS`
pub fn backup_folder_name(at: DateTime<Local>) -> String {
	format!("backup_{}", at.format("%Y%m%d_%H%M%S"))
}

/// Copy every scanned file into a fresh timestamped folder inside `target_folder`.
///
/// Files are stored flat by name. A file that fails to copy is logged and
/// counted; only failing to create the folder itself is an error.
pub fn create_backup(target_folder: &Path, files: &[ScannedFile]) -> RenamerResult<BackupReport> {
	let folder = target_folder.join(backup_folder_name(Local::now()));
	fs::create_dir_all(&folder)?;

	let mut copied = 0;
	let mut failed = 0;
	for file in files {
		match fs::copy(&file.path, folder.join(&file.name)) {
			Ok(_) => copied += 1,
			Err(e) => {
				warn!("Backup: could not copy {}: {}", file.path.display(), e);
				failed += 1;
			}
		}
	}

	info!(
		"Backup: {} files copied to {} ({} failed)",
		copied,
		folder.display(),
		failed
	);
	Ok(BackupReport {
		folder,
		copied,
		failed,
	})
}
