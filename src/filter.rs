//! Glob-based exclusion of paths from folder scans

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

use crate::error::{RenamerError, RenamerResult};

/// Always left out: earlier backup folders, Office lock files, and the run
/// logs and templates this tool writes into the target folder.
pub const DEFAULT_EXCLUDES: &[&str] = &["backup_*", "~$*", "rename_log_*", "sheet-index-*"];

/// Decides which scanned paths are left out.
///
/// Each pattern is tested against the path relative to the scan root and
/// against every component of it, so `backup_*` drops a whole backup folder
/// in a recursive scan.
#[derive(Debug, Clone)]
pub struct PathFilter {
	patterns: Vec<String>,
	set: GlobSet,
}

impl PathFilter {
	/// Filter with the default exclusions plus `extra` user patterns
	pub fn new<S: AsRef<str>>(extra: &[S]) -> RenamerResult<Self> {
		let mut builder = GlobSetBuilder::new();
		let mut patterns = Vec::new();

		let all = DEFAULT_EXCLUDES
			.iter()
			.copied()
			.chain(extra.iter().map(AsRef::as_ref));
		for pattern in all {
			let glob = Glob::new(pattern).map_err(|e| RenamerError::InvalidGlobPattern {
				pattern: pattern.to_string(),
				reason: e.to_string(),
			})?;
			builder.add(glob);
			patterns.push(pattern.to_string());
		}

		let set = builder
			.build()
			.map_err(|e| RenamerError::InvalidGlobPattern {
				pattern: patterns.join(", "),
				reason: e.to_string(),
			})?;
		Ok(Self { patterns, set })
	}

	/// `relative` is the path below the scan root
	pub fn should_include(&self, relative: &Path) -> bool {
		if self.set.is_match(relative) {
			return false;
		}
		!relative
			.components()
			.any(|c| self.set.is_match(Path::new(c.as_os_str())))
	}

	pub fn patterns(&self) -> &[String] {
		&self.patterns
	}
}

impl Default for PathFilter {
	fn default() -> Self {
		let mut builder = GlobSetBuilder::new();
		for pattern in DEFAULT_EXCLUDES {
			if let Ok(glob) = Glob::new(pattern) {
				builder.add(glob);
			}
		}
		Self {
			patterns: DEFAULT_EXCLUDES.iter().map(|p| p.to_string()).collect(),
			set: builder.build().unwrap_or_else(|_| GlobSet::empty()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test_log::test]
	fn test_default_excludes_backups_and_lock_files() {
		let filter = PathFilter::default();
		assert!(filter.should_include(Path::new("invoice.pdf")));
		assert!(filter.should_include(Path::new("2024/invoice.pdf")));
		assert!(!filter.should_include(Path::new("backup_20250101_120000/invoice.pdf")));
		assert!(!filter.should_include(Path::new("~$sheet-index-20250101.xlsx")));
	}

	#[test_log::test]
	fn test_default_excludes_own_output() {
		let filter = PathFilter::default();
		assert!(!filter.should_include(Path::new("rename_log_20250101_120000.txt")));
		assert!(!filter.should_include(Path::new("sheet-index-20250101.xlsx")));
		assert!(!filter.should_include(Path::new("2024/rename_log_20250101_120000.txt")));
		assert!(filter.should_include(Path::new("meeting notes.txt")));
		assert!(filter.should_include(Path::new("budget.xlsx")));
	}

	#[test_log::test]
	fn test_user_patterns() {
		let filter = PathFilter::new(&["drafts", "*-old.pdf"]).unwrap();
		assert!(!filter.should_include(Path::new("drafts/a.pdf")));
		assert!(!filter.should_include(Path::new("scan-old.pdf")));
		assert!(filter.should_include(Path::new("scan.pdf")));
		assert_eq!(filter.patterns().len(), DEFAULT_EXCLUDES.len() + 2);
	}

	#[test_log::test]
	fn test_invalid_pattern() {
		let err = PathFilter::new(&["[unclosed"]).unwrap_err();
		assert!(matches!(err, RenamerError::InvalidGlobPattern { ref pattern, .. } if pattern == "[unclosed"));
	}
}
