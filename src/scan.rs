//! Folder scanning and basename lookup

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;

use crate::error::{RenamerError, RenamerResult};
use crate::filter::PathFilter;

/// A file found by a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
	/// Full path to the file
	pub path: PathBuf,
	/// Bare file name, the value column B is matched against
	pub name: String,
}

/// Lists the files of one extension in a folder
#[derive(Debug, Clone)]
pub struct FileScanner {
	/// Folder to scan
	pub root: PathBuf,
	/// Extension including the dot, e.g. `.pdf`
	pub extension: String,
	/// Descend into subfolders
	pub recursive: bool,
	/// Glob-based path filtering
	pub path_filter: PathFilter,
}

impl FileScanner {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self {
			root: root.into(),
			extension: ".pdf".to_string(),
			recursive: false,
			path_filter: PathFilter::default(),
		}
	}

	pub fn extension(mut self, extension: impl Into<String>) -> Self {
		self.extension = extension.into();
		self
	}

	pub fn recursive(mut self, recursive: bool) -> Self {
		self.recursive = recursive;
		self
	}

	pub fn with_path_filter(mut self, filter: PathFilter) -> Self {
		self.path_filter = filter;
		self
	}

	/// Scan the folder. Files come back sorted by full path.
	pub fn scan(&self) -> RenamerResult<Vec<ScannedFile>> {
		if !self.root.is_dir() {
			return Err(RenamerError::FolderNotFound {
				path: self.root.clone(),
			});
		}
		info!(
			"Scan: {} for *{} (recursive: {})",
			self.root.display(),
			self.extension,
			self.recursive
		);

		let mut walker = WalkDir::new(&self.root).min_depth(1);
		if !self.recursive {
			walker = walker.max_depth(1);
		}

		let mut files = Vec::new();
		for entry in walker {
			let entry = match entry {
				Ok(e) => e,
				Err(e) => {
					warn!("Scan walk error: {}", e);
					continue;
				}
			};

			if !entry.file_type().is_file() {
				continue;
			}

			let path = entry.path();
			let relative = path.strip_prefix(&self.root).unwrap_or(path);
			if !self.path_filter.should_include(relative) {
				trace!("Scan: excluded {}", relative.display());
				continue;
			}

			let Some(name) = entry.file_name().to_str() else {
				warn!("Skipping {} (file name is not valid UTF-8)", path.display());
				continue;
			};
			if !has_extension(name, &self.extension) {
				continue;
			}

			trace!("Scan: found {}", path.display());
			files.push(ScannedFile {
				path: path.to_path_buf(),
				name: name.to_string(),
			});
		}

		files.sort_by(|a, b| a.path.cmp(&b.path));
		debug!("Scan: {} matching files", files.len());
		Ok(files)
	}
}

/// ASCII case-insensitive suffix check, so `.pdf` also finds `SCAN.PDF`.
pub fn has_extension(name: &str, extension: &str) -> bool {
	name.len() >= extension.len()
		&& name.is_char_boundary(name.len() - extension.len())
		&& name[name.len() - extension.len()..].eq_ignore_ascii_case(extension)
}

/// Lookup from bare file name to scanned file.
///
/// A recursive scan can find the same name in two subfolders; such names are
/// kept aside as ambiguous instead of silently picking one.
#[derive(Debug, Default, Clone)]
pub struct FileIndex {
	by_name: HashMap<String, PathBuf>,
	ambiguous: HashMap<String, Vec<PathBuf>>,
	total: usize,
}

/// Result of looking a name up in a [`FileIndex`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<'a> {
	Found(&'a Path),
	Ambiguous(&'a [PathBuf]),
	Missing,
}

impl FileIndex {
	pub fn new(files: &[ScannedFile]) -> Self {
		let mut index = FileIndex {
			total: files.len(),
			..Default::default()
		};
		for file in files {
			if let Some(existing) = index.ambiguous.get_mut(&file.name) {
				existing.push(file.path.clone());
			} else if let Some(first) = index.by_name.remove(&file.name) {
				warn!("Scan: '{}' found in more than one folder", file.name);
				index
					.ambiguous
					.insert(file.name.clone(), vec![first, file.path.clone()]);
			} else {
				index.by_name.insert(file.name.clone(), file.path.clone());
			}
		}
		index
	}

	pub fn lookup(&self, name: &str) -> Lookup<'_> {
		if let Some(path) = self.by_name.get(name) {
			Lookup::Found(path)
		} else if let Some(paths) = self.ambiguous.get(name) {
			Lookup::Ambiguous(paths)
		} else {
			Lookup::Missing
		}
	}

	/// Number of files the index was built from
	pub fn total_files(&self) -> usize {
		self.total
	}

	pub fn is_empty(&self) -> bool {
		self.total == 0
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	fn create_test_directory() -> TempDir {
		let temp_dir = TempDir::new().unwrap();
		let base_path = temp_dir.path();

		fs::write(base_path.join("b-report.pdf"), "b").unwrap();
		fs::write(base_path.join("a-report.pdf"), "a").unwrap();
		fs::write(base_path.join("LOUD.PDF"), "loud").unwrap();
		fs::write(base_path.join("notes.txt"), "notes").unwrap();

		let sub_dir = base_path.join("subdir");
		fs::create_dir(&sub_dir).unwrap();
		fs::write(sub_dir.join("nested.pdf"), "nested").unwrap();
		fs::write(sub_dir.join("a-report.pdf"), "dup").unwrap();

		let backup = base_path.join("backup_20250101_120000");
		fs::create_dir(&backup).unwrap();
		fs::write(backup.join("a-report.pdf"), "old").unwrap();

		temp_dir
	}

	fn names(files: &[ScannedFile]) -> Vec<&str> {
		files.iter().map(|f| f.name.as_str()).collect()
	}

	#[test_log::test]
	fn test_flat_scan_is_sorted_and_filtered() {
		let temp_dir = create_test_directory();
		let files = FileScanner::new(temp_dir.path()).scan().unwrap();

		assert_eq!(names(&files), vec!["LOUD.PDF", "a-report.pdf", "b-report.pdf"]);
		assert!(files.iter().all(|f| f.path.parent() == Some(temp_dir.path())));
	}

	#[test_log::test]
	fn test_recursive_scan_skips_backups() {
		let temp_dir = create_test_directory();
		let files = FileScanner::new(temp_dir.path())
			.recursive(true)
			.scan()
			.unwrap();

		assert_eq!(files.len(), 5);
		assert!(files.iter().all(|f| !f.path.to_string_lossy().contains("backup_")));
	}

	#[test_log::test]
	fn test_other_extension() {
		let temp_dir = create_test_directory();
		let files = FileScanner::new(temp_dir.path())
			.extension(".txt")
			.scan()
			.unwrap();
		assert_eq!(names(&files), vec!["notes.txt"]);
	}

	#[test_log::test]
	fn test_own_logs_and_templates_are_not_scanned() {
		let temp_dir = create_test_directory();
		fs::write(temp_dir.path().join("rename_log_20250101_120000.txt"), "log").unwrap();
		fs::write(temp_dir.path().join("sheet-index-20250101.xlsx"), "xlsx").unwrap();
		fs::write(temp_dir.path().join("budget.xlsx"), "xlsx").unwrap();

		let txt = FileScanner::new(temp_dir.path()).extension(".txt").scan().unwrap();
		assert_eq!(names(&txt), vec!["notes.txt"]);
		let xlsx = FileScanner::new(temp_dir.path()).extension(".xlsx").scan().unwrap();
		assert_eq!(names(&xlsx), vec!["budget.xlsx"]);
	}

	#[test_log::test]
	fn test_missing_folder() {
		let result = FileScanner::new("/definitely/not/here").scan();
		assert!(matches!(result, Err(RenamerError::FolderNotFound { .. })));
	}

	#[test_log::test]
	fn test_has_extension() {
		assert!(has_extension("scan.pdf", ".pdf"));
		assert!(has_extension("SCAN.PDF", ".pdf"));
		assert!(!has_extension("scan.pdfx", ".pdf"));
		assert!(!has_extension("pdf", ".pdf"));
		assert!(!has_extension("ü", ".pdf"));
	}

	#[test_log::test]
	fn test_file_index_ambiguous_names() {
		let temp_dir = create_test_directory();
		let files = FileScanner::new(temp_dir.path())
			.recursive(true)
			.scan()
			.unwrap();
		let index = FileIndex::new(&files);

		assert_eq!(index.total_files(), 5);
		assert!(matches!(index.lookup("nested.pdf"), Lookup::Found(_)));
		assert!(matches!(index.lookup("a-report.pdf"), Lookup::Ambiguous(p) if p.len() == 2));
		assert_eq!(index.lookup("missing.pdf"), Lookup::Missing);
	}
}
