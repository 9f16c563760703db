//! Path helpers: config location, local-path checks and file identity

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use dirs::config_dir;

use crate::error::{RenamerError, RenamerResult, TemplateError};

/// Get the default config directory for sheet-rename, e.g.:
/// - Linux: ~/.config/sheet-rename
/// - macOS: ~/Library/Application Support/sheet-rename
/// - Windows: %APPDATA%\sheet-rename
pub fn default_config_dir() -> Option<PathBuf> {
	config_dir().map(|mut p| {
		p.push("sheet-rename");
		p
	})
}

/// Location of the persisted settings file
pub fn default_config_path() -> Option<PathBuf> {
	default_config_dir().map(|p| p.join("config.json"))
}

/// Accept only local paths: no UNC/network prefixes and no `..` components.
pub fn validate_local_path(path: &Path) -> RenamerResult<()> {
	let raw = path.as_os_str().to_string_lossy();
	let unsafe_path = raw.starts_with("\\\\")
		|| raw.starts_with("//")
		|| path.components().any(|c| matches!(c, Component::ParentDir));

	if unsafe_path {
		return Err(RenamerError::UnsafePath {
			path: path.to_path_buf(),
		});
	}
	Ok(())
}

/// Check that a workbook exists, is local, and is not held open by Excel.
///
/// Excel on Windows keeps an exclusive handle on open workbooks; opening the
/// file for writing is the cheapest way to find out before reading it.
pub fn check_workbook_available(path: &Path) -> RenamerResult<()> {
	if !path.exists() {
		return Err(RenamerError::Io(std::io::Error::new(
			ErrorKind::NotFound,
			format!("{} does not exist", path.display()),
		)));
	}
	validate_local_path(path)?;

	match OpenOptions::new().read(true).write(true).open(path) {
		Ok(_) => Ok(()),
		Err(e) if e.kind() == ErrorKind::PermissionDenied => Err(TemplateError::Locked {
			path: path.to_path_buf(),
		}
		.into()),
		Err(e) => Err(e.into()),
	}
}

/// True when both paths name the same file on disk.
///
/// Lets a case-only rename (`a.pdf` -> `A.pdf`) through on case-insensitive
/// filesystems, where the target "exists" because it is the source.
pub fn same_file(a: &Path, b: &Path) -> bool {
	#[cfg(unix)]
	{
		use std::os::unix::fs::MetadataExt;
		match (a.metadata(), b.metadata()) {
			(Ok(ma), Ok(mb)) => ma.dev() == mb.dev() && ma.ino() == mb.ino(),
			_ => false,
		}
	}

	#[cfg(not(unix))]
	{
		match (a.canonicalize(), b.canonicalize()) {
			(Ok(ca), Ok(cb)) => ca == cb,
			_ => false,
		}
	}
}

/// A rename target has to be a bare file name that stays in the source folder.
pub fn is_safe_file_name(name: &str) -> bool {
	if name.is_empty() || name == "." || name == ".." {
		return false;
	}
	if name.contains(['/', '\\']) || name.chars().any(char::is_control) {
		return false;
	}
	if cfg!(windows)
		&& (name.contains(['<', '>', ':', '"', '|', '?', '*']) || is_windows_reserved_name(name))
	{
		return false;
	}
	true
}

/// Device names like `CON` or `com1.pdf`, or names ending in a dot or space,
/// which Windows refuses or silently alters.
pub fn is_windows_reserved_name(name: &str) -> bool {
	if name.ends_with(['.', ' ']) {
		return true;
	}
	let stem = name.split('.').next().unwrap_or(name).trim_end();
	let upper = stem.to_ascii_uppercase();
	match upper.as_str() {
		"CON" | "PRN" | "AUX" | "NUL" => true,
		_ => {
			let numbered = upper.strip_prefix("COM").or_else(|| upper.strip_prefix("LPT"));
			matches!(numbered, Some(d) if d.len() == 1 && matches!(d.as_bytes()[0], b'1'..=b'9'))
		}
	}
}
