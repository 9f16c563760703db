//! Persisted settings for the rename workflow

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::{RenamerError, RenamerResult};
use crate::paths::default_config_path;

/// How the new file name is assembled from a sheet row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RenameMode {
	/// `<Prefix><Delimiter><New_Filename><ext>`
	#[default]
	Prefix,
	/// `<New_Filename><ext>`
	Replace,
}

impl fmt::Display for RenameMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RenameMode::Prefix => write!(f, "Prefix"),
			RenameMode::Replace => write!(f, "Replace"),
		}
	}
}

impl FromStr for RenameMode {
	type Err = RenamerError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"prefix" => Ok(RenameMode::Prefix),
			"replace" => Ok(RenameMode::Replace),
			other => Err(RenamerError::Config(format!(
				"unknown rename mode '{other}', expected prefix or replace"
			))),
		}
	}
}

/// Settings for one run, persisted between runs as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenamerConfig {
	/// Spreadsheet with the `Rename Index` sheet
	pub template_path: Option<PathBuf>,
	/// Folder whose files get renamed
	pub target_folder: Option<PathBuf>,
	/// Only files with this extension take part, e.g. `.pdf`
	pub extension: String,
	pub mode: RenameMode,
	/// Placed between prefix and name in prefix mode
	pub delimiter: String,
	/// Copy every matched file into a `backup_*` folder before renaming
	pub backup: bool,
	/// Include subfolders
	pub recursive: bool,
	/// Pick up the newest template in the target folder when none is set
	pub auto_pull: bool,
	/// Extra glob patterns to leave out of scans
	pub exclude: Vec<String>,
	/// Preview-only apply: write the log but touch no files
	#[serde(skip)]
	pub dry_run: bool,
}

impl Default for RenamerConfig {
	fn default() -> Self {
		Self {
			template_path: None,
			target_folder: None,
			extension: ".pdf".to_string(),
			mode: RenameMode::Prefix,
			delimiter: "-".to_string(),
			backup: true,
			recursive: false,
			auto_pull: true,
			exclude: Vec::new(),
			dry_run: false,
		}
	}
}

impl RenamerConfig {
	/// Load settings from `path`. A missing file yields the defaults.
	pub fn load(path: &Path) -> RenamerResult<Self> {
		match fs::read_to_string(path) {
			Ok(text) => {
				debug!("Config: loaded {}", path.display());
				Ok(serde_json::from_str(&text)?)
			}
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
			Err(e) => Err(e.into()),
		}
	}

	/// Load from the default location, falling back to defaults on any problem
	pub fn load_or_default() -> Self {
		let Some(path) = default_config_path() else {
			return Self::default();
		};
		Self::load(&path).unwrap_or_else(|e| {
			warn!("Ignoring unreadable config {}: {}", path.display(), e);
			Self::default()
		})
	}

	/// Write settings as pretty JSON, via a temp file renamed into place.
	pub fn save(&self, path: &Path) -> RenamerResult<()> {
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)?;
		}
		let json = serde_json::to_string_pretty(self)?;
		let tmp = path.with_extension("json.tmp");
		fs::write(&tmp, json)?;

		#[cfg(windows)]
		if path.exists() {
			fs::remove_file(path)?;
		}
		fs::rename(&tmp, path)?;
		debug!("Config: saved {}", path.display());
		Ok(())
	}

	/// Save to the default location, if the platform has one
	pub fn save_default(&self) -> RenamerResult<()> {
		match default_config_path() {
			Some(path) => self.save(&path),
			None => Err(RenamerError::Config(
				"no config directory on this platform".to_string(),
			)),
		}
	}

	/// The configured extension in canonical `.ext` form
	pub fn normalized_extension(&self) -> RenamerResult<String> {
		normalize_extension(&self.extension)
	}
}

/// Trim and add the leading dot if the user left it out.
pub fn normalize_extension(ext: &str) -> RenamerResult<String> {
	let trimmed = ext.trim();
	let bare = trimmed.trim_start_matches('.');
	if bare.is_empty() || bare.contains(['/', '\\']) {
		return Err(RenamerError::InvalidExtension {
			extension: ext.to_string(),
		});
	}
	Ok(format!(".{bare}"))
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[test_log::test]
	fn test_defaults() {
		let config = RenamerConfig::default();
		assert_eq!(config.extension, ".pdf");
		assert_eq!(config.mode, RenameMode::Prefix);
		assert_eq!(config.delimiter, "-");
		assert!(config.backup);
		assert!(!config.recursive);
		assert!(!config.dry_run);
	}

	#[test_log::test]
	fn test_rename_mode_parse() {
		assert_eq!("prefix".parse::<RenameMode>().unwrap(), RenameMode::Prefix);
		assert_eq!("Replace".parse::<RenameMode>().unwrap(), RenameMode::Replace);
		assert!("suffix".parse::<RenameMode>().is_err());
		assert_eq!(RenameMode::Replace.to_string(), "Replace");
	}

	#[test_log::test]
	fn test_normalize_extension() {
		assert_eq!(normalize_extension("pdf").unwrap(), ".pdf");
		assert_eq!(normalize_extension(" .jpg ").unwrap(), ".jpg");
		assert!(normalize_extension("").is_err());
		assert!(normalize_extension(".").is_err());
		assert!(normalize_extension("a/b").is_err());
	}

	#[test_log::test]
	fn test_save_and_load_keeps_settings_but_not_dry_run() {
		let temp_dir = TempDir::new().unwrap();
		let path = temp_dir.path().join("nested").join("config.json");

		let config = RenamerConfig {
			target_folder: Some(PathBuf::from("/data/scans")),
			extension: ".jpg".to_string(),
			mode: RenameMode::Replace,
			delimiter: "_".to_string(),
			recursive: true,
			exclude: vec!["drafts/**".to_string()],
			dry_run: true,
			..RenamerConfig::default()
		};
		config.save(&path).unwrap();

		let loaded = RenamerConfig::load(&path).unwrap();
		assert_eq!(loaded.target_folder, config.target_folder);
		assert_eq!(loaded.mode, RenameMode::Replace);
		assert_eq!(loaded.exclude, vec!["drafts/**".to_string()]);
		assert!(!loaded.dry_run);
	}

	#[test_log::test]
	fn test_load_missing_and_partial() {
		let temp_dir = TempDir::new().unwrap();
		let missing = RenamerConfig::load(&temp_dir.path().join("none.json")).unwrap();
		assert_eq!(missing, RenamerConfig::default());

		let partial = temp_dir.path().join("partial.json");
		std::fs::write(&partial, r#"{ "delimiter": " ", "backup": false }"#).unwrap();
		let loaded = RenamerConfig::load(&partial).unwrap();
		assert_eq!(loaded.delimiter, " ");
		assert!(!loaded.backup);
		assert_eq!(loaded.extension, ".pdf");

		let corrupt = temp_dir.path().join("corrupt.json");
		std::fs::write(&corrupt, "{ not json").unwrap();
		assert!(matches!(
			RenamerConfig::load(&corrupt),
			Err(RenamerError::Serialization(_))
		));
	}
}
