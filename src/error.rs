//! Error types for the spreadsheet-driven renamer

use std::path::PathBuf;
use thiserror::Error;

/// Error type covering every failure mode of the rename workflow.
///
/// `RenamerError` is what the public workflow API returns. Most variants carry
/// the offending path or value so the CLI can print a message a non-technical
/// user can act on.
///
/// ## Error Categories
///
/// ### I/O Errors
/// Filesystem failures while scanning, copying backups or writing the log.
///
/// ### Template Errors
/// Problems with the spreadsheet itself: locked by Excel, missing the
/// `Rename Index` sheet, missing the `Current_Filename` column, unreadable.
///
/// ### Input Errors
/// Rejected paths, bad extensions, invalid exclude patterns, or a target folder
/// that does not exist.
///
/// ## Error Handling Patterns
///
/// ```rust,no_run
/// use sheet_rename::{RenamerConfig, Renamer, RenamerError, TemplateError};
///
/// let renamer = Renamer::new(RenamerConfig::default());
/// match renamer.preview() {
///     Ok(report) => println!("{report}"),
///     Err(RenamerError::Template(TemplateError::Locked { path })) => {
///         eprintln!("close {} in Excel and try again", path.display());
///     }
///     Err(err) => eprintln!("error: {err}"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum RenamerError {
	/// File system I/O errors
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// Spreadsheet template errors
	#[error("Template error: {0}")]
	Template(#[from] TemplateError),

	/// Configuration validation errors with descriptive messages
	#[error("Configuration error: {0}")]
	Config(String),

	/// A path that points at a network share or tries to climb out with `..`
	#[error("Invalid or unsafe path: {path}")]
	UnsafePath { path: PathBuf },

	/// The folder to scan or rename in does not exist
	#[error("Target folder not found: {path}")]
	FolderNotFound { path: PathBuf },

	/// No template was given and none could be pulled from the target folder
	#[error("No template with a 'Rename Index' sheet found in {folder}")]
	NoTemplate { folder: PathBuf },

	/// A template write would replace an existing workbook
	#[error("{path} already exists, refusing to overwrite it")]
	OutputExists { path: PathBuf },

	/// File extension that cannot be used as a filename suffix
	#[error("Invalid file extension '{extension}', expected something like .pdf")]
	InvalidExtension { extension: String },

	/// Invalid glob pattern syntax in exclude filters
	#[error("Invalid glob pattern '{pattern}': {reason}")]
	InvalidGlobPattern { pattern: String, reason: String },

	/// Config file serialization/deserialization errors
	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

/// Spreadsheet-specific errors
#[derive(Debug, Error)]
pub enum TemplateError {
	#[error(
		"{path} is currently open in Excel or another program. Close the file and try again."
	)]
	Locked { path: PathBuf },

	#[error("{path} has no sheet named '{sheet}'")]
	MissingSheet { path: PathBuf, sheet: String },

	#[error("Sheet is missing the required column '{column}'")]
	MissingColumn { column: String },

	#[error("Unsupported spreadsheet format: {path}")]
	UnsupportedFormat { path: PathBuf },

	#[error("Could not read workbook: {0}")]
	Read(#[from] calamine::Error),

	#[error("Could not write workbook: {0}")]
	Write(#[from] rust_xlsxwriter::XlsxError),

	#[error("Template I/O error: {0}")]
	Io(#[from] std::io::Error),
}

/// Convenience type alias for Results of the rename workflow.
pub type RenamerResult<T> = Result<T, RenamerError>;

/// Convenience type alias for template read/write results.
pub type TemplateResult<T> = Result<T, TemplateError>;
