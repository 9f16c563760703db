//! # Spreadsheet-driven batch renaming
//!
//! Scan a folder into an Excel template, let someone edit the new names in
//! Excel, then preview and replay the sheet onto the folder with a backup and
//! a log. Rows are matched to files strictly by the `Current_Filename` column.

pub mod apply;
pub mod backup;
pub mod config;
pub mod error;
pub mod filter;
pub mod naming;
pub mod paths;
pub mod plan;
pub mod preview;
pub mod renamer;
pub mod scan;
pub mod template;

// Re-export main API types
pub use apply::{ApplyProgress, ApplyReport};
pub use config::{RenameMode, RenamerConfig};
pub use error::{RenamerError, RenamerResult, TemplateError};
pub use plan::{PlanAction, RenamePlan};
pub use preview::PreviewReport;
pub use renamer::Renamer;
