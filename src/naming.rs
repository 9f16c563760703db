//! New-name generation from a sheet row

use crate::config::RenameMode;
use crate::scan::has_extension;
use crate::template::TemplateRow;
use crate::template::writer::file_stem;

/// Build the new file name for `old_name` from a row.
///
/// The base is `New_Filename`, or the old stem when that cell is empty. Prefix
/// mode puts `Prefix` and the delimiter in front when a prefix is present.
/// The extension is appended unless the base already ends with it, spelled
/// the way the old name spells it so `LOUD.PDF` keeps its upper-case suffix.
pub fn target_name(
	row: &TemplateRow,
	old_name: &str,
	mode: RenameMode,
	extension: &str,
	delimiter: &str,
) -> String {
	let base = if row.new_filename.is_empty() {
		file_stem(old_name)
	} else {
		row.new_filename.as_str()
	};

	let new_base = match mode {
		RenameMode::Prefix if !row.prefix.is_empty() => {
			format!("{}{}{}", row.prefix, delimiter, base)
		}
		_ => base.to_string(),
	};

	if has_extension(&new_base, extension) {
		return new_base;
	}
	let suffix = if has_extension(old_name, extension) {
		&old_name[old_name.len() - extension.len()..]
	} else {
		extension
	};
	new_base + suffix
}
