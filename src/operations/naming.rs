use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::common::errors::ServeError;

/// First path that does not exist yet: `name`, `name (1)`, `name (2)`, ...
/// The number goes before the extension: `a.txt` -> `a (1).txt`.
///
/// Only an existence check; callers that need exclusion must create the file
/// with `create_new` and ask again when that loses a race.
pub fn allocate_filename(desired: &Path) -> PathBuf {
    if !desired.exists() {
        return desired.to_path_buf();
    }

    let stem = desired.file_stem().map(OsString::from).unwrap_or_default();
    let extension = desired.extension();

    let mut counter = 1u64;
    loop {
        let mut name = stem.clone();
        name.push(format!(" ({})", counter));
        if let Some(extension) = extension {
            name.push(".");
            name.push(extension);
        }
        let candidate = desired.with_file_name(name);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Reduce a client supplied filename to a single safe path component.
pub fn sanitize_filename(raw: &str) -> Result<String, ServeError> {
    let name = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches('\0');
    match name {
        "" | "." | ".." => Err(ServeError::MalformedUpload(format!(
            "unusable filename {:?}",
            raw
        ))),
        name => Ok(name.to_string()),
    }
}
