use log::warn;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::common::errors::ServeError;
use crate::operations::classify::is_image;
use crate::operations::size::readable_size;

/// One child of a listed directory, as seen at listing time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    pub name: String,
    #[serde(rename = "isdir")]
    pub is_directory: bool,
    #[serde(rename = "isimage")]
    pub is_image: bool,
    /// Empty for directories.
    #[serde(rename = "size")]
    pub size_display: String,
}

/// Immediate children of `path` in the order the OS yields them.
///
/// Any failure aborts the whole listing; partial listings are never returned.
pub fn list_directory(path: &Path) -> Result<Vec<DirEntry>, ServeError> {
    let list_error = |source| ServeError::List {
        path: path.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for entry in fs::read_dir(path).map_err(list_error)? {
        let entry = entry.map_err(list_error)?;
        let name = entry.file_name().into_string().unwrap_or_else(|raw| {
            let lossy = raw.to_string_lossy().into_owned();
            warn!(
                "{:?} in {:?} is not valid UTF-8, listed as {:?} but not reachable by link",
                raw, path, lossy
            );
            lossy
        });
        let metadata = entry.metadata().map_err(list_error)?;

        // Symlinks count as what they point at; dangling ones stay files.
        let is_directory = if metadata.file_type().is_symlink() {
            fs::metadata(entry.path())
                .map(|target| target.is_dir())
                .unwrap_or(false)
        } else {
            metadata.is_dir()
        };

        let size_display = if is_directory {
            String::new()
        } else {
            readable_size(metadata.len())
        };

        entries.push(DirEntry {
            is_image: !is_directory && is_image(&name),
            name,
            is_directory,
            size_display,
        });
    }
    Ok(entries)
}
