use log::warn;
use path_clean::PathClean;
use rocket::http::RawStr;
use std::path::{Component, Path, PathBuf};

use crate::common::errors::ServeError;
use crate::config::ServerConfig;
use crate::utils::encode_segments;

/// A request path mapped onto the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub fs_path: PathBuf,
    /// Mask-stripped, normalized, `/`-separated; empty for the share root.
    pub display: String,
}

impl ResolvedPath {
    pub fn is_root(&self) -> bool {
        self.display.is_empty()
    }

    /// Last display segment.
    pub fn name(&self) -> &str {
        self.display.rsplit('/').next().unwrap_or_default()
    }

    pub fn parent_display(&self) -> &str {
        self.display
            .rsplit_once('/')
            .map(|(parent, _)| parent)
            .unwrap_or_default()
    }
}

pub struct PathResolver<'a> {
    root: Option<&'a Path>,
    mask: Option<&'a str>,
}

impl<'a> PathResolver<'a> {
    pub fn new(config: &'a ServerConfig) -> Self {
        Self {
            root: config.root.as_deref(),
            mask: config.mask.as_deref(),
        }
    }

    pub fn resolve(&self, raw: &str) -> Result<ResolvedPath, ServeError> {
        let decoded = RawStr::new(raw).percent_decode_lossy();
        let path = decoded.strip_prefix('/').unwrap_or(&decoded);

        let remainder = match self.mask {
            Some(mask) => match path.strip_prefix(mask) {
                Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
                _ => {
                    warn!("Request outside the share prefix: {:?}", raw);
                    return Err(ServeError::NotFound(raw.to_string()));
                }
            },
            None => path,
        };

        let display = normalize(remainder.trim_matches('/')).ok_or_else(|| {
            warn!("Request escapes the share root: {:?}", raw);
            ServeError::NotFound(raw.to_string())
        })?;

        let fs_path = match (self.root, display.is_empty()) {
            (Some(root), true) => root.to_path_buf(),
            (Some(root), false) => root.join(&display),
            (None, true) => PathBuf::from("."),
            (None, false) => PathBuf::from(&display),
        };

        Ok(ResolvedPath { fs_path, display })
    }

    /// Absolute URL path for a display path, mask included.
    pub fn href(&self, display: &str) -> String {
        let encoded = encode_segments(display);
        match self.mask {
            Some(mask) if encoded.is_empty() => format!("/{}/", mask),
            Some(mask) => format!("/{}/{}", mask, encoded),
            None => format!("/{}", encoded),
        }
    }
}

/// Lexically clean a relative path; `None` when it would leave the root.
fn normalize(relative: &str) -> Option<String> {
    if relative.is_empty() {
        return Some(String::new());
    }
    let cleaned = Path::new(relative).clean();
    let mut segments = Vec::new();
    for component in cleaned.components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_str()?),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(segments.join("/"))
}
