use std::path::Path;

use crate::common::IMAGE_EXTENSIONS;
use crate::utils::PathExt;

pub fn is_image(name: impl AsRef<Path>) -> bool {
    IMAGE_EXTENSIONS.contains(&name.as_ref().ext_lower().as_str())
}
