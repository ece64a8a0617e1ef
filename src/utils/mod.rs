use std::path::Path;

pub trait PathExt {
    fn ext_lower(&self) -> String;
    fn name_lossy(&self) -> String;
}

impl PathExt for Path {
    fn ext_lower(&self) -> String {
        self.extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
            .unwrap_or_default()
    }

    fn name_lossy(&self) -> String {
        self.file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Percent-encode each `/`-separated segment of a relative display path.
pub fn encode_segments(display: &str) -> String {
    display
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| rocket::http::RawStr::new(segment).percent_encode().to_string())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ext_lower_folds_case() {
        assert_eq!(Path::new("a/B.JPG").ext_lower(), "jpg");
        assert_eq!(Path::new("README").ext_lower(), "");
    }

    #[test]
    fn encode_segments_keeps_separators() {
        assert_eq!(encode_segments("my dir/a b.txt"), "my%20dir/a%20b.txt");
        assert_eq!(encode_segments(""), "");
    }
}
