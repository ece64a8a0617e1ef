use crate::common::{GB, KB, MB};

/// Two-decimal human readable size, e.g. `1536` -> `1.50KB`.
pub fn readable_size(length: u64) -> String {
    let value = length as f64;
    let (value, unit) = match length {
        l if l >= GB => (value / GB as f64, "GB"),
        l if l >= MB => (value / MB as f64, "MB"),
        l if l >= KB => (value / KB as f64, "KB"),
        _ => (value, "B"),
    };
    format!("{:.2}{}", value, unit)
}
