use crate::common::errors::ServeError;
use crate::operations::classify::is_image;
use crate::operations::listing::DirEntry;

/// Everything the gallery page needs for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryView {
    pub current_name: String,
    /// Display path of the image itself.
    pub display_path: String,
    pub previous_name: Option<String>,
    pub next_name: Option<String>,
}

impl GalleryView {
    pub fn build(
        entries: &[DirEntry],
        current_name: &str,
        display_path: &str,
    ) -> Result<Self, ServeError> {
        let (previous_name, next_name) = neighbours(entries, current_name)?;
        Ok(Self {
            current_name: current_name.to_string(),
            display_path: display_path.to_string(),
            previous_name,
            next_name,
        })
    }
}

/// Images directly before and after `target` in listing order. No wraparound.
pub fn neighbours(
    entries: &[DirEntry],
    target: &str,
) -> Result<(Option<String>, Option<String>), ServeError> {
    let mut images = entries
        .iter()
        .filter(|entry| !entry.is_directory && is_image(&entry.name))
        .map(|entry| entry.name.as_str());

    let mut previous = None;
    loop {
        match images.next() {
            Some(name) if name == target => {
                let next = images.next().map(str::to_string);
                return Ok((previous.map(str::to_string), next));
            }
            Some(name) => previous = Some(name),
            None => return Err(ServeError::ImageNotFound(target.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> DirEntry {
        DirEntry {
            name: name.to_string(),
            is_directory: false,
            is_image: is_image(name),
            size_display: "1.00KB".to_string(),
        }
    }

    fn dir(name: &str) -> DirEntry {
        DirEntry {
            name: name.to_string(),
            is_directory: true,
            is_image: false,
            size_display: String::new(),
        }
    }

    fn listing() -> Vec<DirEntry> {
        vec![
            file("notes.txt"),
            file("1.jpg"),
            dir("2005.png"),
            file("2.png"),
            file("readme.md"),
            file("3.jpg"),
        ]
    }

    #[test]
    fn middle_image_has_both_neighbours() {
        let (previous, next) = neighbours(&listing(), "2.png").unwrap();
        assert_eq!(previous.as_deref(), Some("1.jpg"));
        assert_eq!(next.as_deref(), Some("3.jpg"));
    }

    #[test]
    fn ends_do_not_wrap() {
        let (previous, next) = neighbours(&listing(), "1.jpg").unwrap();
        assert_eq!(previous, None);
        assert_eq!(next.as_deref(), Some("2.png"));

        let (previous, next) = neighbours(&listing(), "3.jpg").unwrap();
        assert_eq!(previous.as_deref(), Some("2.png"));
        assert_eq!(next, None);
    }

    #[test]
    fn unknown_or_non_image_targets_fail() {
        for target in ["4.jpg", "notes.txt", "2005.png"] {
            assert!(matches!(
                neighbours(&listing(), target),
                Err(ServeError::ImageNotFound(_))
            ));
        }
    }

    #[test]
    fn single_image_has_no_neighbours() {
        let view = GalleryView::build(&[file("only.webp")], "only.webp", "pics/only.webp").unwrap();
        assert_eq!(view.current_name, "only.webp");
        assert_eq!(view.display_path, "pics/only.webp");
        assert_eq!(view.previous_name, None);
        assert_eq!(view.next_name, None);
    }
}
