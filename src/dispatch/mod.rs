//! Decision table for GET/HEAD, independent of the HTTP host.
//!
//! The browse handler describes the request as an [`Intent`], then
//! [`Intent::plan`] picks the [`Action`]. The filesystem is only consulted
//! (through the `stat` callback) when the answer depends on what the path
//! points at. POST never comes through here: Rocket's method routing sends it
//! straight to the upload handler.

use std::io;
use std::path::Path;

use crate::common::errors::ServeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    File,
    Directory,
}

impl Kind {
    /// Stat `path`, following symlinks. A missing target is `NotFound`, any
    /// other failure is a server-side `Stat` error.
    pub fn of(path: &Path) -> Result<Kind, ServeError> {
        match std::fs::metadata(path) {
            Ok(metadata) if metadata.is_dir() => Ok(Kind::Directory),
            Ok(_) => Ok(Kind::File),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(ServeError::NotFound(path.display().to_string()))
            }
            Err(source) => Err(ServeError::Stat {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Html,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Landing,
    Gallery,
    File,
    Listing(Format),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intent {
    /// Display path is the share root.
    pub root: bool,
    pub referer: bool,
    /// `view` query parameter present and non-empty.
    pub view: bool,
    /// Target name carries an image extension.
    pub image: bool,
    pub format: Format,
}

impl Intent {
    pub async fn plan<F, Fut>(&self, stat: F) -> Result<Action, ServeError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Kind, ServeError>>,
    {
        if self.root && !self.referer {
            return Ok(Action::Landing);
        }
        Ok(match (stat().await?, self.view && self.image) {
            (Kind::Directory, _) => Action::Listing(self.format),
            (Kind::File, true) => Action::Gallery,
            (Kind::File, false) => Action::File,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::{Ready, ready};

    fn read() -> Intent {
        Intent {
            root: false,
            referer: true,
            view: false,
            image: false,
            format: Format::Json,
        }
    }

    fn untouched() -> Ready<Result<Kind, ServeError>> {
        panic!("filesystem must not be consulted")
    }

    fn file() -> Ready<Result<Kind, ServeError>> {
        ready(Ok(Kind::File))
    }

    fn directory() -> Ready<Result<Kind, ServeError>> {
        ready(Ok(Kind::Directory))
    }

    #[tokio::test]
    async fn bare_root_visit_is_the_landing_page() {
        let intent = Intent { root: true, referer: false, ..read() };
        assert_eq!(intent.plan(untouched).await.unwrap(), Action::Landing);
    }

    #[tokio::test]
    async fn root_with_referer_is_a_listing() {
        let intent = Intent { root: true, ..read() };
        assert_eq!(intent.plan(directory).await.unwrap(), Action::Listing(Format::Json));
        let intent = Intent { format: Format::Html, ..intent };
        assert_eq!(intent.plan(directory).await.unwrap(), Action::Listing(Format::Html));
    }

    #[tokio::test]
    async fn gallery_needs_view_flag_and_image() {
        assert_eq!(read().plan(file).await.unwrap(), Action::File);
        assert_eq!(Intent { view: true, ..read() }.plan(file).await.unwrap(), Action::File);
        assert_eq!(Intent { image: true, ..read() }.plan(file).await.unwrap(), Action::File);
        assert_eq!(
            Intent { view: true, image: true, ..read() }.plan(file).await.unwrap(),
            Action::Gallery
        );
    }

    #[tokio::test]
    async fn directories_ignore_the_view_flag() {
        let intent = Intent { view: true, image: true, ..read() };
        assert_eq!(intent.plan(directory).await.unwrap(), Action::Listing(Format::Json));
    }

    #[test]
    fn kind_of_stats_the_filesystem() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("a.txt"), "a").unwrap();
        assert_eq!(Kind::of(tmp.path()).unwrap(), Kind::Directory);
        assert_eq!(Kind::of(&tmp.path().join("a.txt")).unwrap(), Kind::File);
        assert!(matches!(
            Kind::of(&tmp.path().join("gone")),
            Err(ServeError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn stat_failures_propagate() {
        let result = read()
            .plan(|| ready(Err(ServeError::NotFound("gone".into()))))
            .await;
        assert!(matches!(result, Err(ServeError::NotFound(_))));
    }
}
