use rocket::State;
use rocket::response::content::{RawHtml, RawJson};
use std::io;
use std::path::{Path, PathBuf};
use tokio::task::spawn_blocking;

use crate::api::AppResult;
use crate::api::GuardResult;
use crate::api::fairings::guards::target::GuardTarget;
use crate::api::responders::{BrowseResponse, StaticFile};
use crate::common::errors::ServeError;
use crate::config::ServerConfig;
use crate::dispatch::{Action, Format, Intent, Kind};
use crate::operations::classify::is_image;
use crate::operations::gallery::GalleryView;
use crate::operations::listing::list_directory;
use crate::operations::resolve::PathResolver;
use crate::views::{LANDING_PAGE, gallery_page, listing_page};

#[get("/<_..>?<view>")]
pub async fn browse(
    target: GuardResult<GuardTarget>,
    config: &State<ServerConfig>,
    view: Option<&str>,
) -> AppResult<BrowseResponse> {
    let target = target?;
    let resolved = target.resolved;
    let intent = Intent {
        root: resolved.is_root(),
        referer: target.referer,
        view: view.is_some_and(|value| !value.is_empty()),
        image: is_image(resolved.name()),
        format: target.format,
    };
    let resolver = PathResolver::new(config);

    match intent.plan(|| stat(resolved.fs_path.clone())).await? {
        Action::Landing => Ok(BrowseResponse::Landing(RawHtml(LANDING_PAGE))),
        Action::File => {
            let path = resolved.fs_path.clone();
            let file = spawn_blocking(move || StaticFile::open(&path)).await??;
            Ok(BrowseResponse::File(file))
        }
        Action::Listing(format) => {
            let directory = resolved.fs_path.clone();
            let entries = spawn_blocking(move || list_directory(&directory)).await??;
            match format {
                Format::Json => {
                    let body = serde_json::to_string(&entries).map_err(ServeError::from)?;
                    Ok(BrowseResponse::Json(RawJson(body)))
                }
                Format::Html => {
                    let page = listing_page(&resolver, &resolved.display, &entries);
                    Ok(BrowseResponse::Html(RawHtml(page.into_string())))
                }
            }
        }
        Action::Gallery => {
            let directory = containing_directory(&resolved.fs_path);
            let entries = spawn_blocking(move || list_directory(&directory)).await??;
            let view = GalleryView::build(&entries, resolved.name(), &resolved.display)?;
            let page = gallery_page(&resolver, resolved.parent_display(), &view);
            Ok(BrowseResponse::Html(RawHtml(page.into_string())))
        }
    }
}

/// `Kind::of` on the blocking pool.
async fn stat(path: PathBuf) -> Result<Kind, ServeError> {
    let target = path.clone();
    spawn_blocking(move || Kind::of(&target))
        .await
        .map_err(|err| ServeError::Stat {
            path,
            source: io::Error::other(err),
        })?
}

/// A bare relative file name has an empty parent, which means `.`.
fn containing_directory(path: &Path) -> PathBuf {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
