use futures::stream::BoxStream;
use httpdate::{fmt_http_date, parse_http_date};
use rocket::Request;
use rocket::http::{Header, Status};
use rocket::response::content::{RawHtml, RawJson};
use rocket::response::stream::TextStream;
use rocket::response::{self, Redirect, Responder, Response};
use rocket_seek_stream::SeekStream;
use std::fs::File;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::common::errors::ServeError;

/// A regular file with range support, `Last-Modified` and `If-Modified-Since`.
pub struct StaticFile {
    stream: SeekStream<'static>,
    modified: Option<SystemTime>,
}

impl StaticFile {
    pub fn open(path: &Path) -> Result<Self, ServeError> {
        let stat_error = |source| ServeError::Stat {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(stat_error)?;
        let metadata = file.metadata().map_err(stat_error)?;
        let mime = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream");
        Ok(Self {
            stream: SeekStream::with_opts(tokio::fs::File::from_std(file), metadata.len(), mime),
            modified: metadata.modified().ok(),
        })
    }

    fn unchanged_since(&self, if_modified_since: Option<&str>) -> bool {
        let since = if_modified_since.and_then(|value| parse_http_date(value).ok());
        match (self.modified, since) {
            (Some(modified), Some(since)) => whole_seconds(modified) <= since,
            _ => false,
        }
    }
}

/// HTTP dates have second resolution.
fn whole_seconds(time: SystemTime) -> SystemTime {
    match time.duration_since(UNIX_EPOCH) {
        Ok(elapsed) => UNIX_EPOCH + Duration::from_secs(elapsed.as_secs()),
        Err(_) => time,
    }
}

impl<'r> Responder<'r, 'static> for StaticFile {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        if self.unchanged_since(req.headers().get_one("If-Modified-Since")) {
            return Response::build().status(Status::NotModified).ok();
        }
        let mut response = self.stream.respond_to(req)?;
        if let Some(modified) = self.modified {
            response.set_header(Header::new("Last-Modified", fmt_http_date(modified)));
        }
        Ok(response)
    }
}

#[derive(Responder)]
pub enum BrowseResponse {
    Landing(RawHtml<&'static str>),
    Html(RawHtml<String>),
    Json(RawJson<String>),
    File(StaticFile),
}

pub enum UploadReply<'r> {
    /// Bare `200 OK`.
    Stored,
    /// `303` back to the directory listing.
    SeeOther(Redirect),
    /// Percent lines while copies run, then one line per finished file.
    Progress(TextStream<BoxStream<'r, String>>),
}

impl<'r> Responder<'r, 'r> for UploadReply<'r> {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'r> {
        match self {
            UploadReply::Stored => Status::Ok.respond_to(req),
            UploadReply::SeeOther(redirect) => redirect.respond_to(req),
            UploadReply::Progress(stream) => stream.respond_to(req),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn if_modified_since_compares_whole_seconds() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.txt");
        fs::write(&path, "a").unwrap();
        let file = StaticFile::open(&path).unwrap();
        let modified = file.modified.unwrap();

        assert!(file.unchanged_since(Some(&fmt_http_date(modified))));
        assert!(file.unchanged_since(Some(&fmt_http_date(modified + Duration::from_secs(60)))));
        assert!(!file.unchanged_since(Some(&fmt_http_date(modified - Duration::from_secs(60)))));
        assert!(!file.unchanged_since(Some("not a date")));
        assert!(!file.unchanged_since(None));
    }

    #[test]
    fn missing_file_is_a_stat_error() {
        let tmp = TempDir::new().unwrap();
        let result = StaticFile::open(&tmp.path().join("gone.txt"));
        assert!(matches!(result, Err(ServeError::Stat { .. })));
    }
}
