use futures::StreamExt;
use log::{error, warn};
use rocket::State;
use rocket::form::{self, Form};
use rocket::fs::TempFile;
use rocket::http::Status;
use rocket::response::Redirect;
use rocket::response::stream::TextStream;
use std::path::PathBuf;
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::api::fairings::guards::limit::GuardBodyLimit;
use crate::api::fairings::guards::target::GuardTarget;
use crate::api::responders::UploadReply;
use crate::api::AppResult;
use crate::common::errors::ServeError;
use crate::config::ServerConfig;
use crate::operations::ingest::{UploadIngester, UploadPart};
use crate::operations::naming::sanitize_filename;
use crate::operations::resolve::PathResolver;
use crate::utils::PathExt;

#[derive(FromForm, Debug)]
pub struct UploadForm<'r> {
    #[field(name = "file")]
    pub files: Vec<TempFile<'r>>,
    /// Client modification times in milliseconds, parallel to `files`.
    #[field(name = "lastModified")]
    pub last_modified: Vec<u64>,
}

/// Both request guards fail the request outright, so a path outside the share
/// or an oversized declared body is refused before any of the body is read.
#[post("/<_..>?<progress>", data = "<form>")]
pub async fn upload<'r>(
    target: GuardTarget,
    _limit: GuardBodyLimit,
    config: &State<ServerConfig>,
    progress: Option<&str>,
    form: form::Result<'r, Form<UploadForm<'r>>>,
) -> AppResult<UploadReply<'r>> {
    let form = match form {
        Ok(form) => form.into_inner(),
        Err(errors) => return Err(form_error(&errors, config.upload_limit).into()),
    };
    if !form.last_modified.is_empty() && form.last_modified.len() != form.files.len() {
        return Err(ServeError::MalformedUpload(format!(
            "{} lastModified values for {} files",
            form.last_modified.len(),
            form.files.len()
        ))
        .into());
    }
    if form.files.is_empty() {
        warn!("Upload to {:?} carried no files", target.resolved.display);
    }

    let ingester = UploadIngester::new(target.resolved.fs_path.clone(), config.progress_interval);

    if progress.is_some_and(|value| !value.is_empty()) {
        return Ok(UploadReply::Progress(progress_stream(ingester, form)));
    }

    for (index, file) in form.files.iter().enumerate() {
        ingest_file(&ingester, file, form.last_modified.get(index).copied(), None).await?;
    }

    if target.prefers_html {
        let location = PathResolver::new(config).href(&target.resolved.display);
        Ok(UploadReply::SeeOther(Redirect::to(location)))
    } else {
        Ok(UploadReply::Stored)
    }
}

fn form_error(errors: &form::Errors<'_>, limit: u64) -> anyhow::Error {
    let detail = errors
        .iter()
        .map(|err| err.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    let too_large = errors
        .iter()
        .any(|err| err.status() == Status::PayloadTooLarge);
    let cause = if too_large {
        ServeError::PayloadTooLarge { limit }
    } else {
        ServeError::MalformedUpload(detail.clone())
    };
    anyhow::Error::new(cause).context(format!("Failed to parse upload form: {}", detail))
}

async fn ingest_file(
    ingester: &UploadIngester,
    file: &TempFile<'_>,
    last_modified: Option<u64>,
    progress: Option<&UnboundedSender<u8>>,
) -> Result<PathBuf, ServeError> {
    let raw = file
        .raw_name()
        .map(|name| name.dangerous_unsafe_unsanitized_raw().as_str())
        .unwrap_or_default();
    let filename = sanitize_filename(raw)?;
    let reader = file.open().await.map_err(|source| ServeError::Ingest {
        path: ingester.directory().join(&filename),
        source,
    })?;
    let part = UploadPart {
        filename,
        size: file.len(),
        last_modified,
        reader: Box::pin(reader),
    };
    ingester.ingest(part, progress).await
}

enum Event {
    Percent(u8),
    Finished(Result<PathBuf, ServeError>),
}

/// One percent line per tick, `done <name>` after each file and a final
/// `error` line if a file could not be stored. Later files are skipped after
/// an error.
fn progress_stream<'r>(
    ingester: UploadIngester,
    form: UploadForm<'r>,
) -> TextStream<futures::stream::BoxStream<'r, String>> {
    let stream = TextStream! {
        for (index, file) in form.files.iter().enumerate() {
            let (sender, mut receiver) = mpsc::unbounded_channel();
            let last_modified = form.last_modified.get(index).copied();
            let ingest = ingest_file(&ingester, file, last_modified, Some(&sender));
            tokio::pin!(ingest);

            let mut failed = false;
            loop {
                let event = tokio::select! {
                    result = &mut ingest => Event::Finished(result),
                    Some(percent) = receiver.recv() => Event::Percent(percent),
                };
                match event {
                    Event::Percent(percent) => yield format!("{}\n", percent),
                    Event::Finished(Ok(path)) => {
                        yield format!("done {}\n", path.name_lossy());
                        break;
                    }
                    Event::Finished(Err(err)) => {
                        error!("Upload into {:?} failed: {:#}", ingester.directory(), anyhow::Error::new(err));
                        yield "error\n".to_string();
                        failed = true;
                        break;
                    }
                }
            }
            if failed {
                break;
            }
        }
    };
    TextStream(stream.0.boxed())
}
