use std::io;
use std::path::PathBuf;

use rocket::http::Status;
use thiserror::Error;

/// Every failure a request can end in. Clients only ever see `status()`.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("path not found: {0}")]
    NotFound(String),

    #[error("failed to stat {path:?}")]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to list {path:?}")]
    List {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("image '{0}' is not in its own directory listing")]
    ImageNotFound(String),

    #[error("upload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: u64 },

    #[error("malformed upload: {0}")]
    MalformedUpload(String),

    #[error("failed to store upload at {path:?}")]
    Ingest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to render response")]
    Render(#[from] serde_json::Error),
}

impl ServeError {
    pub fn status(&self) -> Status {
        match self {
            ServeError::NotFound(_) | ServeError::ImageNotFound(_) => Status::NotFound,
            ServeError::Stat { .. } | ServeError::List { .. } | ServeError::Ingest { .. } => {
                Status::ExpectationFailed
            }
            ServeError::PayloadTooLarge { .. } => Status::PayloadTooLarge,
            ServeError::MalformedUpload(_) => Status::BadRequest,
            ServeError::Render(_) => Status::InternalServerError,
        }
    }
}
