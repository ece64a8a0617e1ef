pub mod fairings;
pub mod handlers;
pub mod responders;

use log::error;
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder, Response};

use crate::common::errors::ServeError;

#[derive(Debug)]
pub struct AppError {
    pub status: Status,
    pub error: anyhow::Error,
}

#[rocket::async_trait]
impl<'r, 'o: 'r> Responder<'r, 'o> for AppError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        // Full chain stays in the log; the client only learns the status.
        error!("{} {} -> {}: {:#}", req.method(), req.uri(), self.status, self.error);
        Response::build().status(self.status).ok()
    }
}

impl<E> From<E> for AppError
where
    anyhow::Error: From<E>,
{
    fn from(err: E) -> Self {
        let error = anyhow::Error::from(err);
        let status = error
            .chain()
            .find_map(|cause| cause.downcast_ref::<ServeError>())
            .map(ServeError::status)
            .unwrap_or(Status::InternalServerError);
        AppError { status, error }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct GuardError {
    pub status: Status,
    pub error: anyhow::Error,
}

impl From<GuardError> for AppError {
    fn from(err: GuardError) -> Self {
        AppError {
            status: err.status,
            error: err.error,
        }
    }
}

impl From<ServeError> for GuardError {
    fn from(err: ServeError) -> Self {
        GuardError {
            status: err.status(),
            error: err.into(),
        }
    }
}

pub type GuardResult<T> = Result<T, GuardError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn status_comes_from_the_taxonomy() {
        let err: AppError = ServeError::NotFound("a".into()).into();
        assert_eq!(err.status, Status::NotFound);

        let wrapped: anyhow::Result<()> =
            Err(ServeError::PayloadTooLarge { limit: 1 }).context("while parsing form");
        let err: AppError = wrapped.unwrap_err().into();
        assert_eq!(err.status, Status::PayloadTooLarge);
    }

    #[test]
    fn unknown_errors_are_internal() {
        let err: AppError = std::io::Error::other("boom").into();
        assert_eq!(err.status, Status::InternalServerError);
    }

    #[test]
    fn guard_errors_keep_their_status() {
        let guard: GuardError = ServeError::NotFound("/Y".into()).into();
        let err: AppError = guard.into();
        assert_eq!(err.status, Status::NotFound);
    }
}
