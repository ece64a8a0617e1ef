use anyhow::anyhow;
use rocket::Request;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};

use crate::api::GuardError;
use crate::config::ServerConfig;
use crate::dispatch::Format;
use crate::operations::resolve::{PathResolver, ResolvedPath};

/// The request path resolved against the share, plus the header facts the
/// dispatcher branches on.
pub struct GuardTarget {
    pub resolved: ResolvedPath,
    pub referer: bool,
    pub format: Format,
    pub prefers_html: bool,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for GuardTarget {
    type Error = GuardError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(config) = req.rocket().state::<ServerConfig>() else {
            return Outcome::Error((
                Status::InternalServerError,
                GuardError {
                    status: Status::InternalServerError,
                    error: anyhow!("ServerConfig is not managed"),
                },
            ));
        };

        match PathResolver::new(config).resolve(req.uri().path().as_str()) {
            Ok(resolved) => {
                let preferred = req.accept().map(|accept| accept.preferred().media_type());
                Outcome::Success(GuardTarget {
                    resolved,
                    referer: req.headers().get_one("Referer").is_some(),
                    format: match preferred {
                        Some(media) if media.is_json() => Format::Json,
                        _ => Format::Html,
                    },
                    prefers_html: preferred.is_some_and(|media| media.is_html()),
                })
            }
            Err(err) => {
                let err = GuardError::from(err);
                Outcome::Error((err.status, err))
            }
        }
    }
}
