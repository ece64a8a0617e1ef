use log::warn;
use rocket::Request;
use rocket::request::{FromRequest, Outcome};

use crate::api::GuardError;
use crate::common::DEFAULT_UPLOAD_LIMIT;
use crate::common::errors::ServeError;
use crate::config::ServerConfig;

/// Refuses a body whose declared length is over the upload limit before any
/// of it is read. Bodies without `Content-Length` are capped by Rocket's
/// form limits instead.
pub struct GuardBodyLimit;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for GuardBodyLimit {
    type Error = GuardError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let limit = req
            .rocket()
            .state::<ServerConfig>()
            .map(|config| config.upload_limit)
            .unwrap_or(DEFAULT_UPLOAD_LIMIT);
        let declared = req
            .headers()
            .get_one("Content-Length")
            .and_then(|value| value.parse::<u64>().ok());

        match declared {
            Some(length) if length > limit => {
                warn!("Refused {} byte upload, limit is {}", length, limit);
                let err = GuardError::from(ServeError::PayloadTooLarge { limit });
                Outcome::Error((err.status, err))
            }
            _ => Outcome::Success(GuardBodyLimit),
        }
    }
}
