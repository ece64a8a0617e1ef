pub mod guards;

use log::info;
use rocket::fairing::AdHoc;

/// One line per answered request.
pub fn access_log_fairing() -> AdHoc {
    AdHoc::on_response("Access log", |req, res| {
        Box::pin(async move {
            info!("{} {} {}", req.method(), req.uri(), res.status());
        })
    })
}
