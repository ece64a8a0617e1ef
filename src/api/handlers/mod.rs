use rocket::http::Status;
use rocket::{Catcher, Request, Route};

pub mod browse;
pub mod upload;

pub fn generate_browse_routes() -> Vec<Route> {
    routes![browse::browse]
}

pub fn generate_upload_routes() -> Vec<Route> {
    routes![upload::upload]
}

pub fn generate_catchers() -> Vec<Catcher> {
    catchers![bare_status]
}

/// Errors carry no body; the status code is the whole answer.
#[catch(default)]
fn bare_status(status: Status, _req: &Request<'_>) -> (Status, ()) {
    (status, ())
}
