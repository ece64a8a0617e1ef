#[macro_use]
extern crate rocket;
use anyhow::Result;
use log::{error, info};

mod api;
mod bootstrap;
mod common;
mod config;
mod dispatch;
mod operations;
mod utils;
mod views;

use crate::common::ROCKET_RUNTIME;
use crate::config::ServerConfig;
use api::fairings::access_log_fairing;
use api::handlers::{generate_browse_routes, generate_catchers, generate_upload_routes};
use bootstrap::banner::print_banner;
use bootstrap::logger::initialize_logger;
use rocket::data::Limits;

fn build_rocket(config: ServerConfig) -> rocket::Rocket<rocket::Build> {
    let limits = Limits::default()
        .limit("data-form", config.upload_limit.into())
        .limit("file", config.upload_limit.into());
    let figment = rocket::Config::figment()
        .merge(("address", config.address))
        .merge(("port", config.port))
        .merge(("limits", limits))
        .merge(("shutdown.ctrlc", false))
        .merge(("shutdown.grace", config.shutdown_grace));

    rocket::custom(figment)
        .manage(config)
        .attach(access_log_fairing())
        .mount("/", generate_browse_routes())
        .mount("/", generate_upload_routes())
        .register("/", generate_catchers())
}

fn main() -> Result<()> {
    initialize_logger();
    let config = ServerConfig::load()?;
    print_banner(&config);

    ROCKET_RUNTIME.block_on(async {
        let rocket_instance = build_rocket(config).ignite().await?;
        let shutdown_handle = rocket_instance.shutdown();
        ROCKET_RUNTIME.spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Interrupt received, finishing in-flight requests");
                    shutdown_handle.notify();
                }
                Err(err) => error!("Could not listen for Ctrl-C: {}", err),
            }
        });
        rocket_instance.launch().await?;
        Ok::<(), anyhow::Error>(())
    })
}
