use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use crate::common::{
    DEFAULT_PORT, DEFAULT_PROGRESS_INTERVAL, DEFAULT_SHUTDOWN_GRACE, DEFAULT_UPLOAD_LIMIT,
    MASK_LENGTH,
};

/// Share a directory over the local network.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Directory to serve (defaults to the working directory)
    pub root: Option<PathBuf>,
}

/// Overrides read from `SHARE_*` environment variables (and `.env`).
#[derive(Debug, Default, Deserialize)]
struct EnvOverrides {
    address: Option<IpAddr>,
    port: Option<u16>,
    upload_limit: Option<u64>,
    progress_interval_ms: Option<u64>,
    shutdown_grace: Option<u32>,
    mask: Option<bool>,
}

/// Process-wide settings. Built once in `main`, then only read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    /// Served directory; requests resolve against the working directory when absent.
    pub root: Option<PathBuf>,
    /// Secret first path segment every request must carry.
    pub mask: Option<String>,
    pub upload_limit: u64,
    pub progress_interval: Duration,
    pub shutdown_grace: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            root: None,
            mask: None,
            upload_limit: DEFAULT_UPLOAD_LIMIT,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();
        let cli = Cli::parse();
        let overrides = envy::prefixed("SHARE_")
            .from_env::<EnvOverrides>()
            .context("Failed to read SHARE_* environment variables")?;
        Self::assemble(cli, overrides)
    }

    fn assemble(cli: Cli, overrides: EnvOverrides) -> Result<Self> {
        let defaults = Self::default();

        if let Some(root) = &cli.root {
            if !root.is_dir() {
                anyhow::bail!("{} is not a directory", root.display());
            }
        }

        let mask = overrides
            .mask
            .unwrap_or(cli.root.is_some())
            .then(generate_mask);

        Ok(Self {
            address: overrides.address.unwrap_or(defaults.address),
            port: overrides.port.unwrap_or(defaults.port),
            root: cli.root,
            mask,
            upload_limit: overrides.upload_limit.unwrap_or(defaults.upload_limit),
            progress_interval: overrides
                .progress_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.progress_interval),
            shutdown_grace: overrides.shutdown_grace.unwrap_or(defaults.shutdown_grace),
        })
    }

    /// URL prefix (always ending in `/`) under which the share is reachable.
    pub fn url_prefix(&self) -> String {
        match &self.mask {
            Some(mask) => format!("/{}/", mask),
            None => "/".to_string(),
        }
    }
}

pub fn generate_mask() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(MASK_LENGTH)
        .map(char::from)
        .collect()
}
