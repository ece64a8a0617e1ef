pub mod errors;

use std::sync::LazyLock;
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};

pub const KB: u64 = 1024;
pub const MB: u64 = KB * KB;
pub const GB: u64 = MB * KB;

/// Copy granularity for uploads; progress is measured in these steps.
pub const CHUNK_SIZE: usize = 64 * KB as usize;

pub const DEFAULT_PORT: u16 = 5999;

pub const DEFAULT_UPLOAD_LIMIT: u64 = 24 * GB;

pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

pub const DEFAULT_SHUTDOWN_GRACE: u32 = 5;

pub const MASK_LENGTH: usize = 16;

/// Exclusive-create attempts before an upload gives up on a name.
pub const MAX_CREATE_ATTEMPTS: u32 = 16;

/// Multipart field carrying the uploaded files.
pub const UPLOAD_FIELD: &str = "file";

pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "jfif", "jpe", "png", "gif", "bmp", "webp", "avif", "svg", "ico",
];

// Rocket-specific Tokio Runtime
// Request handling, uploads and the shutdown watcher all run here.
pub static ROCKET_RUNTIME: LazyLock<Runtime> = LazyLock::new(|| {
    Builder::new_multi_thread()
        .thread_name("rocket-io-worker")
        .enable_all()
        .build()
        .expect("Failed to build Rocket Tokio runtime")
});
