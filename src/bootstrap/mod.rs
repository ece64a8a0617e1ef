pub mod banner;
pub mod logger;
