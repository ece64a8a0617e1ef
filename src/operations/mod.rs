pub mod classify;
pub mod gallery;
pub mod ingest;
pub mod listing;
pub mod naming;
pub mod resolve;
pub mod size;
