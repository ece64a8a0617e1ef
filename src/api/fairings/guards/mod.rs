pub mod limit;
pub mod target;
