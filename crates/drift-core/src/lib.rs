pub mod client;
pub mod config;
pub mod error;
pub mod manifest;
pub mod patch;
pub mod probe;
pub mod report;
pub mod runner;
pub mod target;
pub mod types;

pub use error::{DriftError, Result};
