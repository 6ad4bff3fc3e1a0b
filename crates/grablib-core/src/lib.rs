pub mod config;
pub mod error;
pub mod logging;
pub mod report;

// Fetch & placement
pub mod download;
pub mod fetch;
pub mod path_resolver;

// Asset pipeline
pub mod build;
pub mod minify;

pub use error::{GrablibError, Result};
