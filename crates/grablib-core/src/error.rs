//! Error type shared by the fetch and build engines.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = GrablibError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum GrablibError {
    /// Pattern did not match the source. The archive mapper treats this as "rule not
    /// applicable"; for plain files it is fatal.
    #[error("pattern `{pattern}` does not match \"{source_key}\"")]
    NoMatch { source_key: String, pattern: String },

    #[error("destination template \"{template}\" resolves to an empty path")]
    BadTemplate { template: String },

    #[error("path \"{path}\" escapes root {}", root.display())]
    PathEscape { root: PathBuf, path: String },

    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid glob `{pattern}`: {message}")]
    InvalidGlob { pattern: String, message: String },

    #[error("\"{src}\" refers to the download root but none is configured")]
    NoDownloadRoot { src: String },

    #[error("failed to fetch {url}: {cause}")]
    FetchFailed { url: String, cause: String },

    #[error("failed to read archive {url}: {source}")]
    Archive {
        url: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to minify {}: {message}", path.display())]
    Minify { path: PathBuf, message: String },

    #[error("{errors} style file(s) failed to compile, {generated} generated")]
    StyleFailed { errors: usize, generated: usize },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("error downloading \"{url}\" to {target}")]
    Entry {
        url: String,
        target: String,
        #[source]
        source: Box<GrablibError>,
    },
}

impl GrablibError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GrablibError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, GrablibError::NoMatch { .. })
    }
}
