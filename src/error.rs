use std::path::PathBuf;

use thiserror::Error;

/// Failures the pipeline distinguishes. Only `InputUnavailable` and
/// `InvalidSource` abort a run; the rest are logged and degraded around.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("fetch failed for {url}: {reason}")]
    FetchFailure { url: String, reason: String },

    #[error("{what} not found in {path}")]
    StructureNotFound { what: &'static str, path: PathBuf },

    #[error("required input {path} is unavailable: {source}")]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {reason}")]
    InvalidSource { line: usize, reason: String },
}

impl ScrapeError {
    pub fn unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScrapeError::InputUnavailable {
            path: path.into(),
            source,
        }
    }
}

/// Read a file that the run cannot proceed without.
pub fn read_required(path: &std::path::Path) -> Result<String, ScrapeError> {
    std::fs::read_to_string(path).map_err(|e| ScrapeError::unavailable(path, e))
}
