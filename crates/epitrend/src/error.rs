//! Application-wide error types using thiserror.

use epitrend_common::EpiError;
use std::path::PathBuf;

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Failure inside one of the pipeline stages.
    #[error(transparent)]
    Pipeline(#[from] EpiError),

    /// An output directory could not be created.
    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    /// Error category for log output.
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Pipeline(err) => err.category(),
            Self::OutputDir { .. } => "io",
        }
    }
}

/// Result type for the application.
pub type AppResult<T> = Result<T, AppError>;
