//! Error types and utilities for epitrend

use std::path::PathBuf;
use thiserror::Error;

/// Boxed error used as the `source` of the struct variants.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for epitrend operations
pub type Result<T> = std::result::Result<T, EpiError>;

/// Main error type for epitrend operations
#[derive(Error, Debug)]
pub enum EpiError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        /// Human readable description.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<BoxedError>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input dataset does not exist at the configured location
    #[error("Source dataset not found: {}", path.display())]
    MissingSource {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// A column required by an operation is not part of the table
    #[error("Missing column: '{column}'")]
    MissingColumn {
        /// Name of the absent column.
        column: String,
    },

    /// Malformed tabular data (CSV/JSON parsing, inconsistent rows)
    #[error("Data error: {message}")]
    Data {
        /// Human readable description.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<BoxedError>,
    },

    /// Network related errors (remote dataset fetch)
    #[error("Network error: {message}")]
    Network {
        /// Human readable description.
        message: String,
        /// HTTP status code, when the server answered.
        status_code: Option<u16>,
        /// Underlying cause, if any.
        #[source]
        source: Option<BoxedError>,
    },

    /// Graph generation and plotting errors
    #[error("Graph error: {message}")]
    Graph {
        /// Human readable description.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<BoxedError>,
    },

    /// Validation errors for parameters or configuration values
    #[error("Validation error: {message}")]
    Validation {
        /// Human readable description.
        message: String,
        /// Offending field, when known.
        field: Option<String>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EpiError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a missing source error for the given path
    pub fn missing_source(path: impl Into<PathBuf>) -> Self {
        Self::MissingSource { path: path.into() }
    }

    /// Create a missing column error
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    /// Create a new data error
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new data error with source
    pub fn data_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Data {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new network error with HTTP status code
    pub fn network_with_status(msg: impl Into<String>, status: u16) -> Self {
        Self::Network {
            message: msg.into(),
            status_code: Some(status),
            source: None,
        }
    }

    /// Create a new network error with source
    pub fn network_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            message: msg.into(),
            status_code: None,
            source: Some(Box::new(source)),
        }
    }

    /// Create a new graph error
    pub fn graph(msg: impl Into<String>) -> Self {
        Self::Graph {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new graph error from an already boxed source.
    ///
    /// Plotters reports drawing failures through boxed trait objects rather
    /// than a concrete error type.
    pub fn graph_boxed(msg: impl Into<String>, source: BoxedError) -> Self {
        Self::Graph {
            message: msg.into(),
            source: Some(source),
        }
    }

    /// Create a new validation error for a specific field
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Check if this error means the input dataset is absent
    pub const fn is_missing_source(&self) -> bool {
        matches!(self, Self::MissingSource { .. })
    }

    /// Get the error category as a string for logging
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Io(_) => "io",
            Self::MissingSource { .. } => "missing_source",
            Self::MissingColumn { .. } => "missing_column",
            Self::Data { .. } => "data",
            Self::Network { .. } => "network",
            Self::Graph { .. } => "graph",
            Self::Validation { .. } => "validation",
            Self::Serialization(_) => "serialization",
        }
    }
}
