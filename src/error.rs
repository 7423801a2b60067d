//! Error types for anchorleg.
//!
//! Only whole-run problems are errors. Slots that cannot be filled and
//! post-run constraint findings are reported inside
//! [`OptimizationResult`](crate::model::OptimizationResult).

use thiserror::Error;

use crate::data::validate::ValidationReport;

/// Fatal errors raised before any search work begins.
#[derive(Debug, Error)]
pub enum OptimizeError {
    /// The roster or slate makes some slot statically impossible.
    #[error("precondition failed: {}", .0.summary())]
    Precondition(ValidationReport),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors reading or writing meet files.
#[derive(Debug, Error)]
pub enum MeetError {
    #[error("unable to access '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse meet json '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
