//! Error types for the navex-core library.

use thiserror::Error;

/// Main error type for the extraction engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The acquisition collaborator could not supply any text.
    #[error("document unavailable: {0}")]
    DocumentUnavailable(String),

    /// Configuration error (bad thresholds, empty vocabulary, ...).
    #[error("configuration error: {0}")]
    Config(String),

    /// A configured pattern failed to compile.
    #[error("invalid pattern `{name}`: {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    /// Unexpected internal fault; caught at the orchestrator boundary
    /// and mapped to a `failed` result, never surfaced past it.
    #[error("pipeline failure: {0}")]
    Pipeline(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the navex-core library.
pub type Result<T> = std::result::Result<T, EngineError>;
