//! Orchestrator error taxonomy
//!
//! Only three kinds cross the crate boundary: `KeyExhausted` (no usable
//! credential remains), `UnsupportedFormat`, and fatal remote errors
//! surfaced unchanged. Quota and transient failures are absorbed inside
//! the analyze loop.

use remote::{ErrorClass, RemoteError, classify, classify_message};
use thiserror::Error;

/// Errors from analysis operations.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("all API keys exhausted")]
    KeyExhausted,

    #[error("unsupported media format: {0}")]
    UnsupportedFormat(String),

    #[error("remote processing failed, file state: {0}")]
    RemoteProcessingFailed(String),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Result alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Classify a failed transaction for the retry loop.
///
/// Remote errors use the structured classifier; everything else falls back
/// to message-text matching so the loop behaves identically whether a
/// vendor surfaced a typed status or a bare string.
pub fn classify_failure(error: &AnalyzerError) -> ErrorClass {
    match error {
        AnalyzerError::Remote(remote) => classify(remote),
        other => classify_message(&other.to_string()),
    }
}
