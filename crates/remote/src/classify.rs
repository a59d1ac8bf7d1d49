//! Failure classification for retry decisions
//!
//! Distinguishes credential exhaustion (rotate to the next key), transient
//! network drops (backoff and retry on the same session), and everything
//! else (fatal, surfaced to the caller). Matching is case-insensitive
//! substring matching on the rendered error text; structured HTTP statuses
//! take a fast path so a 429 is never misread.

use crate::RemoteError;

/// Message fragments that indicate quota exhaustion or credential
/// rejection. Any match means the current key is done for this run.
const QUOTA_OR_AUTH_PATTERNS: &[&str] = &["429", "403", "exhausted", "quota"];

/// Message fragments that indicate a transient network failure worth
/// retrying on the same session.
const TRANSIENT_PATTERNS: &[&str] = &["disconnected"];

/// What the orchestrator should do about a failed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Key is exhausted or rejected: mark it, rotate the session.
    QuotaOrAuth,
    /// Network hiccup: backoff and retry on the same session.
    Transient,
    /// Unrecognized: surface to the caller unchanged.
    Fatal,
}

/// Classify raw error text by substring matching.
pub fn classify_message(message: &str) -> ErrorClass {
    let lower = message.to_lowercase();
    for pattern in QUOTA_OR_AUTH_PATTERNS {
        if lower.contains(pattern) {
            return ErrorClass::QuotaOrAuth;
        }
    }
    for pattern in TRANSIENT_PATTERNS {
        if lower.contains(pattern) {
            return ErrorClass::Transient;
        }
    }
    ErrorClass::Fatal
}

/// Classify a remote error. HTTP 429/403 classify structurally; everything
/// else falls back to the message text so vendor errors that only carry a
/// string still classify the same way.
pub fn classify(error: &RemoteError) -> ErrorClass {
    if let RemoteError::Status { status: 429 | 403, .. } = error {
        return ErrorClass::QuotaOrAuth;
    }
    classify_message(&error.to_string())
}
