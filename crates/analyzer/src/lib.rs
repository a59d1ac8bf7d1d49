//! Resilient inference orchestrator
//!
//! Owns the key pool and the single active session, and exposes one
//! operation: `Analyzer::analyze(path) -> text`. Each call loops through
//! the retry state machine:
//!
//! 1. No session → bootstrap one from the pool (bounded by pool size);
//!    an empty pool is fatal (`KeyExhausted`)
//! 2. Run one lifecycle transaction: upload → poll until settled →
//!    invoke → guaranteed best-effort delete
//! 3. On failure, classify: quota/auth → mark key exhausted and rotate
//!    the session; transient network → fixed backoff, same session;
//!    anything else → surface unchanged
//!
//! Rotation terminates because the pool is finite and exhaustion is
//! monotonic. Transient retries are deliberately unbounded at a fixed
//! interval.

pub mod client;
pub mod error;
pub mod mime;
pub mod model;
pub mod prompt;
pub mod transaction;

#[cfg(test)]
pub(crate) mod fakes;

pub use client::{Analyzer, AnalyzerConfig};
pub use error::{AnalyzerError, Result, classify_failure};
pub use mime::{SUPPORTED_AUDIO, SUPPORTED_VIDEO, is_supported, mime_for_path};
pub use model::{DEFAULT_MODEL, MODEL_PRIORITY, select_model};
pub use prompt::{DEFAULT_PROMPT, resolve_prompt};
pub use transaction::run_transaction;
