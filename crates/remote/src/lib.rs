//! Capability boundary for the remote inference service
//!
//! Defines the traits the orchestrator consumes: a service that turns one
//! API key into a live session, and a session that can upload media blobs,
//! poll their readiness, run a generation call against them, and delete
//! them. Vendors (the `gemini` crate) implement these; tests implement them
//! with scripted fakes.
//!
//! Trait methods return `Pin<Box<dyn Future>>` so both traits stay
//! dyn-compatible (`Arc<dyn InferenceSession>`).

pub mod classify;

pub use classify::{ErrorClass, classify, classify_message};

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future alias used by the capability traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Readiness state of an uploaded blob on the remote service.
///
/// Transitions: `Processing` until the service settles the blob into
/// `Active` (usable) or `Failed`. Anything the service reports outside
/// those three is carried through as `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileState {
    Processing,
    Active,
    Failed,
    Other(String),
}

impl FileState {
    /// Parse the service's state label (e.g. `"PROCESSING"`).
    pub fn parse(label: &str) -> Self {
        match label {
            "PROCESSING" => FileState::Processing,
            "ACTIVE" => FileState::Active,
            "FAILED" => FileState::Failed,
            other => FileState::Other(other.to_string()),
        }
    }

    /// State label for logging and error messages.
    pub fn label(&self) -> &str {
        match self {
            FileState::Processing => "PROCESSING",
            FileState::Active => "ACTIVE",
            FileState::Failed => "FAILED",
            FileState::Other(s) => s,
        }
    }
}

/// Handle to an uploaded blob: the service-side name plus what the invoke
/// call needs to reference it.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    /// Service-side resource name (e.g. `files/abc123`), used for state
    /// polling and deletion.
    pub name: String,
    /// Download/reference URI the generation call points at.
    pub uri: String,
    /// MIME type the blob was uploaded with.
    pub mime_type: String,
    /// State reported at upload time.
    pub state: FileState,
}

/// Errors crossing the remote boundary.
///
/// `Status` keeps the HTTP status separate so classification has a
/// structured fast path; the rendered message still contains the status
/// code, preserving the substring-matching contract for callers that only
/// see error text.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("unusable credential: {0}")]
    BadCredential(String),
}

/// Result alias for remote operations.
pub type Result<T> = std::result::Result<T, RemoteError>;

/// One live binding between a credential and the remote service.
pub trait InferenceSession: Send + Sync + std::fmt::Debug {
    /// List the model identifiers this credential can invoke.
    fn list_models(&self) -> BoxFuture<'_, Result<Vec<String>>>;

    /// Upload a media blob, tagged with a display name and MIME type.
    fn upload_blob<'a>(
        &'a self,
        bytes: Vec<u8>,
        display_name: &'a str,
        mime_type: &'a str,
    ) -> BoxFuture<'a, Result<RemoteFile>>;

    /// Fetch the current readiness state of an uploaded blob.
    fn file_state<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<FileState>>;

    /// Run a generation call against an uploaded blob and return the
    /// response text.
    fn invoke<'a>(
        &'a self,
        model: &'a str,
        file: &'a RemoteFile,
        prompt: &'a str,
    ) -> BoxFuture<'a, Result<String>>;

    /// Delete an uploaded blob. Callers treat failures as best-effort.
    fn delete_blob<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<()>>;
}

/// Factory turning one API key into a live session.
pub trait InferenceService: Send + Sync {
    fn connect<'a>(&'a self, api_key: &'a str)
    -> BoxFuture<'a, Result<Arc<dyn InferenceSession>>>;
}
