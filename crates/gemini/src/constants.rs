//! Gemini API endpoint constants
//!
//! The API authenticates with a `key` query parameter; the key itself is
//! held by the session and never appears in the path, so logging a URL
//! path never leaks it.

use std::time::Duration;

/// Production API host. Tests point the client at a mock server instead.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Versioned API prefix for models, files, and generation calls.
pub const API_VERSION: &str = "v1beta";

/// Per-request timeout. Media uploads for long recordings can be slow, so
/// this is deliberately generous.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);
