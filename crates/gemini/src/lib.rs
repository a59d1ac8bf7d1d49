//! Gemini REST client
//!
//! Implements the `remote` capability traits against the Gemini generative
//! language API. This crate is a standalone library with no dependency on
//! the orchestrator — it can be tested and used independently.
//!
//! Transaction flow:
//! 1. `GeminiClient::connect()` binds an API key into a session
//! 2. `upload_blob()` posts the media as a multipart file upload
//! 3. `file_state()` polls the file resource until it settles
//! 4. `invoke()` runs `models/{model}:generateContent` over the file
//! 5. `delete_blob()` removes the remote file

pub mod client;
pub mod constants;
pub mod wire;

pub use client::{GeminiClient, GeminiSession};
pub use constants::DEFAULT_BASE_URL;
