//! Shared types for the mediascribe workspace

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::{Secret, key_suffix};
