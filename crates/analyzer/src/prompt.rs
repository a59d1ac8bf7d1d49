//! Analysis prompt resolution
//!
//! The prompt file is re-read on every transaction so an operator can edit
//! it without restarting the run. A missing, unreadable, or malformed file
//! falls back to the built-in prompt.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

/// Built-in prompt used when no prompt file is configured or usable.
pub const DEFAULT_PROMPT: &str =
    "Task 1: Transcript. Task 2: Summary. Keep original language.";

#[derive(Debug, Deserialize)]
struct PromptFile {
    default_prompt: Option<String>,
}

/// Resolve the prompt text for one transaction.
pub async fn resolve_prompt(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return DEFAULT_PROMPT.to_string();
    };
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(error) => {
            debug!(path = %path.display(), error = %error, "prompt file unreadable, using default");
            return DEFAULT_PROMPT.to_string();
        }
    };
    match toml::from_str::<PromptFile>(&contents) {
        Ok(PromptFile {
            default_prompt: Some(prompt),
        }) if !prompt.trim().is_empty() => prompt,
        Ok(_) => {
            warn!(path = %path.display(), "prompt file has no default_prompt, using default");
            DEFAULT_PROMPT.to_string()
        }
        Err(error) => {
            warn!(path = %path.display(), error = %error, "prompt file malformed, using default");
            DEFAULT_PROMPT.to_string()
        }
    }
}
