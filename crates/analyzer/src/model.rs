//! Per-transaction model selection
//!
//! An explicit override always wins. Otherwise the service's catalog is
//! consulted and the first match from the fixed priority list is used.
//! Catalog failures degrade to the default model instead of failing the
//! transaction; selection is not cached at session level so a transient
//! catalog error only affects one transaction.

use remote::InferenceSession;
use tracing::debug;

/// Preference order when no override is configured.
pub const MODEL_PRIORITY: &[&str] = &[
    "gemini-2.0-flash-lite",
    "gemini-2.0-flash-lite-001",
    "gemini-2.0-flash",
    "gemini-2.5-flash",
    "gemini-1.5-flash",
];

/// Fallback when the catalog is unreachable or matches nothing.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-lite";

/// Resolve the model identifier for one transaction.
pub async fn select_model(session: &dyn InferenceSession, override_model: Option<&str>) -> String {
    if let Some(model) = override_model {
        return model.to_string();
    }
    match session.list_models().await {
        Ok(models) => {
            for candidate in MODEL_PRIORITY {
                if models.iter().any(|m| m == candidate) {
                    return (*candidate).to_string();
                }
            }
            debug!("no priority model in catalog, using default");
            DEFAULT_MODEL.to_string()
        }
        Err(error) => {
            debug!(error = %error, "model catalog unavailable, using default");
            DEFAULT_MODEL.to_string()
        }
    }
}
