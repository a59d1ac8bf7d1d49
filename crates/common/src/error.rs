//! Shared error types

use thiserror::Error;

/// Errors shared across the workspace (config loading, ledger persistence).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias using the shared Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display_includes_message() {
        let err = Error::Config("missing inbox path".into());
        assert_eq!(err.to_string(), "Configuration error: missing inbox path");
    }

    #[test]
    fn io_error_display_has_prefix() {
        let err = Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        assert!(err.to_string().starts_with("I/O error:"), "got: {err}");
    }

    #[test]
    fn json_error_converts_via_from() {
        let parse: serde_json::Error =
            serde_json::from_str::<serde_json::Value>("{broken").unwrap_err();
        let err: Error = parse.into();
        assert!(
            matches!(err, Error::Json(_)),
            "expected Json variant, got: {err:?}"
        );
    }
}
