//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! API keys may live in the TOML under `[keys]` or arrive via the
//! MEDIASCRIBE_KEYS_FREE / MEDIASCRIBE_KEYS_PAID env vars (comma-separated);
//! the env vars win so deployments can keep keys out of the file entirely.

use std::path::{Path, PathBuf};
use std::time::Duration;

use analyzer::AnalyzerConfig;
use serde::Deserialize;

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub keys: KeysConfig,
    pub paths: PathsConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// API key lists, in spend order
#[derive(Debug, Default, Deserialize)]
pub struct KeysConfig {
    #[serde(default)]
    pub free: Vec<String>,
    #[serde(default)]
    pub paid: Vec<String>,
}

/// Filesystem locations
#[derive(Debug, Deserialize)]
pub struct PathsConfig {
    /// Directory scanned for media files to process.
    pub inbox: PathBuf,
    #[serde(default = "default_registry_path")]
    pub registry: PathBuf,
    /// Optional TOML file with a `default_prompt` key, re-read per file.
    #[serde(default)]
    pub prompt_file: Option<PathBuf>,
}

/// Analysis tunables
#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    /// Skip catalog-based selection and always use this model.
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: None,
            poll_interval_secs: default_poll_interval(),
            retry_backoff_secs: default_retry_backoff(),
        }
    }
}

fn default_registry_path() -> PathBuf {
    PathBuf::from("mediascribe-registry.json")
}

fn default_poll_interval() -> u64 {
    2
}

fn default_retry_backoff() -> u64 {
    2
}

fn split_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_owned)
        .collect()
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    ///
    /// Key resolution order per tier:
    /// 1. MEDIASCRIBE_KEYS_FREE / MEDIASCRIBE_KEYS_PAID env vars
    /// 2. `[keys]` lists from the config file
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        if let Ok(raw) = std::env::var("MEDIASCRIBE_KEYS_FREE") {
            config.keys.free = split_keys(&raw);
        }
        if let Ok(raw) = std::env::var("MEDIASCRIBE_KEYS_PAID") {
            config.keys.paid = split_keys(&raw);
        }

        if config.keys.free.is_empty() && config.keys.paid.is_empty() {
            return Err(common::Error::Config(
                "no API keys configured: set [keys] in the config file or \
                 MEDIASCRIBE_KEYS_FREE / MEDIASCRIBE_KEYS_PAID"
                    .into(),
            ));
        }

        if config.analysis.poll_interval_secs == 0 {
            return Err(common::Error::Config(
                "poll_interval_secs must be greater than 0".into(),
            ));
        }

        if config.analysis.retry_backoff_secs == 0 {
            return Err(common::Error::Config(
                "retry_backoff_secs must be greater than 0".into(),
            ));
        }

        Ok(config)
    }

    /// Resolve config file path from CLI arg or MEDIASCRIBE_CONFIG env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("MEDIASCRIBE_CONFIG") {
            return PathBuf::from(p);
        }
        PathBuf::from("mediascribe.toml")
    }

    /// Analyzer tunables derived from the `[analysis]` and `[paths]` sections.
    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            model_override: self.analysis.model.clone(),
            prompt_path: self.paths.prompt_file.clone(),
            poll_interval: Duration::from_secs(self.analysis.poll_interval_secs),
            retry_backoff: Duration::from_secs(self.analysis.retry_backoff_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize tests that mutate environment variables, preventing
    /// data races when tests run in parallel.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    unsafe fn clear_key_env() {
        unsafe {
            remove_env("MEDIASCRIBE_KEYS_FREE");
            remove_env("MEDIASCRIBE_KEYS_PAID");
        }
    }

    fn valid_toml() -> &'static str {
        r#"
[keys]
free = ["AIza-free-1", "AIza-free-2"]
paid = ["AIza-paid-1"]

[paths]
inbox = "/data/inbox"

[analysis]
model = "gemini-2.0-flash-lite"
"#
    }

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_valid_config_with_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { clear_key_env() };
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, valid_toml());

        let config = Config::load(&path).unwrap();
        assert_eq!(config.keys.free, vec!["AIza-free-1", "AIza-free-2"]);
        assert_eq!(config.keys.paid, vec!["AIza-paid-1"]);
        assert_eq!(config.paths.inbox, PathBuf::from("/data/inbox"));
        assert_eq!(
            config.paths.registry,
            PathBuf::from("mediascribe-registry.json")
        );
        assert!(config.paths.prompt_file.is_none());
        assert_eq!(config.analysis.poll_interval_secs, 2);
        assert_eq!(config.analysis.retry_backoff_secs, 2);
        assert_eq!(config.analysis.model.as_deref(), Some("gemini-2.0-flash-lite"));
    }

    #[test]
    fn missing_file_errors() {
        let result = Config::load(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn invalid_toml_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "not valid {{{{ toml");
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn env_keys_override_file_keys() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, valid_toml());

        unsafe { set_env("MEDIASCRIBE_KEYS_FREE", "env-f1, env-f2 ,") };
        unsafe { set_env("MEDIASCRIBE_KEYS_PAID", "env-p1") };
        let config = Config::load(&path).unwrap();
        unsafe { clear_key_env() };

        assert_eq!(config.keys.free, vec!["env-f1", "env-f2"]);
        assert_eq!(config.keys.paid, vec!["env-p1"]);
    }

    #[test]
    fn no_keys_anywhere_is_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { clear_key_env() };
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[paths]
inbox = "/data/inbox"
"#,
        );

        let err = Config::load(&path).unwrap_err();
        assert!(
            err.to_string().contains("no API keys configured"),
            "got: {err}"
        );
    }

    #[test]
    fn env_keys_satisfy_missing_file_keys() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[paths]
inbox = "/data/inbox"
"#,
        );

        unsafe { set_env("MEDIASCRIBE_KEYS_FREE", "env-only-key") };
        let config = Config::load(&path).unwrap();
        unsafe { clear_key_env() };

        assert_eq!(config.keys.free, vec!["env-only-key"]);
        assert!(config.keys.paid.is_empty());
    }

    #[test]
    fn zero_poll_interval_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { clear_key_env() };
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[keys]
free = ["k"]

[paths]
inbox = "/data/inbox"

[analysis]
poll_interval_secs = 0
"#,
        );

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn zero_retry_backoff_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { clear_key_env() };
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[keys]
free = ["k"]

[paths]
inbox = "/data/inbox"

[analysis]
retry_backoff_secs = 0
"#,
        );

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn resolve_path_cli_arg() {
        let path = Config::resolve_path(Some("/custom/path.toml"));
        assert_eq!(path, PathBuf::from("/custom/path.toml"));
    }

    #[test]
    fn resolve_path_env_var() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("MEDIASCRIBE_CONFIG", "/env/path.toml") };
        let path = Config::resolve_path(None);
        unsafe { remove_env("MEDIASCRIBE_CONFIG") };
        assert_eq!(path, PathBuf::from("/env/path.toml"));
    }

    #[test]
    fn resolve_path_default() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("MEDIASCRIBE_CONFIG") };
        let path = Config::resolve_path(None);
        assert_eq!(path, PathBuf::from("mediascribe.toml"));
    }

    #[test]
    fn resolve_path_cli_overrides_env() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("MEDIASCRIBE_CONFIG", "/env/should-lose.toml") };
        let path = Config::resolve_path(Some("/cli/wins.toml"));
        unsafe { remove_env("MEDIASCRIBE_CONFIG") };
        assert_eq!(
            path,
            PathBuf::from("/cli/wins.toml"),
            "CLI arg must take precedence over MEDIASCRIBE_CONFIG"
        );
    }

    #[test]
    fn analyzer_config_carries_tunables() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { clear_key_env() };
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[keys]
free = ["k"]

[paths]
inbox = "/data/inbox"
prompt_file = "/data/prompts.toml"

[analysis]
poll_interval_secs = 5
retry_backoff_secs = 3
"#,
        );

        let analyzer = Config::load(&path).unwrap().analyzer_config();
        assert_eq!(analyzer.poll_interval, Duration::from_secs(5));
        assert_eq!(analyzer.retry_backoff, Duration::from_secs(3));
        assert_eq!(
            analyzer.prompt_path,
            Some(PathBuf::from("/data/prompts.toml"))
        );
        assert!(analyzer.model_override.is_none());
    }
}
