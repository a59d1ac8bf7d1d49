//! mediascribe
//!
//! Single-binary CLI that:
//! 1. Scans an inbox directory (or downloads a remote video's audio)
//! 2. Uploads each media file to the Gemini API across a pool of keys
//! 3. Writes the transcription/summary report next to the source file
//! 4. Tracks completed files in a fingerprint-keyed registry

mod config;
mod error;
mod fetch;
mod ingest;
mod registry;

use std::path::Path;
use std::sync::Arc;

use analyzer::{Analyzer, AnalyzerError};
use anyhow::{Context, Result, bail};
use gemini::GeminiClient;
use keypool::KeyPool;
use remote::InferenceService;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::error::Error;
use crate::registry::Registry;

const USAGE: &str = "\
usage: mediascribe [--config <path>] <command>

commands:
  inbox         analyze every pending media file in the inbox
  url <link>    download a remote video's audio into the inbox, then analyze it
  models        list the remote service's model catalog
";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (cli_config_path, positional) = parse_args(&args);

    let config_path = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), "loading configuration");
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    info!(
        inbox = %config.paths.inbox.display(),
        free_keys = config.keys.free.len(),
        paid_keys = config.keys.paid.len(),
        "configuration loaded"
    );

    match positional.as_slice() {
        ["inbox"] => run_inbox(&config).await,
        ["url", link] => run_url(&config, link).await,
        ["models"] => run_models(&config).await,
        _ => {
            eprint!("{USAGE}");
            std::process::exit(2);
        }
    }
}

/// Split CLI args into the `--config` value and positional command words.
fn parse_args(args: &[String]) -> (Option<&str>, Vec<&str>) {
    let mut cli_config_path = None;
    let mut positional = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            cli_config_path = iter.next().map(String::as_str);
        } else {
            positional.push(arg.as_str());
        }
    }
    (cli_config_path, positional)
}

fn build_analyzer(config: &Config) -> Result<Analyzer> {
    let pool = Arc::new(KeyPool::new(
        config.keys.free.clone(),
        config.keys.paid.clone(),
    ));
    let service: Arc<dyn InferenceService> =
        Arc::new(GeminiClient::new().context("failed to build HTTP client")?);
    Ok(Analyzer::new(service, pool, config.analyzer_config()))
}

/// Process every pending inbox file sequentially.
///
/// One file's failure logs and moves on; key exhaustion aborts the run
/// because no later file could succeed either.
async fn run_inbox(config: &Config) -> Result<()> {
    let analyzer = build_analyzer(config)?;
    let mut registry = Registry::load(&config.paths.registry);

    let files = ingest::scan_inbox(&config.paths.inbox)
        .await
        .with_context(|| format!("failed to scan inbox {}", config.paths.inbox.display()))?;
    info!(pending = files.len(), "inbox scan complete");

    for file in &files {
        match process_file(&analyzer, &mut registry, file).await {
            Ok(()) => {}
            Err(Error::Analysis(AnalyzerError::KeyExhausted)) => {
                bail!("all API keys exhausted, aborting run");
            }
            Err(failure) => {
                error!(file = %file.display(), error = %failure, "processing failed, continuing");
            }
        }
    }
    Ok(())
}

/// Download one remote video's audio, then analyze just that file.
async fn run_url(config: &Config, url: &str) -> Result<()> {
    let downloaded = match fetch::fetch_url(&config.paths.inbox, url).await {
        Ok(path) => path,
        Err(failure) => {
            error!(url, error = %failure, "download failed");
            return Ok(());
        }
    };
    info!(file = %downloaded.display(), "download complete");

    let analyzer = build_analyzer(config)?;
    let mut registry = Registry::load(&config.paths.registry);
    match process_file(&analyzer, &mut registry, &downloaded).await {
        Ok(()) => Ok(()),
        Err(Error::Analysis(AnalyzerError::KeyExhausted)) => {
            bail!("all API keys exhausted, aborting run");
        }
        Err(failure) => Err(failure).context("failed to analyze downloaded file"),
    }
}

/// Print the remote model catalog using the first usable key.
async fn run_models(config: &Config) -> Result<()> {
    let pool = KeyPool::new(config.keys.free.clone(), config.keys.paid.clone());
    let Some(selected) = pool.next().await else {
        bail!("no API keys configured");
    };
    let service = GeminiClient::new().context("failed to build HTTP client")?;
    let session = service
        .connect(&selected.key)
        .await
        .context("failed to open session")?;
    let models = session
        .list_models()
        .await
        .context("failed to list models")?;
    for model in models {
        println!("{model}");
    }
    Ok(())
}

/// Run one file through the registry gate and the analyzer.
async fn process_file(
    analyzer: &Analyzer,
    registry: &mut Registry,
    source: &Path,
) -> error::Result<()> {
    // A file the fingerprint cannot be computed for is treated as new;
    // it is processed but the ledger holds no entry for it.
    let fingerprint = match registry::fingerprint(source) {
        Ok(fp) => Some(fp),
        Err(failure) => {
            warn!(file = %source.display(), error = %failure, "cannot fingerprint, processing without ledger");
            None
        }
    };

    if let Some(fp) = &fingerprint {
        if registry.is_completed(fp) {
            info!(file = %source.display(), "already analyzed, skipping");
            return Ok(());
        }
        registry.record_start(fp, source)?;
    }

    let prepared = ingest::prepare(source).await?;

    info!(file = %source.display(), "analyzing");
    let text = analyzer.analyze(prepared.audio_path()).await?;
    drop(prepared);

    let report = source.with_extension("md");
    tokio::fs::write(&report, text.as_bytes()).await?;
    info!(report = %report.display(), "report written");

    if let Some(fp) = &fingerprint {
        registry.record_complete(fp, source, &report)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_args_extracts_config_flag() {
        let args = owned(&["--config", "/etc/ms.toml", "inbox"]);
        let (config, positional) = parse_args(&args);
        assert_eq!(config, Some("/etc/ms.toml"));
        assert_eq!(positional, vec!["inbox"]);
    }

    #[test]
    fn parse_args_keeps_command_arguments_ordered() {
        let args = owned(&["url", "https://video.example/v/1", "--config", "c.toml"]);
        let (config, positional) = parse_args(&args);
        assert_eq!(config, Some("c.toml"));
        assert_eq!(positional, vec!["url", "https://video.example/v/1"]);
    }

    #[test]
    fn parse_args_without_flags() {
        let args = owned(&["models"]);
        let (config, positional) = parse_args(&args);
        assert_eq!(config, None);
        assert_eq!(positional, vec!["models"]);
    }
}
