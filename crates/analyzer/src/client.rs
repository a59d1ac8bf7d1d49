//! Analyzer orchestrator and retry state machine
//!
//! Holds the key pool and at most one live session. `analyze` loops until
//! a terminal outcome: success, a fatal error surfaced unchanged, or
//! `KeyExhausted` once every credential has been burned.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use common::key_suffix;
use keypool::KeyPool;
use remote::{ErrorClass, InferenceService, InferenceSession};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::error::{AnalyzerError, Result, classify_failure};
use crate::transaction::run_transaction;

/// Tunables for one analyzer instance. Constructed once at startup and
/// passed in explicitly; the core keeps no ambient configuration.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Skip catalog-based model selection and always use this model.
    pub model_override: Option<String>,
    /// Optional prompt file, re-read on every transaction.
    pub prompt_path: Option<PathBuf>,
    /// Interval between remote readiness polls.
    pub poll_interval: Duration,
    /// Fixed backoff before retrying a transient network failure.
    pub retry_backoff: Duration,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            model_override: None,
            prompt_path: None,
            poll_interval: Duration::from_secs(2),
            retry_backoff: Duration::from_secs(2),
        }
    }
}

/// The session currently bound to a key, replaced on rotation.
#[derive(Clone)]
struct ActiveSession {
    session: Arc<dyn InferenceSession>,
    key: String,
}

/// Orchestrator owning the pool and the single active session.
pub struct Analyzer {
    service: Arc<dyn InferenceService>,
    pool: Arc<KeyPool>,
    config: AnalyzerConfig,
    active: Mutex<Option<ActiveSession>>,
}

impl Analyzer {
    pub fn new(
        service: Arc<dyn InferenceService>,
        pool: Arc<KeyPool>,
        config: AnalyzerConfig,
    ) -> Self {
        Self {
            service,
            pool,
            config,
            active: Mutex::new(None),
        }
    }

    /// Analyze one local media file, returning the response text.
    ///
    /// Loops until terminal: quota/auth failures rotate to the next key,
    /// transient network failures back off and retry on the same session
    /// (unbounded, fixed interval), everything else surfaces unchanged.
    pub async fn analyze(&self, local_path: &Path) -> Result<String> {
        loop {
            let active = self.ensure_session().await?;

            match run_transaction(
                active.session.as_ref(),
                local_path,
                self.config.model_override.as_deref(),
                self.config.prompt_path.as_deref(),
                self.config.poll_interval,
            )
            .await
            {
                Ok(text) => return Ok(text),
                Err(failure) => match classify_failure(&failure) {
                    ErrorClass::QuotaOrAuth => {
                        warn!(error = %failure, key = key_suffix(&active.key), "quota/auth failure, rotating key");
                        self.pool.mark_exhausted(&active.key).await;
                        *self.active.lock().await = None;
                    }
                    ErrorClass::Transient => {
                        warn!(
                            error = %failure,
                            backoff_secs = self.config.retry_backoff.as_secs(),
                            "transient network failure, retrying on same session"
                        );
                        tokio::time::sleep(self.config.retry_backoff).await;
                    }
                    ErrorClass::Fatal => {
                        error!(error = %failure, "non-retriable failure");
                        return Err(failure);
                    }
                },
            }
        }
    }

    /// Return the active session, bootstrapping one if needed.
    ///
    /// Bootstrap is a bounded loop over the pool: each construction
    /// failure marks its key exhausted and moves on. The bound equals the
    /// total key count, so a pathological key can never loop forever.
    async fn ensure_session(&self) -> Result<ActiveSession> {
        let mut guard = self.active.lock().await;
        if let Some(active) = guard.as_ref() {
            return Ok(active.clone());
        }

        for _ in 0..self.pool.total() {
            let Some(selected) = self.pool.next().await else {
                break;
            };
            match self.service.connect(&selected.key).await {
                Ok(session) => {
                    info!(
                        key = key_suffix(&selected.key),
                        tier = selected.tier.label(),
                        "session opened"
                    );
                    let active = ActiveSession {
                        session,
                        key: selected.key,
                    };
                    *guard = Some(active.clone());
                    return Ok(active);
                }
                Err(failure) => {
                    warn!(
                        key = key_suffix(&selected.key),
                        error = %failure,
                        "session construction failed, marking key exhausted"
                    );
                    self.pool.mark_exhausted(&selected.key).await;
                }
            }
        }

        let counts = self.pool.counts().await;
        error!(
            total = counts.total,
            exhausted = counts.exhausted,
            "no usable API keys remain"
        );
        Err(AnalyzerError::KeyExhausted)
    }
}
