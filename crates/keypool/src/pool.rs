//! Pool state and deterministic tier-ordered selection
//!
//! Selection deliberately carries no cursor: every `next()` call re-scans
//! the declared order, so a key that left the exhausted set (not possible
//! today, exhaustion is monotonic) would immediately become eligible again.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use common::key_suffix;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Which tier a key was declared under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Free,
    Paid,
}

impl Tier {
    /// Tier label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Paid => "paid",
        }
    }
}

/// A selected key, ready to open a session with.
#[derive(Debug, Clone)]
pub struct SelectedKey {
    pub key: String,
    pub tier: Tier,
}

/// Snapshot of pool occupancy for logging and exhaustion messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolCounts {
    pub total: usize,
    pub free_live: usize,
    pub paid_live: usize,
    pub exhausted: usize,
}

/// Tiered key pool with a monotonic exhausted set.
///
/// The key lists are immutable after construction; only the exhausted set
/// mutates, behind an `RwLock` so callers that layer concurrency on top get
/// serializable `next`/`mark_exhausted` for free.
pub struct KeyPool {
    free: Vec<String>,
    paid: Vec<String>,
    exhausted: RwLock<HashSet<String>>,
    paid_tier_announced: AtomicBool,
}

impl KeyPool {
    /// Build a pool from the declared free and paid key lists.
    ///
    /// A key may appear in at most one tier: duplicates within a tier and
    /// paid keys already declared as free are dropped with a warning.
    pub fn new(free: Vec<String>, paid: Vec<String>) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let mut keep = |key: String, tier: Tier| -> Option<String> {
            if key.is_empty() {
                return None;
            }
            if seen.insert(key.clone()) {
                Some(key)
            } else {
                warn!(
                    key = key_suffix(&key),
                    tier = tier.label(),
                    "dropping duplicate key declaration"
                );
                None
            }
        };
        let free: Vec<String> = free.into_iter().filter_map(|k| keep(k, Tier::Free)).collect();
        let paid: Vec<String> = paid.into_iter().filter_map(|k| keep(k, Tier::Paid)).collect();
        info!(
            free = free.len(),
            paid = paid.len(),
            "key pool initialized"
        );
        Self {
            free,
            paid,
            exhausted: RwLock::new(HashSet::new()),
            paid_tier_announced: AtomicBool::new(false),
        }
    }

    /// Select the next usable key: first non-exhausted free key in declared
    /// order, else first non-exhausted paid key, else None.
    ///
    /// The first time selection falls through to the paid tier because
    /// every free key is exhausted, a tier-transition event is logged.
    pub async fn next(&self) -> Option<SelectedKey> {
        let exhausted = self.exhausted.read().await;

        for key in &self.free {
            if !exhausted.contains(key) {
                return Some(SelectedKey {
                    key: key.clone(),
                    tier: Tier::Free,
                });
            }
        }

        for key in &self.paid {
            if !exhausted.contains(key) {
                if !self.free.is_empty() && !self.paid_tier_announced.swap(true, Ordering::Relaxed)
                {
                    info!("free tier keys exhausted, switching to paid tier");
                }
                return Some(SelectedKey {
                    key: key.clone(),
                    tier: Tier::Paid,
                });
            }
        }

        None
    }

    /// Mark a key exhausted. Idempotent; empty or unknown keys are ignored.
    pub async fn mark_exhausted(&self, key: &str) {
        if key.is_empty() {
            return;
        }
        let known = self.free.iter().chain(&self.paid).any(|k| k == key);
        if !known {
            return;
        }
        let mut exhausted = self.exhausted.write().await;
        if exhausted.insert(key.to_string()) {
            warn!(key = key_suffix(key), "marking key as exhausted");
        }
    }

    /// Total keys across both tiers. Bounds the session bootstrap loop.
    pub fn total(&self) -> usize {
        self.free.len() + self.paid.len()
    }

    /// Occupancy snapshot.
    pub async fn counts(&self) -> PoolCounts {
        let exhausted = self.exhausted.read().await;
        let free_live = self.free.iter().filter(|k| !exhausted.contains(*k)).count();
        let paid_live = self.paid.iter().filter(|k| !exhausted.contains(*k)).count();
        PoolCounts {
            total: self.total(),
            free_live,
            paid_live,
            exhausted: exhausted.len(),
        }
    }
}
