//! Tiered API key pool
//!
//! Holds two ordered tiers of keys (free, paid) and the set of keys known
//! to be exhausted for this run. Selection always prefers the free tier and
//! is re-evaluated from scratch on every call; exhaustion is a one-way,
//! idempotent transition. The exhausted set only grows within a process
//! lifetime.
//!
//! Key lifecycle:
//! 1. Keys load once at startup from configuration
//! 2. `next()` returns the first live free key, else the first live paid key
//! 3. A quota/auth failure marks the key exhausted → never selected again
//! 4. All keys exhausted → `next()` returns None and the caller aborts

pub mod pool;

pub use pool::{KeyPool, PoolCounts, SelectedKey, Tier};
