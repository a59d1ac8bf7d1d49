//! Idempotency registry
//!
//! A JSON ledger keyed by a content-sampling fingerprint so a file that was
//! already analyzed is skipped on later runs even after a rename or move.
//! The fingerprint hashes the file size plus the leading and trailing 8 KiB,
//! which is stable under rename and cheap for multi-gigabyte media.

use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::Result;

/// Prefix applied to source files whose analysis completed.
pub const DONE_PREFIX: &str = "[DONE] ";

const SAMPLE_BYTES: u64 = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    InProgress,
    Completed,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Entry {
    pub path: String,
    pub status: Status,
    pub started_at: u64,
    pub completed_at: Option<u64>,
    pub output: Option<String>,
}

/// Persistent ledger of processed files.
pub struct Registry {
    path: PathBuf,
    entries: HashMap<String, Entry>,
}

/// Content-sampling fingerprint: sha256(size ++ first 8 KiB ++ last 8 KiB).
pub fn fingerprint(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let len = file.metadata()?.len();

    let mut hasher = Sha256::new();
    hasher.update(len.to_string().as_bytes());

    let mut head = vec![0u8; SAMPLE_BYTES.min(len) as usize];
    file.read_exact(&mut head)?;
    hasher.update(&head);

    file.seek(SeekFrom::Start(len.saturating_sub(SAMPLE_BYTES)))?;
    let mut tail = Vec::with_capacity(SAMPLE_BYTES.min(len) as usize);
    file.read_to_end(&mut tail)?;
    hasher.update(&tail);

    Ok(format!("{:x}", hasher.finalize()))
}

fn now_epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl Registry {
    /// Load the ledger, starting fresh when the file is absent or corrupt.
    pub fn load(path: &Path) -> Self {
        let entries = match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        error = %error,
                        "registry file corrupt, starting fresh"
                    );
                    HashMap::new()
                }
            },
            Err(error) => {
                debug!(path = %path.display(), error = %error, "no registry file, starting fresh");
                HashMap::new()
            }
        };
        Self {
            path: path.to_path_buf(),
            entries,
        }
    }

    pub fn is_completed(&self, fingerprint: &str) -> bool {
        self.entries
            .get(fingerprint)
            .is_some_and(|e| e.status == Status::Completed)
    }

    /// Record that analysis of `source` has begun.
    pub fn record_start(&mut self, fingerprint: &str, source: &Path) -> Result<()> {
        self.entries.insert(
            fingerprint.to_string(),
            Entry {
                path: source.display().to_string(),
                status: Status::InProgress,
                started_at: now_epoch_secs(),
                completed_at: None,
                output: None,
            },
        );
        self.save()
    }

    /// Record completion, then rename the source with the `[DONE] ` prefix.
    ///
    /// The rename is cosmetic bookkeeping for humans browsing the inbox; a
    /// failed rename is logged and swallowed because the ledger entry is
    /// already durable by then.
    pub fn record_complete(
        &mut self,
        fingerprint: &str,
        source: &Path,
        output: &Path,
    ) -> Result<()> {
        if let Some(entry) = self.entries.get_mut(fingerprint) {
            entry.status = Status::Completed;
            entry.completed_at = Some(now_epoch_secs());
            entry.output = Some(output.display().to_string());
        }
        self.save()?;

        if let Some(done_path) = done_path_for(source) {
            if let Err(error) = std::fs::rename(source, &done_path) {
                warn!(
                    from = %source.display(),
                    to = %done_path.display(),
                    error = %error,
                    "could not rename completed source, ignoring"
                );
            }
        }
        Ok(())
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries).map_err(common::Error::from)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

fn done_path_for(source: &Path) -> Option<PathBuf> {
    let name = source.file_name()?.to_str()?;
    Some(source.with_file_name(format!("{DONE_PREFIX}{name}")))
}
