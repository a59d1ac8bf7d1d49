//! Inbox scanning and per-file preparation
//!
//! Audio files are handed to the analyzer as-is. Video containers are first
//! stripped to a temporary MP3 with ffmpeg so only the audio track is
//! uploaded; the temp file is removed when `Prepared` drops.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use analyzer::{AnalyzerError, SUPPORTED_AUDIO, SUPPORTED_VIDEO};
use tempfile::TempPath;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::registry::DONE_PREFIX;

/// List the inbox files awaiting analysis, in name order.
///
/// Entries already marked `[DONE] ` and files with unsupported extensions
/// are skipped silently; subdirectories are not descended into.
pub async fn scan_inbox(inbox: &Path) -> Result<Vec<PathBuf>> {
    let mut reader = tokio::fs::read_dir(inbox).await?;
    let mut files = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        let path = entry.path();
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with(DONE_PREFIX) {
            continue;
        }
        if !analyzer::is_supported(&path) {
            debug!(file = name, "skipping unsupported extension");
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

/// A file ready for upload, with any extraction temp file kept alive.
#[derive(Debug)]
pub enum Prepared {
    Direct(PathBuf),
    Extracted(TempPath),
}

impl Prepared {
    pub fn audio_path(&self) -> &Path {
        match self {
            Prepared::Direct(path) => path,
            Prepared::Extracted(temp) => temp,
        }
    }
}

/// Prepare one source file for analysis.
pub async fn prepare(source: &Path) -> Result<Prepared> {
    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if SUPPORTED_AUDIO.contains(&ext.as_str()) {
        return Ok(Prepared::Direct(source.to_path_buf()));
    }
    if SUPPORTED_VIDEO.contains(&ext.as_str()) {
        let audio = extract_audio(source).await?;
        return Ok(Prepared::Extracted(audio));
    }
    Err(AnalyzerError::UnsupportedFormat(source.display().to_string()).into())
}

fn extraction_args(input: &Path, output: &Path) -> Vec<String> {
    vec![
        "-i".into(),
        input.display().to_string(),
        "-vn".into(),
        "-acodec".into(),
        "libmp3lame".into(),
        "-q:a".into(),
        "4".into(),
        "-y".into(),
        output.display().to_string(),
    ]
}

/// Strip the audio track from a video container into a temp MP3.
async fn extract_audio(input: &Path) -> Result<TempPath> {
    let temp = tempfile::Builder::new()
        .prefix("mediascribe-")
        .suffix(".mp3")
        .tempfile()?
        .into_temp_path();

    info!(input = %input.display(), "extracting audio track");
    let output = Command::new("ffmpeg")
        .args(extraction_args(input, &temp))
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| Error::Extraction(format!("could not run ffmpeg: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let last_line = stderr.lines().last().unwrap_or("").trim();
        return Err(Error::Extraction(format!(
            "ffmpeg exited with {}: {last_line}",
            output.status
        )));
    }
    Ok(temp)
}
