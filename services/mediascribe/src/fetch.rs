//! Remote video fetch via yt-dlp
//!
//! Downloads the audio track of a remote video into the inbox as MP3 and
//! reports the path yt-dlp actually wrote, so the caller can process that
//! one file without rescanning.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::info;

use crate::error::{Error, Result};

fn download_args(inbox: &Path, url: &str) -> Vec<String> {
    vec![
        "-f".into(),
        "bestaudio".into(),
        "-x".into(),
        "--audio-format".into(),
        "mp3".into(),
        "--restrict-filenames".into(),
        "-o".into(),
        format!("{}/%(title)s.%(ext)s", inbox.display()),
        "--print".into(),
        "after_move:filepath".into(),
        url.into(),
    ]
}

/// Download `url` into the inbox, returning the downloaded file's path.
pub async fn fetch_url(inbox: &Path, url: &str) -> Result<PathBuf> {
    info!(url, inbox = %inbox.display(), "downloading audio");
    let output = Command::new("yt-dlp")
        .args(download_args(inbox, url))
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| Error::Fetch(format!("could not run yt-dlp: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let last_line = stderr.lines().last().unwrap_or("").trim();
        return Err(Error::Fetch(format!(
            "yt-dlp exited with {}: {last_line}",
            output.status
        )));
    }

    // --print after_move:filepath emits the final path on stdout.
    let stdout = String::from_utf8_lossy(&output.stdout);
    let path = stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .next_back()
        .ok_or_else(|| Error::Fetch("yt-dlp reported no output path".into()))?;

    Ok(PathBuf::from(path))
}
