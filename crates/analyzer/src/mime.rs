//! Extension-based format detection
//!
//! MP3 and MP4 are the two primary formats (local recordings and extracted
//! audio land as one of the two); the rest of the table covers the other
//! accepted containers. Anything unknown uploads as a generic binary.

use std::path::Path;

/// Audio extensions accepted for direct upload.
pub const SUPPORTED_AUDIO: &[&str] = &["mp3", "wav", "m4a", "aac", "flac", "ogg"];

/// Video extensions accepted for audio extraction.
pub const SUPPORTED_VIDEO: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];

/// Lowercased extension of a path, if any.
pub fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

/// Whether the file is in one of the accepted audio or video sets.
pub fn is_supported(path: &Path) -> bool {
    extension(path)
        .is_some_and(|ext| SUPPORTED_AUDIO.contains(&ext.as_str()) || SUPPORTED_VIDEO.contains(&ext.as_str()))
}

/// MIME type for an upload, derived from the file extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    match extension(path).as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("mp4") => "video/mp4",
        Some("wav") => "audio/wav",
        Some("m4a") => "audio/mp4",
        Some("aac") => "audio/aac",
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}
