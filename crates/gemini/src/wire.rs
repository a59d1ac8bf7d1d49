//! Wire types for the Gemini REST API
//!
//! Serde mappings for the three surfaces the client touches: the model
//! catalog, the file resource lifecycle, and generateContent. Field names
//! on the wire are camelCase.

use serde::{Deserialize, Serialize};

/// `GET /v1beta/models` response.
#[derive(Debug, Deserialize)]
pub struct ModelCatalog {
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

/// One catalog entry. `name` arrives as `models/<id>`.
#[derive(Debug, Deserialize)]
pub struct ModelEntry {
    pub name: String,
}

impl ModelEntry {
    /// Bare model identifier without the `models/` resource prefix.
    pub fn id(&self) -> &str {
        self.name.strip_prefix("models/").unwrap_or(&self.name)
    }
}

/// File resource as returned by upload and state queries.
///
/// `uri` can be absent while the service is still registering the blob;
/// callers should treat a missing uri as not-yet-usable.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResource {
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default = "default_state")]
    pub state: String,
}

fn default_state() -> String {
    "PROCESSING".to_string()
}

/// Upload response wraps the resource in a `file` envelope.
#[derive(Debug, Deserialize)]
pub struct UploadEnvelope {
    pub file: FileResource,
}

/// Metadata part of the multipart upload request.
#[derive(Debug, Serialize)]
pub struct UploadMetadata<'a> {
    pub file: UploadFileMetadata<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileMetadata<'a> {
    pub display_name: &'a str,
}

/// `models/{model}:generateContent` request body.
#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Content<'a> {
    pub parts: Vec<Part<'a>>,
}

/// A content part: either an uploaded-file reference or prompt text.
/// Untagged so each variant serializes as its single wire field.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Part<'a> {
    FileData {
        #[serde(rename = "fileData")]
        file_data: FileData<'a>,
    },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData<'a> {
    pub file_uri: &'a str,
    pub mime_type: &'a str,
}

/// generateContent response, reduced to what the caller consumes.
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: CandidateContent,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, or None if the response
    /// carried no text parts.
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let joined: String = candidate
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if joined.is_empty() { None } else { Some(joined) }
    }
}
