//! HTTP client implementing the remote capability traits
//!
//! `GeminiClient` is the service factory; `GeminiSession` binds one API key.
//! Error mapping keeps the HTTP status structured (`RemoteError::Status`)
//! with the raw body text attached, so the orchestrator's substring
//! classification sees the same 429/403 markers the service sent.

use std::sync::Arc;

use common::{Secret, key_suffix};
use remote::{
    BoxFuture, FileState, InferenceService, InferenceSession, RemoteError, RemoteFile, Result,
};
use tracing::{debug, info};

use crate::constants::{API_VERSION, DEFAULT_BASE_URL, REQUEST_TIMEOUT};
use crate::wire::{
    Content, FileData, FileResource, GenerateRequest, GenerateResponse, ModelCatalog, Part,
    UploadEnvelope, UploadFileMetadata, UploadMetadata,
};

/// Factory for Gemini sessions. One shared reqwest client, reused across
/// sessions and credential rotations.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    /// Build a client against the production API host.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Build a client against an arbitrary host (mock servers in tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RemoteError::Transport(format!("client construction failed: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl InferenceService for GeminiClient {
    fn connect<'a>(
        &'a self,
        api_key: &'a str,
    ) -> BoxFuture<'a, Result<Arc<dyn InferenceSession>>> {
        Box::pin(async move {
            // Construction is local: the API has no cheap credential
            // handshake, so a rejected live key surfaces on first use and
            // classifies as quota/auth there.
            let key = api_key.trim();
            if key.is_empty() {
                return Err(RemoteError::BadCredential("blank API key".into()));
            }
            info!(key = key_suffix(key), "opening gemini session");
            let session: Arc<dyn InferenceSession> = Arc::new(GeminiSession {
                http: self.http.clone(),
                base_url: self.base_url.clone(),
                key: Secret::new(key.to_string()),
            });
            Ok(session)
        })
    }
}

/// One API key bound to the service.
#[derive(Debug)]
pub struct GeminiSession {
    http: reqwest::Client,
    base_url: String,
    key: Secret<String>,
}

impl GeminiSession {
    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn list_models_inner(&self) -> Result<Vec<String>> {
        let response = self
            .http
            .get(self.url(&format!("{API_VERSION}/models")))
            .query(&[("key", self.key.expose().as_str())])
            .send()
            .await
            .map_err(transport)?;
        let catalog: ModelCatalog = read_json(response).await?;
        Ok(catalog.models.iter().map(|m| m.id().to_string()).collect())
    }

    async fn upload_blob_inner(
        &self,
        bytes: Vec<u8>,
        display_name: &str,
        mime_type: &str,
    ) -> Result<RemoteFile> {
        let metadata = serde_json::to_string(&UploadMetadata {
            file: UploadFileMetadata { display_name },
        })
        .map_err(|e| RemoteError::InvalidResponse(format!("metadata encode failed: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .part(
                "metadata",
                reqwest::multipart::Part::text(metadata)
                    .mime_str("application/json")
                    .map_err(transport)?,
            )
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes)
                    .file_name(display_name.to_string())
                    .mime_str(mime_type)
                    .map_err(transport)?,
            );

        let response = self
            .http
            .post(self.url(&format!("upload/{API_VERSION}/files")))
            .query(&[("key", self.key.expose().as_str()), ("uploadType", "multipart")])
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        let envelope: UploadEnvelope = read_json(response).await?;
        debug!(name = %envelope.file.name, state = %envelope.file.state, "blob uploaded");
        Ok(to_remote_file(envelope.file, mime_type))
    }

    async fn file_state_inner(&self, name: &str) -> Result<FileState> {
        let response = self
            .http
            .get(self.url(&format!("{API_VERSION}/{name}")))
            .query(&[("key", self.key.expose().as_str())])
            .send()
            .await
            .map_err(transport)?;
        let file: FileResource = read_json(response).await?;
        Ok(FileState::parse(&file.state))
    }

    async fn invoke_inner(&self, model: &str, file: &RemoteFile, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::FileData {
                        file_data: FileData {
                            file_uri: &file.uri,
                            mime_type: &file.mime_type,
                        },
                    },
                    Part::Text { text: prompt },
                ],
            }],
        };

        let response = self
            .http
            .post(self.url(&format!("{API_VERSION}/models/{model}:generateContent")))
            .query(&[("key", self.key.expose().as_str())])
            .json(&request)
            .send()
            .await
            .map_err(transport)?;
        let generated: GenerateResponse = read_json(response).await?;
        generated
            .text()
            .ok_or_else(|| RemoteError::InvalidResponse("response carried no text".into()))
    }

    async fn delete_blob_inner(&self, name: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("{API_VERSION}/{name}")))
            .query(&[("key", self.key.expose().as_str())])
            .send()
            .await
            .map_err(transport)?;
        check_status(response).await?;
        Ok(())
    }
}

impl InferenceSession for GeminiSession {
    fn list_models(&self) -> BoxFuture<'_, Result<Vec<String>>> {
        Box::pin(self.list_models_inner())
    }

    fn upload_blob<'a>(
        &'a self,
        bytes: Vec<u8>,
        display_name: &'a str,
        mime_type: &'a str,
    ) -> BoxFuture<'a, Result<RemoteFile>> {
        Box::pin(self.upload_blob_inner(bytes, display_name, mime_type))
    }

    fn file_state<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<FileState>> {
        Box::pin(self.file_state_inner(name))
    }

    fn invoke<'a>(
        &'a self,
        model: &'a str,
        file: &'a RemoteFile,
        prompt: &'a str,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(self.invoke_inner(model, file, prompt))
    }

    fn delete_blob<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.delete_blob_inner(name))
    }
}

fn to_remote_file(file: FileResource, requested_mime: &str) -> RemoteFile {
    RemoteFile {
        uri: file.uri.unwrap_or_default(),
        mime_type: file.mime_type.unwrap_or_else(|| requested_mime.to_string()),
        state: FileState::parse(&file.state),
        name: file.name,
    }
}

fn transport(error: reqwest::Error) -> RemoteError {
    RemoteError::Transport(error.to_string())
}

/// Fail non-success statuses with the body text attached.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| String::from("<no body>"));
    Err(RemoteError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let response = check_status(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| RemoteError::InvalidResponse(e.to_string()))
}
