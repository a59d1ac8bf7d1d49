//! One full lifecycle transaction: upload → poll → invoke → cleanup
//!
//! The transaction performs no retries of its own — every failure
//! propagates to the orchestrator, which owns all retry decisions. The one
//! guarantee made here is cleanup: once a blob has been uploaded, exactly
//! one delete is issued before the transaction returns, success or failure,
//! and a failed delete never masks the transaction's own outcome.

use std::path::Path;
use std::time::Duration;

use remote::{FileState, InferenceSession, RemoteFile};
use tracing::{debug, info, warn};

use crate::error::{AnalyzerError, Result};
use crate::mime::mime_for_path;
use crate::model::select_model;
use crate::prompt::resolve_prompt;

/// Run one transaction for `local_path` against an open session.
pub async fn run_transaction(
    session: &dyn InferenceSession,
    local_path: &Path,
    model_override: Option<&str>,
    prompt_path: Option<&Path>,
    poll_interval: Duration,
) -> Result<String> {
    let mime_type = mime_for_path(local_path);
    let display_name = local_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    let bytes = tokio::fs::read(local_path)
        .await
        .map_err(|source| AnalyzerError::Io {
            path: local_path.display().to_string(),
            source,
        })?;

    info!(file = %display_name, mime_type, bytes = bytes.len(), "uploading");
    let file = session.upload_blob(bytes, &display_name, mime_type).await?;

    let outcome = analyze_uploaded(
        session,
        &file,
        model_override,
        prompt_path,
        poll_interval,
    )
    .await;

    // Best-effort cleanup on every exit past upload. Failures are logged
    // and swallowed so they cannot mask the transaction outcome.
    if let Err(error) = session.delete_blob(&file.name).await {
        warn!(name = %file.name, error = %error, "remote cleanup failed, ignoring");
    } else {
        debug!(name = %file.name, "remote blob deleted");
    }

    outcome
}

/// Steps 3–5: poll until settled, resolve model and prompt, invoke.
async fn analyze_uploaded(
    session: &dyn InferenceSession,
    file: &RemoteFile,
    model_override: Option<&str>,
    prompt_path: Option<&Path>,
    poll_interval: Duration,
) -> Result<String> {
    let mut state = file.state.clone();
    while state == FileState::Processing {
        tokio::time::sleep(poll_interval).await;
        state = session.file_state(&file.name).await?;
    }
    if state != FileState::Active {
        return Err(AnalyzerError::RemoteProcessingFailed(
            state.label().to_string(),
        ));
    }

    let model = select_model(session, model_override).await;
    let prompt = resolve_prompt(prompt_path).await;

    info!(model = %model, name = %file.name, "requesting analysis");
    let text = session.invoke(&model, file, &prompt).await?;
    Ok(text)
}
