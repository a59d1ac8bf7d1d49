//! Service-level errors for ingestion, fetching, and bookkeeping.

use analyzer::AnalyzerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("audio extraction failed: {0}")]
    Extraction(String),

    #[error("download failed: {0}")]
    Fetch(String),

    #[error(transparent)]
    Analysis(#[from] AnalyzerError),

    #[error(transparent)]
    Common(#[from] common::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
