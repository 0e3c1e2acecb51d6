use std::time::Duration;

use thiserror::Error;

const BODY_PREVIEW_CHARS: usize = 180;

/// Failure raised by the wrapper that calls the remote analysis service.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("remote analysis timed out after {0:?}")]
    TimedOut(Duration),
    #[error("remote analysis request was aborted")]
    Aborted,
    #[error("remote analysis returned {status}: {preview}")]
    Status { status: u16, preview: String },
    #[error("remote analysis transport failed: {0}")]
    Transport(String),
}

impl ProviderError {
    pub fn status(status: u16, body: &str) -> Self {
        let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
        Self::Status { status, preview }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
