pub mod classify;
pub mod context;
pub mod provider;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use classify::{classify_anyhow, classify_request_error, embedded_status_code};
pub use context::{resolve_fallback_reason, FallbackContext};
pub use provider::ProviderError;

/// Version of the label set below. Observability consumers key dashboards on
/// these strings, so a rename means a version bump.
pub const FALLBACK_LABEL_VERSION: u32 = 1;

/// Why the remote provider's answer was not used for a request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    NotConfigured,
    NoSession,
    Timeout,
    NetworkError,
    NonOkResponse,
    Unknown,
}

impl FallbackReason {
    pub const ALL: [FallbackReason; 6] = [
        FallbackReason::NotConfigured,
        FallbackReason::NoSession,
        FallbackReason::Timeout,
        FallbackReason::NetworkError,
        FallbackReason::NonOkResponse,
        FallbackReason::Unknown,
    ];

    pub fn as_label(&self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::NoSession => "no_session",
            Self::Timeout => "timeout",
            Self::NetworkError => "network_error",
            Self::NonOkResponse => "non_ok_response",
            Self::Unknown => "unknown",
        }
    }
}

impl Display for FallbackReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

#[derive(Debug, Error)]
#[error("unknown fallback reason: {0}")]
pub struct FallbackReasonParseError(pub String);

impl FromStr for FallbackReason {
    type Err = FallbackReasonParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|reason| reason.as_label() == normalized)
            .ok_or_else(|| FallbackReasonParseError(s.to_string()))
    }
}

/// Telemetry record emitted when a request falls back to the local provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FallbackEvent {
    pub label_version: u32,
    pub reason: FallbackReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl FallbackEvent {
    pub fn new(reason: FallbackReason, status_code: Option<u16>) -> Self {
        Self {
            label_version: FALLBACK_LABEL_VERSION,
            reason,
            status_code,
        }
    }
}
