use serde::{Deserialize, Serialize};

use crate::fallback::FallbackReason;

/// What the orchestrator knew about a request when it chose a provider.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FallbackContext {
    pub engine_configured: bool,
    pub has_session: bool,
    #[serde(default)]
    pub status_code: Option<u16>,
}

/// Returns `None` when the remote result was usable. Checks run in a fixed
/// order, so an unconfigured engine reports `NotConfigured` even when a
/// status code is also present.
pub fn resolve_fallback_reason(context: &FallbackContext) -> Option<FallbackReason> {
    if !context.engine_configured {
        return Some(FallbackReason::NotConfigured);
    }
    if !context.has_session {
        return Some(FallbackReason::NoSession);
    }
    match context.status_code {
        Some(status) if !(200..300).contains(&status) => Some(FallbackReason::NonOkResponse),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(engine_configured: bool, has_session: bool, status_code: Option<u16>) -> FallbackContext {
        FallbackContext {
            engine_configured,
            has_session,
            status_code,
        }
    }

    #[test]
    fn not_configured_takes_priority() {
        assert_eq!(
            resolve_fallback_reason(&ctx(false, true, Some(503))),
            Some(FallbackReason::NotConfigured)
        );
        assert_eq!(
            resolve_fallback_reason(&ctx(false, false, None)),
            Some(FallbackReason::NotConfigured)
        );
    }

    #[test]
    fn missing_session_beats_status() {
        assert_eq!(
            resolve_fallback_reason(&ctx(true, false, Some(500))),
            Some(FallbackReason::NoSession)
        );
    }

    #[test]
    fn non_success_status_is_non_ok_response() {
        assert_eq!(
            resolve_fallback_reason(&ctx(true, true, Some(503))),
            Some(FallbackReason::NonOkResponse)
        );
        assert_eq!(
            resolve_fallback_reason(&ctx(true, true, Some(302))),
            Some(FallbackReason::NonOkResponse)
        );
    }

    #[test]
    fn healthy_request_needs_no_fallback() {
        assert_eq!(resolve_fallback_reason(&ctx(true, true, Some(200))), None);
        assert_eq!(resolve_fallback_reason(&ctx(true, true, Some(204))), None);
        assert_eq!(resolve_fallback_reason(&ctx(true, true, None)), None);
    }

    #[test]
    fn context_reads_camel_case() {
        let parsed: FallbackContext = serde_json::from_str(
            r#"{"engineConfigured": true, "hasSession": true, "statusCode": 503}"#,
        )
        .expect("context should parse");
        assert_eq!(parsed, ctx(true, true, Some(503)));
    }
}
