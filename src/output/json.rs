use anyhow::Result;
use serde::Serialize;

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Single-line form, for telemetry sinks that read one record per line.
pub fn render_json_line<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::{FallbackEvent, FallbackReason};

    #[test]
    fn json_line_has_no_newlines() {
        let event = FallbackEvent::new(FallbackReason::Timeout, None);
        let line = render_json_line(&event).expect("serialize");
        assert!(!line.contains('\n'));
        assert!(render_json(&event).expect("serialize").contains('\n'));
    }
}
