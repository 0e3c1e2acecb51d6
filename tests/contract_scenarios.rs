use chrono::{TimeZone, Utc};
use interaction_contract::contract::{canonicalize, compare_payloads, is_equivalent};
use interaction_contract::fallback::{
    classify_anyhow, resolve_fallback_reason, FallbackContext, FallbackReason, ProviderError,
};
use interaction_contract::gaps::{describe_gap, EvaluationGap};
use interaction_contract::timing::{reconcile, RemoteTimingRecord};
use interaction_contract::types::AnalysisPayload;
use serde_json::json;

fn payload(value: serde_json::Value) -> AnalysisPayload {
    serde_json::from_value(value).expect("payload fixture should parse")
}

#[test]
fn local_and_remote_agree_after_merging_warnings_and_synergies() {
    let zinc_copper = json!({
        "id": "i-1", "type": "competition", "severity": "medium",
        "source": {"id": "zn", "name": "Zinc"},
        "target": {"id": "cu", "name": "Copper"}
    });
    let d3_k2 = json!({
        "id": "s-1", "type": "synergy", "severity": "low",
        "source": {"id": "d3", "name": "Vitamin D3"},
        "target": {"id": "k2", "name": "Vitamin K2"}
    });

    let local = payload(json!({
        "warnings": [zinc_copper.clone()],
        "synergies": [d3_k2.clone()],
        "ratioWarnings": null
    }));
    // remote emits the synergy in `warnings`, in a different order, and omits
    // empty lists entirely
    let remote = payload(json!({
        "warnings": [d3_k2, zinc_copper]
    }));

    assert!(is_equivalent(&local, &remote));
    assert!(is_equivalent(&remote, &local));
    let report = compare_payloads(&local, &remote);
    assert!(report.equivalent);
    assert_eq!(report.left_digest, report.right_digest);
    assert_eq!(canonicalize(&local), canonicalize(&remote));
}

#[test]
fn single_severity_drift_is_reported() {
    let local = payload(json!({
        "ratioWarnings": [{
            "id": "r-1", "severity": "medium", "currentRatio": 26.0001,
            "minRatio": 8, "maxRatio": 15, "optimalRatio": 10,
            "source": {"id": "zn", "name": "Zinc"},
            "target": {"id": "cu", "name": "Copper"}
        }]
    }));
    let remote = payload(json!({
        "ratioWarnings": [{
            "id": "r-1", "severity": "critical", "currentRatio": 26.0003,
            "source": {"id": "zn", "name": "Zinc"},
            "target": {"id": "cu", "name": "Copper"}
        }]
    }));

    assert!(!is_equivalent(&local, &remote));
    let report = compare_payloads(&local, &remote);
    assert_eq!(report.drifts.len(), 1);
    assert_eq!(report.drifts[0].only_left, vec!["r-1|medium|26|zn|cu"]);
    assert_eq!(report.drifts[0].only_right, vec!["r-1|critical|26|zn|cu"]);
}

#[test]
fn degraded_request_is_labelled_for_telemetry() {
    let context = FallbackContext {
        engine_configured: true,
        has_session: true,
        status_code: Some(503),
    };
    assert_eq!(
        resolve_fallback_reason(&context),
        Some(FallbackReason::NonOkResponse)
    );

    let err = anyhow::Error::new(ProviderError::status(503, "maintenance"))
        .context("interaction analysis unavailable");
    assert_eq!(classify_anyhow(&err).as_label(), "non_ok_response");
}

#[test]
fn remote_timing_records_become_displayable() {
    let fallback = Utc
        .with_ymd_and_hms(2024, 6, 1, 9, 0, 0)
        .single()
        .expect("valid instant");
    let records: Vec<RemoteTimingRecord> = serde_json::from_value(json!([
        {
            "id": "t-1", "severity": "medium", "minHoursApart": 2, "actualHoursApart": 0.5,
            "reason": "iron and calcium compete for absorption",
            "sourceSupplementId": "fe", "sourceSupplementName": "Iron",
            "targetSupplementId": "ca", "targetSupplementName": "Calcium",
            "sourceLoggedAt": "bad-date", "targetLoggedAt": "2024-06-01T07:45:00Z"
        },
        {
            "id": "t-2", "severity": "low", "minHoursApart": 1, "actualHoursApart": 0.25,
            "reason": "spacing", "sourceSupplementId": "zn", "targetSupplementId": "cu"
        }
    ]))
    .expect("records should parse");

    let warnings = reconcile(fallback, &records);
    assert_eq!(warnings.len(), 2);
    assert_eq!(warnings[0].id, "t-1");
    assert_eq!(warnings[0].source.logged_at, fallback);
    assert_ne!(warnings[0].target.logged_at, fallback);
    assert_eq!(warnings[1].source.logged_at, fallback);
    assert_eq!(warnings[1].target.logged_at, fallback);

    // reconciled records round-trip into a payload the checker accepts
    let as_payload = AnalysisPayload {
        timing_warnings: Some(warnings),
        ..AnalysisPayload::default()
    };
    assert_eq!(canonicalize(&as_payload).timing_warnings.len(), 2);
}

#[test]
fn gap_sentence_for_wire_record() {
    let gap: EvaluationGap = serde_json::from_value(json!({
        "sourceSupplementId": "mg",
        "targetSupplementId": "zn",
        "reason": "normalization_failed"
    }))
    .expect("gap should parse");
    assert_eq!(
        describe_gap(&gap),
        "Ratio check could not evaluate one supplement pair: unit normalization failed."
    );
}
