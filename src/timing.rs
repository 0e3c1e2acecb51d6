use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Severity, TimedEntity, TimingWarning};

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Timing warning as the remote service sends it. Either timestamp may be
/// missing or malformed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTimingRecord {
    pub id: String,
    pub severity: Severity,
    pub min_hours_apart: f64,
    pub actual_hours_apart: f64,
    #[serde(default)]
    pub reason: String,
    pub source_supplement_id: String,
    #[serde(default)]
    pub source_supplement_name: String,
    pub target_supplement_id: String,
    #[serde(default)]
    pub target_supplement_name: String,
    #[serde(default)]
    pub source_logged_at: Option<String>,
    #[serde(default)]
    pub target_logged_at: Option<String>,
}

/// Resolves both timestamps of every record. A missing or unparseable value
/// is replaced by `fallback` for that field alone; output order and length
/// match the input.
pub fn reconcile(fallback: DateTime<Utc>, records: &[RemoteTimingRecord]) -> Vec<TimingWarning> {
    let mut substituted = 0usize;
    let out: Vec<TimingWarning> = records
        .iter()
        .map(|record| {
            let source_at = resolve(record.source_logged_at.as_deref(), fallback, &mut substituted);
            let target_at = resolve(record.target_logged_at.as_deref(), fallback, &mut substituted);
            TimingWarning {
                id: record.id.clone(),
                severity: record.severity,
                min_hours_apart: record.min_hours_apart,
                actual_hours_apart: record.actual_hours_apart,
                reason: record.reason.clone(),
                source: TimedEntity {
                    id: record.source_supplement_id.clone(),
                    name: record.source_supplement_name.clone(),
                    logged_at: source_at,
                },
                target: TimedEntity {
                    id: record.target_supplement_id.clone(),
                    name: record.target_supplement_name.clone(),
                    logged_at: target_at,
                },
            }
        })
        .collect();
    if substituted > 0 {
        debug!(
            records = records.len(),
            substituted,
            fallback = %fallback.to_rfc3339(),
            "substituted fallback timestamps in timing records"
        );
    }
    out
}

fn resolve(raw: Option<&str>, fallback: DateTime<Utc>, substituted: &mut usize) -> DateTime<Utc> {
    match raw.and_then(parse_logged_at) {
        Some(parsed) => parsed,
        None => {
            *substituted += 1;
            fallback
        }
    }
}

/// Parses an ISO-8601 instant. Values without an offset are read as UTC and a
/// bare date means midnight UTC.
pub fn parse_logged_at(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
