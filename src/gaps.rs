use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GapReason {
    MissingDosage,
    MissingSupplementData,
    NormalizationFailed,
    #[serde(other)]
    Unknown,
}

/// A supplement pair the ratio check could not evaluate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationGap {
    pub source_supplement_id: String,
    pub target_supplement_id: String,
    pub reason: GapReason,
}

pub fn gap_reason_text(reason: GapReason) -> &'static str {
    match reason {
        GapReason::MissingDosage => "missing dosage",
        GapReason::MissingSupplementData => "missing supplement data",
        GapReason::NormalizationFailed => "unit normalization failed",
        GapReason::Unknown => "unknown reason",
    }
}

pub fn describe_gap(gap: &EvaluationGap) -> String {
    format!(
        "Ratio check could not evaluate one supplement pair: {}.",
        gap_reason_text(gap.reason)
    )
}
