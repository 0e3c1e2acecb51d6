use anyhow::Result;

use crate::contract::{CanonicalPayload, EquivalenceReport, TokenCategory};
use crate::gaps::{describe_gap, EvaluationGap};
use crate::types::TimingWarning;

pub fn report_to_csv(report: &EquivalenceReport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["category", "side", "token"])?;
    for drift in &report.drifts {
        for token in &drift.only_left {
            writer.write_record([drift.category.to_string().as_str(), "left", token.as_str()])?;
        }
        for token in &drift.only_right {
            writer.write_record([drift.category.to_string().as_str(), "right", token.as_str()])?;
        }
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn tokens_to_csv(canonical: &CanonicalPayload) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["category", "token"])?;
    for category in TokenCategory::ALL {
        for token in category.tokens(canonical) {
            writer.write_record([category.to_string().as_str(), token.as_str()])?;
        }
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn timing_to_csv(warnings: &[TimingWarning]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "id",
        "severity",
        "min_hours_apart",
        "actual_hours_apart",
        "source_id",
        "source_logged_at",
        "target_id",
        "target_logged_at",
    ])?;
    for w in warnings {
        writer.write_record([
            w.id.clone(),
            w.severity.to_string(),
            w.min_hours_apart.to_string(),
            w.actual_hours_apart.to_string(),
            w.source.id.clone(),
            w.source.logged_at.to_rfc3339(),
            w.target.id.clone(),
            w.target.logged_at.to_rfc3339(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn gaps_to_csv(gaps: &[EvaluationGap]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["source_supplement_id", "target_supplement_id", "message"])?;
    for gap in gaps {
        writer.write_record([
            gap.source_supplement_id.clone(),
            gap.target_supplement_id.clone(),
            describe_gap(gap),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}
