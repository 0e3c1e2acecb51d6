use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::contract::{CanonicalPayload, EquivalenceReport, TokenCategory};
use crate::fallback::FallbackEvent;
use crate::gaps::{describe_gap, EvaluationGap};
use crate::types::TimingWarning;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn render_report_table(report: &EquivalenceReport) -> String {
    let mut table = new_table();
    table.set_header(vec!["Category", "Left", "Right", "Only Left", "Only Right"]);

    for category in TokenCategory::ALL {
        let drift = report.drifts.iter().find(|d| d.category == category);
        let row = match drift {
            Some(d) => Row::from(vec![
                Cell::new(category.to_string()).fg(Color::Red),
                Cell::new(d.left_count),
                Cell::new(d.right_count),
                Cell::new(d.only_left.join("\n")),
                Cell::new(d.only_right.join("\n")),
            ]),
            None => Row::from(vec![
                Cell::new(category.to_string()).fg(Color::Green),
                Cell::new("="),
                Cell::new("="),
                Cell::new("-"),
                Cell::new("-"),
            ]),
        };
        table.add_row(row);
    }

    let verdict = if report.equivalent {
        "EQUIVALENT"
    } else {
        "DRIFT"
    };
    format!(
        "{table}\n{verdict}\nleft digest:  {}\nright digest: {}",
        report.left_digest, report.right_digest
    )
}

pub fn render_tokens_table(canonical: &CanonicalPayload) -> String {
    let mut table = new_table();
    table.set_header(vec!["Category", "Token"]);
    for category in TokenCategory::ALL {
        for token in category.tokens(canonical) {
            table.add_row(vec![category.to_string(), token.clone()]);
        }
    }
    format!("{table}\ndigest: {}", canonical.digest())
}

pub fn render_timing_table(warnings: &[TimingWarning]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Id",
        "Severity",
        "Min Hours",
        "Actual Hours",
        "Source",
        "Source Logged",
        "Target",
        "Target Logged",
    ]);
    for w in warnings {
        table.add_row(vec![
            w.id.clone(),
            w.severity.to_string().to_uppercase(),
            format!("{:.2}", w.min_hours_apart),
            format!("{:.2}", w.actual_hours_apart),
            w.source.id.clone(),
            w.source.logged_at.to_rfc3339(),
            w.target.id.clone(),
            w.target.logged_at.to_rfc3339(),
        ]);
    }
    table.to_string()
}

pub fn render_gaps_table(gaps: &[EvaluationGap]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Source", "Target", "Message"]);
    for gap in gaps {
        table.add_row(vec![
            gap.source_supplement_id.clone(),
            gap.target_supplement_id.clone(),
            describe_gap(gap),
        ]);
    }
    table.to_string()
}

pub fn render_fallback_table(event: Option<&FallbackEvent>) -> String {
    let mut table = new_table();
    table.set_header(vec!["Reason", "Status", "Label Version"]);
    match event {
        Some(e) => table.add_row(vec![
            e.reason.to_string(),
            e.status_code
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string()),
            e.label_version.to_string(),
        ]),
        None => table.add_row(vec!["none", "-", "-"]),
    };
    table.to_string()
}
