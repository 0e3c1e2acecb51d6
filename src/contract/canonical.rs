use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::{AnalysisPayload, Interaction, RatioWarning, TimingWarning};

const TOKEN_SEPARATOR: char = '|';

/// Sorted canonical tokens for one payload. Duplicates are kept, so two
/// payloads match only when every token occurs the same number of times.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalPayload {
    pub interactions: Vec<String>,
    pub ratio_warnings: Vec<String>,
    pub timing_warnings: Vec<String>,
}

impl CanonicalPayload {
    pub fn token_count(&self) -> usize {
        self.interactions.len() + self.ratio_warnings.len() + self.timing_warnings.len()
    }

    /// SHA-256 over all three token lists, category by category.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for (label, tokens) in [
            ("interactions", &self.interactions),
            ("ratio_warnings", &self.ratio_warnings),
            ("timing_warnings", &self.timing_warnings),
        ] {
            hasher.update(label.as_bytes());
            hasher.update(b"\n");
            for token in tokens {
                hasher.update(token.as_bytes());
                hasher.update(b"\n");
            }
        }
        format!("{:x}", hasher.finalize())
    }
}

pub fn canonicalize(payload: &AnalysisPayload) -> CanonicalPayload {
    CanonicalPayload {
        interactions: sorted(payload.interactions().iter().map(interaction_token)),
        ratio_warnings: sorted(payload.ratio_warnings().iter().map(ratio_token)),
        timing_warnings: sorted(payload.timing_warnings().iter().map(timing_token)),
    }
}

pub fn interaction_token(interaction: &Interaction) -> String {
    join_token(&[
        interaction.id.as_str(),
        interaction.kind.as_label(),
        interaction.severity.as_label(),
        interaction.source.id.as_str(),
        interaction.target.id.as_str(),
    ])
}

pub fn ratio_token(warning: &RatioWarning) -> String {
    join_token(&[
        warning.id.as_str(),
        warning.severity.as_label(),
        format_round3(warning.current_ratio).as_str(),
        warning.source.id.as_str(),
        warning.target.id.as_str(),
    ])
}

pub fn timing_token(warning: &TimingWarning) -> String {
    join_token(&[
        warning.id.as_str(),
        warning.severity.as_label(),
        format_round3(warning.min_hours_apart).as_str(),
        warning.source.id.as_str(),
        warning.target.id.as_str(),
    ])
}

pub fn round3(value: f64) -> f64 {
    // already integral at this magnitude, and scaling by 1000 could overflow
    if !value.is_finite() || value.abs() >= 1e15 {
        return value;
    }
    let rounded = (value * 1000.0).round() / 1000.0;
    // -0.0 and 0.0 must produce the same token
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Shortest decimal rendering of `round3(value)`: `26` rather than `26.000`.
pub fn format_round3(value: f64) -> String {
    round3(value).to_string()
}

fn join_token(parts: &[&str]) -> String {
    let mut out = String::new();
    for (idx, part) in parts.iter().enumerate() {
        if idx > 0 {
            out.push(TOKEN_SEPARATOR);
        }
        out.push_str(part);
    }
    out
}

fn sorted(tokens: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = tokens.collect();
    out.sort();
    out
}
