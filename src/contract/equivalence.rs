use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};
use tracing::debug;

use crate::contract::canonical::{canonicalize, CanonicalPayload};
use crate::types::AnalysisPayload;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TokenCategory {
    Interactions,
    RatioWarnings,
    TimingWarnings,
}

impl TokenCategory {
    /// Comparison order.
    pub const ALL: [TokenCategory; 3] = [
        TokenCategory::Interactions,
        TokenCategory::RatioWarnings,
        TokenCategory::TimingWarnings,
    ];

    pub fn tokens<'a>(&self, canonical: &'a CanonicalPayload) -> &'a [String] {
        match self {
            Self::Interactions => &canonical.interactions,
            Self::RatioWarnings => &canonical.ratio_warnings,
            Self::TimingWarnings => &canonical.timing_warnings,
        }
    }
}

impl Display for TokenCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Interactions => "interactions",
            Self::RatioWarnings => "ratio_warnings",
            Self::TimingWarnings => "timing_warnings",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryDrift {
    pub category: TokenCategory,
    pub left_count: usize,
    pub right_count: usize,
    pub only_left: Vec<String>,
    pub only_right: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EquivalenceReport {
    pub equivalent: bool,
    pub left_digest: String,
    pub right_digest: String,
    pub drifts: Vec<CategoryDrift>,
}

impl EquivalenceReport {
    pub fn first_mismatch(&self) -> Option<TokenCategory> {
        self.drifts.first().map(|d| d.category)
    }
}

/// True when both payloads carry the same canonical token multiset in every
/// category. Categories are checked in `TokenCategory::ALL` order and the
/// first mismatch decides.
pub fn is_equivalent(left: &AnalysisPayload, right: &AnalysisPayload) -> bool {
    let left = canonicalize(left);
    let right = canonicalize(right);
    for category in TokenCategory::ALL {
        let (l, r) = (category.tokens(&left), category.tokens(&right));
        if l != r {
            debug!(
                %category,
                left_tokens = l.len(),
                right_tokens = r.len(),
                "analysis payloads diverge"
            );
            return false;
        }
    }
    true
}

/// Full comparison that records every diverging category, not just the first.
pub fn compare_payloads(left: &AnalysisPayload, right: &AnalysisPayload) -> EquivalenceReport {
    let left = canonicalize(left);
    let right = canonicalize(right);
    compare_canonical(&left, &right)
}

pub fn compare_canonical(left: &CanonicalPayload, right: &CanonicalPayload) -> EquivalenceReport {
    let drifts: Vec<CategoryDrift> = TokenCategory::ALL
        .into_iter()
        .filter_map(|category| {
            diff_tokens(category, category.tokens(left), category.tokens(right))
        })
        .collect();
    EquivalenceReport {
        equivalent: drifts.is_empty(),
        left_digest: left.digest(),
        right_digest: right.digest(),
        drifts,
    }
}

fn diff_tokens(category: TokenCategory, left: &[String], right: &[String]) -> Option<CategoryDrift> {
    if left == right {
        return None;
    }

    let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
    for token in left {
        *counts.entry(token.as_str()).or_default() += 1;
    }
    for token in right {
        *counts.entry(token.as_str()).or_default() -= 1;
    }

    let mut only_left = Vec::new();
    let mut only_right = Vec::new();
    for (token, balance) in counts {
        let repeat = balance.unsigned_abs() as usize;
        if balance > 0 {
            only_left.extend(std::iter::repeat(token.to_string()).take(repeat));
        } else if balance < 0 {
            only_right.extend(std::iter::repeat(token.to_string()).take(repeat));
        }
    }

    Some(CategoryDrift {
        category,
        left_count: left.len(),
        right_count: right.len(),
        only_left,
        only_right,
    })
}

/// Line diff of two canonical forms, one token per line, grouped by category.
pub fn token_diff(left: &CanonicalPayload, right: &CanonicalPayload) -> String {
    let left_text = render_tokens(left);
    let right_text = render_tokens(right);
    let diff = TextDiff::from_lines(&left_text, &right_text);
    let mut out = String::new();
    for change in diff.iter_all_changes() {
        let symbol = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        out.push_str(symbol);
        out.push_str(change.value());
    }
    out
}

fn render_tokens(canonical: &CanonicalPayload) -> String {
    let mut out = String::new();
    for category in TokenCategory::ALL {
        out.push_str(&format!("[{category}]\n"));
        for token in category.tokens(canonical) {
            out.push_str(token);
            out.push('\n');
        }
    }
    out
}
