use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entity {
    pub id: String,
    pub name: String,
}

impl Entity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimedEntity {
    pub id: String,
    pub name: String,
    pub logged_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    Critical,
}

impl Severity {
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::Critical => "critical",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

#[derive(Debug, Error)]
#[error("unknown severity: {0}")]
pub struct SeverityParseError(pub String);

impl FromStr for Severity {
    type Err = SeverityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "critical" => Ok(Self::Critical),
            _ => Err(SeverityParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Competition,
    Synergy,
}

impl InteractionKind {
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Competition => "competition",
            Self::Synergy => "synergy",
        }
    }
}

impl Display for InteractionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

/// One interaction record as providers emit it, in either the `warnings` or
/// the `synergies` array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InteractionWarning {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    pub severity: Severity,
    pub source: Entity,
    pub target: Entity,
}

/// Interaction record after the two legacy arrays are merged. The kind tag is
/// the only thing that distinguishes a competition from a synergy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Interaction {
    pub id: String,
    pub kind: InteractionKind,
    pub severity: Severity,
    pub source: Entity,
    pub target: Entity,
}

impl From<&InteractionWarning> for Interaction {
    fn from(value: &InteractionWarning) -> Self {
        Self {
            id: value.id.clone(),
            kind: value.kind,
            severity: value.severity,
            source: value.source.clone(),
            target: value.target.clone(),
        }
    }
}

impl From<Interaction> for InteractionWarning {
    fn from(value: Interaction) -> Self {
        Self {
            id: value.id,
            kind: value.kind,
            severity: value.severity,
            source: value.source,
            target: value.target,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RatioWarning {
    pub id: String,
    pub severity: Severity,
    pub current_ratio: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimal_ratio: Option<f64>,
    pub source: Entity,
    pub target: Entity,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimingWarning {
    pub id: String,
    pub severity: Severity,
    pub min_hours_apart: f64,
    pub actual_hours_apart: f64,
    pub reason: String,
    pub source: TimedEntity,
    pub target: TimedEntity,
}

/// Result of one analysis call, from either provider. Absent and `null`
/// lists both deserialize to `None` and read as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisPayload {
    #[serde(default)]
    pub warnings: Option<Vec<InteractionWarning>>,
    #[serde(default)]
    pub synergies: Option<Vec<InteractionWarning>>,
    #[serde(default)]
    pub ratio_warnings: Option<Vec<RatioWarning>>,
    #[serde(default)]
    pub timing_warnings: Option<Vec<TimingWarning>>,
}

impl AnalysisPayload {
    /// `warnings` followed by `synergies`, as one list.
    pub fn interactions(&self) -> Vec<Interaction> {
        self.warnings
            .iter()
            .chain(self.synergies.iter())
            .flatten()
            .map(Interaction::from)
            .collect()
    }

    pub fn ratio_warnings(&self) -> &[RatioWarning] {
        self.ratio_warnings.as_deref().unwrap_or_default()
    }

    pub fn timing_warnings(&self) -> &[TimingWarning] {
        self.timing_warnings.as_deref().unwrap_or_default()
    }

    /// Splits a merged list back into the two-array encoding: competitions go
    /// to `warnings`, synergies to `synergies`.
    pub fn from_interactions(
        interactions: Vec<Interaction>,
        ratio_warnings: Vec<RatioWarning>,
        timing_warnings: Vec<TimingWarning>,
    ) -> Self {
        let (synergies, warnings): (Vec<_>, Vec<_>) = interactions
            .into_iter()
            .map(InteractionWarning::from)
            .partition(|w| w.kind == InteractionKind::Synergy);
        Self {
            warnings: Some(warnings),
            synergies: Some(synergies),
            ratio_warnings: Some(ratio_warnings),
            timing_warnings: Some(timing_warnings),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.as_ref().map_or(true, Vec::is_empty)
            && self.synergies.as_ref().map_or(true, Vec::is_empty)
            && self.ratio_warnings().is_empty()
            && self.timing_warnings().is_empty()
    }
}
