use std::fmt;

use serde::{Deserialize, Serialize};

/// How a phase card behaves when tapped: a plain step drills straight
/// into its task list, a multi-step requires building/level/unit
/// disambiguation first. The API is free to grow new kinds, so unknown
/// strings are carried through as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StepKind {
    Step,
    MultiStep,
    Other(String),
}

impl StepKind {
    pub fn as_str(&self) -> &str {
        match self {
            StepKind::Step => "step",
            StepKind::MultiStep => "multi-step",
            StepKind::Other(s) => s.as_str(),
        }
    }

    pub fn parse_str(s: &str) -> Self {
        match s {
            "step" => StepKind::Step,
            "multi-step" => StepKind::MultiStep,
            other => StepKind::Other(other.to_string()),
        }
    }
}

impl From<String> for StepKind {
    fn from(s: String) -> Self {
        StepKind::parse_str(&s)
    }
}

impl From<StepKind> for String {
    fn from(k: StepKind) -> Self {
        k.as_str().to_string()
    }
}

impl Default for StepKind {
    fn default() -> Self {
        StepKind::Step
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One phase card of a project (e.g. Design, Finishes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDescriptor {
    #[serde(default)]
    pub step_type: String,
    #[serde(default)]
    pub step_id: String,
    #[serde(rename = "_id", default)]
    pub record_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: StepKind,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub completed_count: i64,
    #[serde(default)]
    pub last_week_count: i64,
}
