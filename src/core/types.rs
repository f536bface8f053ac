//! Core data types shared across the pipeline

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One block's configuration: a tagged tree of objects, arrays and scalars
pub type PropertyTree = Value;

/// Identifier for one editing conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Broad area of a block an intent touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentCategory {
    Layout,
    Background,
    Content,
    Spacing,
    Alignment,
}

/// What to do with the targeted value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentAction {
    Set,
    Increase,
    Decrease,
    Toggle,
    Reset,
}

impl IntentAction {
    /// Relative actions move along an ordinal scale
    pub fn is_relative(&self) -> bool {
        matches!(self, IntentAction::Increase | IntentAction::Decrease)
    }
}

/// Intensity of a relative adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Slight,
    Moderate,
    Significant,
}

impl Default for Modifier {
    fn default() -> Self {
        Self::Moderate
    }
}

impl Modifier {
    /// Number of scale steps this modifier moves
    pub fn steps(&self) -> usize {
        match self {
            Modifier::Slight => 1,
            Modifier::Moderate => 2,
            Modifier::Significant => 3,
        }
    }
}

/// A structured, confidence-scored reading of a command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub category: IntentCategory,
    pub action: IntentAction,
    /// Dot-delimited path inside the property tree
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<Modifier>,
    /// Confidence in [0, 1]
    pub confidence: f32,
}

/// A fully resolved, ready-to-apply mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyChange {
    pub path: String,
    pub old_value: Option<Value>,
    pub new_value: Value,
    pub intent: Intent,
}

/// How a routing decision was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationMethod {
    Rule,
    Ai,
    Fallback,
}

/// Which operation handler should run for a command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub agent_name: String,
    pub confidence: f32,
    pub reasoning: String,
    pub method: ClassificationMethod,
}

/// Input to the decision engine; not retained after a decision
#[derive(Debug, Clone, PartialEq)]
pub struct BlockState {
    pub block_type: String,
    pub current: Option<PropertyTree>,
    pub defaults: PropertyTree,
    pub schema_summary: Option<String>,
}
