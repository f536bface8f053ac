//! Block state assessment
//!
//! Decides whether a block's current tree is empty, untouched or customised
//! relative to its defaults. The heuristic never calls out; the generator
//! variant asks the text-generation collaborator instead.

use crate::core::error::{AssistError, Result};
use crate::core::types::PropertyTree;
use crate::llm::client::{with_timeout, CompletionRequest, TextGenerator};
use crate::merge::extract::extract_structured;
use crate::tree::path;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Assessment of a block's state, mapped 1:1 into decision actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateAssessment {
    /// One of `create`, `update`, `replace`, `clarify`
    pub intent: String,
    pub reason: String,
}

impl StateAssessment {
    fn new(intent: &str, reason: impl Into<String>) -> Self {
        Self {
            intent: intent.to_string(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
pub trait StateClassifier: Send + Sync {
    async fn classify_state(
        &self,
        current: &PropertyTree,
        defaults: &PropertyTree,
        schema_summary: Option<&str>,
    ) -> Result<StateAssessment>;
}

/// Share of customised leaves above which a block counts as mostly edited
const MOSTLY_CUSTOMISED: f32 = 0.5;

/// Leaf-comparison classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicStateClassifier;

impl HeuristicStateClassifier {
    pub fn assess(&self, current: &PropertyTree, defaults: &PropertyTree) -> StateAssessment {
        let is_empty = match current {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        };
        if is_empty {
            return StateAssessment::new("create", "Block has no content yet.");
        }
        if current == defaults {
            return StateAssessment::new(
                "replace",
                "Block still holds its default content; replacing it wholesale.",
            );
        }

        let leaves = path::leaves(current);
        let customised = leaves
            .iter()
            .filter(|(leaf_path, value)| path::get(defaults, leaf_path) != Some(*value))
            .count();

        if customised == 0 {
            return StateAssessment::new(
                "replace",
                "Every field still matches its default; replacing it wholesale.",
            );
        }

        let share = customised as f32 / leaves.len().max(1) as f32;
        let extent = if share >= MOSTLY_CUSTOMISED { "mostly" } else { "partially" };
        StateAssessment::new(
            "update",
            format!(
                "Block is {} customised ({} of {} fields); updating in place to keep edits.",
                extent,
                customised,
                leaves.len()
            ),
        )
    }
}

#[async_trait]
impl StateClassifier for HeuristicStateClassifier {
    async fn classify_state(
        &self,
        current: &PropertyTree,
        defaults: &PropertyTree,
        _schema_summary: Option<&str>,
    ) -> Result<StateAssessment> {
        Ok(self.assess(current, defaults))
    }
}

const STATE_SYSTEM_PROMPT: &str = r#"You inspect one content block of a page builder and decide how new content should be applied.

- "create": the block has no meaningful content
- "replace": the block still holds placeholder/default content
- "update": the block has been customised and edits should be applied in place
- "clarify": you cannot tell

OUTPUT FORMAT (JSON only, no explanation):
{"intent": "create|update|replace|clarify", "reason": "one short sentence"}
"#;

/// Classifier backed by the text-generation collaborator
pub struct LlmStateClassifier {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl LlmStateClassifier {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }
}

#[async_trait]
impl StateClassifier for LlmStateClassifier {
    async fn classify_state(
        &self,
        current: &PropertyTree,
        defaults: &PropertyTree,
        schema_summary: Option<&str>,
    ) -> Result<StateAssessment> {
        let mut prompt = format!("CURRENT:\n{}\n\nDEFAULTS:\n{}\n", current, defaults);
        if let Some(summary) = schema_summary {
            prompt.push_str(&format!("\nSCHEMA:\n{}\n", summary));
        }

        let request = CompletionRequest::new(STATE_SYSTEM_PROMPT, prompt).with_temperature(0.0);
        let response = with_timeout(self.generator.as_ref(), &request, self.timeout).await?;

        serde_json::from_value(extract_structured(&response)?).map_err(|e| {
            AssistError::UnparsableResponse(format!("Failed to parse state assessment: {}", e))
        })
    }
}
