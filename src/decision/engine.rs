//! Create / update / replace / clarify decisions for generated content

use crate::core::types::{BlockState, PropertyTree};
use crate::decision::heuristic::{HeuristicStateClassifier, StateClassifier};
use crate::schema::registry::SchemaProvider;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Reason given when a block has no data at all
pub const NO_EXISTING_DATA: &str = "No existing data found for this block; creating from defaults.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionAction {
    Create,
    Update,
    Replace,
    Clarify,
}

impl DecisionAction {
    /// Summary order
    pub const ALL: [DecisionAction; 4] = [
        DecisionAction::Create,
        DecisionAction::Update,
        DecisionAction::Replace,
        DecisionAction::Clarify,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionAction::Create => "create",
            DecisionAction::Update => "update",
            DecisionAction::Replace => "replace",
            DecisionAction::Clarify => "clarify",
        }
    }

    pub fn parse(intent: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(intent.trim()))
    }

    fn noun(&self, count: usize) -> &'static str {
        match (self, count == 1) {
            (DecisionAction::Create, true) => "create",
            (DecisionAction::Create, false) => "creates",
            (DecisionAction::Update, true) => "update",
            (DecisionAction::Update, false) => "updates",
            (DecisionAction::Replace, true) => "replace",
            (DecisionAction::Replace, false) => "replaces",
            (DecisionAction::Clarify, true) => "clarification",
            (DecisionAction::Clarify, false) => "clarifications",
        }
    }
}

impl std::fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub action: DecisionAction,
    /// Block type the decision applies to
    pub target: String,
    pub reason: String,
}

/// Per-action counts over a page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DecisionCounts {
    pub create: usize,
    pub update: usize,
    pub replace: usize,
    pub clarify: usize,
}

impl DecisionCounts {
    pub fn get(&self, action: DecisionAction) -> usize {
        match action {
            DecisionAction::Create => self.create,
            DecisionAction::Update => self.update,
            DecisionAction::Replace => self.replace,
            DecisionAction::Clarify => self.clarify,
        }
    }

    fn bump(&mut self, action: DecisionAction) {
        match action {
            DecisionAction::Create => self.create += 1,
            DecisionAction::Update => self.update += 1,
            DecisionAction::Replace => self.replace += 1,
            DecisionAction::Clarify => self.clarify += 1,
        }
    }

    /// Sentence like "3 updates, 1 create"
    pub fn summary(&self) -> String {
        let parts: Vec<String> = DecisionAction::ALL
            .iter()
            .filter_map(|action| {
                let n = self.get(*action);
                (n > 0).then(|| format!("{} {}", n, action.noun(n)))
            })
            .collect();
        if parts.is_empty() {
            "no changes".to_string()
        } else {
            parts.join(", ")
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageDecision {
    pub decisions: Vec<Decision>,
    pub counts: DecisionCounts,
    pub summary: String,
}

pub struct DecisionEngine {
    classifier: Arc<dyn StateClassifier>,
    schemas: Option<Arc<dyn SchemaProvider>>,
}

impl DecisionEngine {
    pub fn new(classifier: Arc<dyn StateClassifier>) -> Self {
        Self {
            classifier,
            schemas: None,
        }
    }

    /// Engine using the leaf-comparison heuristic
    pub fn heuristic() -> Self {
        Self::new(Arc::new(HeuristicStateClassifier))
    }

    /// Unknown block types (per `schemas`) become `clarify`
    pub fn with_schemas(mut self, schemas: Arc<dyn SchemaProvider>) -> Self {
        self.schemas = Some(schemas);
        self
    }

    pub async fn decide(
        &self,
        block_type: &str,
        current: Option<&PropertyTree>,
        defaults: &PropertyTree,
        schema_summary: Option<&str>,
    ) -> Decision {
        let target = block_type.trim().to_string();
        let decision = |action, reason: String| Decision {
            action,
            target: target.clone(),
            reason,
        };

        if !is_valid_block_type(&target) {
            return decision(
                DecisionAction::Clarify,
                "Which block should this apply to? The block type is missing or invalid.".into(),
            );
        }
        if let Some(schemas) = &self.schemas {
            if !schemas.contains(&target) {
                return decision(
                    DecisionAction::Clarify,
                    format!("Unknown block type '{}'.", target),
                );
            }
        }

        let Some(current) = current else {
            return decision(DecisionAction::Create, NO_EXISTING_DATA.into());
        };

        match self
            .classifier
            .classify_state(current, defaults, schema_summary)
            .await
        {
            Ok(assessment) => match DecisionAction::parse(&assessment.intent) {
                Some(action) => decision(action, assessment.reason),
                None => {
                    tracing::warn!("State classifier returned unknown intent {:?}", assessment.intent);
                    decision(
                        DecisionAction::Clarify,
                        format!("Unrecognised assessment '{}'.", assessment.intent),
                    )
                }
            },
            Err(e) => {
                tracing::warn!("State classification failed for '{}': {}", target, e);
                decision(DecisionAction::Clarify, e.user_message())
            }
        }
    }

    /// Decide for every block on a page and summarise
    pub async fn decide_page(&self, blocks: &[BlockState]) -> PageDecision {
        let mut decisions = Vec::with_capacity(blocks.len());
        let mut counts = DecisionCounts::default();

        for block in blocks {
            let decision = self
                .decide(
                    &block.block_type,
                    block.current.as_ref(),
                    &block.defaults,
                    block.schema_summary.as_deref(),
                )
                .await;
            counts.bump(decision.action);
            decisions.push(decision);
        }

        let summary = counts.summary();
        tracing::info!("Page decision: {}", summary);
        PageDecision {
            decisions,
            counts,
            summary,
        }
    }
}

fn is_valid_block_type(block_type: &str) -> bool {
    !block_type.is_empty()
        && block_type
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
