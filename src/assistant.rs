//! Host-facing facade
//!
//! [`Assistant`] owns one copy of every shared table and collaborator and
//! exposes the pipeline stages individually as well as the full
//! classify-and-dispatch path. It holds no per-block state; callers pass the
//! current tree in and store whatever tree comes back.

use crate::command::executor::ChangeExecutor;
use crate::command::resolver::TargetResolver;
use crate::core::config::AssistConfig;
use crate::core::error::Result;
use crate::core::types::{BlockState, ClassificationResult, Intent, PropertyChange, PropertyTree};
use crate::decision::engine::{Decision, DecisionEngine, PageDecision};
use crate::intent::classifier::RuleClassifier;
use crate::intent::rules::RULES;
use crate::llm::client::TextGenerator;
use crate::merge::engine;
use crate::orchestrator::{Dispatched, OperationInput, Orchestrator};
use crate::schema::registry::{BlockRegistry, SchemaProvider};
use std::sync::Arc;

pub struct Assistant {
    schemas: Arc<dyn SchemaProvider>,
    rules: Arc<RuleClassifier>,
    resolver: TargetResolver,
    decisions: DecisionEngine,
    orchestrator: Orchestrator,
}

impl Assistant {
    pub fn new(
        schemas: Arc<dyn SchemaProvider>,
        generator: Option<Arc<dyn TextGenerator>>,
        config: &AssistConfig,
    ) -> Self {
        let rules = Arc::new(RuleClassifier::new(RULES, config));
        let orchestrator = Orchestrator::with_builtin_handlers(
            generator,
            schemas.clone(),
            rules.clone(),
            config,
        );
        Self {
            decisions: DecisionEngine::heuristic().with_schemas(schemas.clone()),
            schemas,
            rules,
            resolver: TargetResolver::new(),
            orchestrator,
        }
    }

    /// Built-in block types, no generator, default config
    pub fn builtin() -> Self {
        Self::new(Arc::new(BlockRegistry::builtin()), None, &AssistConfig::default())
    }

    /// Replace the decision engine (e.g. with a generator-backed classifier)
    pub fn with_decision_engine(mut self, engine: DecisionEngine) -> Self {
        self.decisions = engine;
        self
    }

    pub fn schemas(&self) -> &Arc<dyn SchemaProvider> {
        &self.schemas
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Candidate intents for `command`, limited to paths the block can hold
    pub fn classify_command(
        &self,
        command: &str,
        block_type: &str,
        tree: &PropertyTree,
    ) -> Vec<Intent> {
        let defaults = self.schemas.defaults(block_type);
        self.rules.classify_for_tree(command, tree, defaults.as_ref())
    }

    pub fn resolve_target(&self, command: &str, block_type: &str) -> Option<String> {
        self.resolver.resolve(command, block_type)
    }

    /// Changes `intent` would make to `tree`; the tree itself is not touched
    pub fn apply_intent(&self, tree: &PropertyTree, intent: &Intent) -> Result<Vec<PropertyChange>> {
        ChangeExecutor::plan(tree, intent, None)
    }

    /// Like [`apply_intent`](Self::apply_intent), resetting to the block's
    /// defaults instead of the scale midpoint
    pub fn apply_intent_for_block(
        &self,
        tree: &PropertyTree,
        intent: &Intent,
        block_type: &str,
    ) -> Result<Vec<PropertyChange>> {
        let defaults = self.schemas.defaults(block_type);
        ChangeExecutor::plan(tree, intent, defaults.as_ref())
    }

    pub fn apply_changes(
        &self,
        tree: &PropertyTree,
        changes: &[PropertyChange],
    ) -> Result<PropertyTree> {
        ChangeExecutor::apply(tree, changes)
    }

    pub async fn classify_and_route(
        &self,
        command: &str,
        context: Option<&str>,
    ) -> ClassificationResult {
        self.orchestrator.classify(command, context).await
    }

    pub fn merge_generated_content(
        &self,
        raw: &str,
        tree: &PropertyTree,
        target: Option<&str>,
    ) -> Result<PropertyTree> {
        engine::merge_generated_content(raw, tree, target)
    }

    /// Decide how generated content should land on one block
    pub async fn decide(&self, block_type: &str, current: Option<&PropertyTree>) -> Decision {
        let defaults = self
            .schemas
            .defaults(block_type)
            .unwrap_or_else(|| PropertyTree::Object(Default::default()));
        let summary = self.schemas.summary(block_type);
        self.decisions
            .decide(block_type, current, &defaults, summary.as_deref())
            .await
    }

    pub async fn decide_page(&self, blocks: &[BlockState]) -> PageDecision {
        self.decisions.decide_page(blocks).await
    }

    /// Full pipeline: classify, run the chosen handler, record the session
    pub async fn handle(&self, input: &OperationInput) -> Result<Dispatched> {
        self.orchestrator.dispatch(input).await
    }
}

impl Default for Assistant {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{IntentAction, IntentCategory};
    use crate::decision::engine::DecisionAction;
    use serde_json::json;

    fn hero(assistant: &Assistant) -> PropertyTree {
        assistant.schemas().defaults("hero").unwrap()
    }

    #[test]
    fn test_full_width_command() {
        let assistant = Assistant::builtin();
        let intents = assistant.classify_command("make this full width", "hero", &hero(&assistant));
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].category, IntentCategory::Layout);
        assert_eq!(intents[0].action, IntentAction::Set);
        assert_eq!(intents[0].path, "layout.blockSettings.blockWidth");
        assert_eq!(intents[0].value, Some(json!(true)));
        assert!((intents[0].confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_apply_then_commit() {
        let assistant = Assistant::builtin();
        let tree = hero(&assistant);
        let intent = assistant
            .classify_command("make this full width", "hero", &tree)
            .remove(0);
        let changes = assistant.apply_intent(&tree, &intent).unwrap();
        let updated = assistant.apply_changes(&tree, &changes).unwrap();
        assert_eq!(updated["layout"]["blockSettings"]["blockWidth"], json!(true));
        assert_eq!(tree["layout"]["blockSettings"]["blockWidth"], json!(false));
    }

    #[tokio::test]
    async fn test_decide_absent_block() {
        let assistant = Assistant::builtin();
        let decision = assistant.decide("hero", None).await;
        assert_eq!(decision.action, DecisionAction::Create);
    }

    #[tokio::test]
    async fn test_decide_unknown_block_type() {
        let assistant = Assistant::builtin();
        let decision = assistant.decide("pricing", Some(&json!({"a": 1}))).await;
        assert_eq!(decision.action, DecisionAction::Clarify);
    }
}
