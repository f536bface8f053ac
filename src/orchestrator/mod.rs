//! Operation orchestration - classify, dispatch to a handler, record
//!
//! Handlers live in a name-keyed registry. Routing picks the name; unknown
//! names are an error rather than a silent fallback.

pub mod handlers;
pub mod session;

pub use handlers::{
    BlockCreateHandler, ContentUpdateHandler, GeneralChatHandler, Generation, OperationHandler,
    OperationInput, OperationOutput, PageUpdateHandler, PropertyChangeHandler,
};
pub use session::{InMemorySessionStore, Session, SessionEntry, SessionStore};

use crate::core::config::AssistConfig;
use crate::core::error::{AssistError, Result};
use crate::core::types::ClassificationResult;
use crate::intent::classifier::RuleClassifier;
use crate::llm::client::TextGenerator;
use crate::routing::hybrid::HybridClassifier;
use crate::routing::keyword::{
    self, BLOCK_CREATE, CONTENT_UPDATE, GENERAL_CHAT, PAGE_UPDATE, PROPERTY_CHANGE,
};
use crate::schema::registry::SchemaProvider;
use ahash::AHashMap;
use serde::Serialize;
use std::sync::Arc;

/// Routing decision plus the chosen handler's output
#[derive(Debug, Clone, Serialize)]
pub struct Dispatched {
    pub classification: ClassificationResult,
    pub output: OperationOutput,
}

pub struct Orchestrator {
    handlers: AHashMap<String, Arc<dyn OperationHandler>>,
    classifier: HybridClassifier,
    sessions: Arc<dyn SessionStore>,
}

impl Orchestrator {
    /// Empty registry; register handlers before dispatching
    pub fn new(classifier: HybridClassifier, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            handlers: AHashMap::new(),
            classifier,
            sessions,
        }
    }

    /// Orchestrator with the five built-in operations registered
    pub fn with_builtin_handlers(
        generator: Option<Arc<dyn TextGenerator>>,
        schemas: Arc<dyn SchemaProvider>,
        rules: Arc<RuleClassifier>,
        config: &AssistConfig,
    ) -> Self {
        let classifier = HybridClassifier::with_rules(rules.clone(), generator.clone(), config);
        let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::from_config(config));
        let generation = Generation::new(generator, config);

        let mut orchestrator = Self::new(classifier, sessions);
        orchestrator.register(
            PROPERTY_CHANGE,
            Arc::new(PropertyChangeHandler::new(rules, schemas.clone())),
        );
        orchestrator.register(
            CONTENT_UPDATE,
            Arc::new(ContentUpdateHandler::new(generation.clone(), schemas.clone())),
        );
        orchestrator.register(
            BLOCK_CREATE,
            Arc::new(BlockCreateHandler::new(generation.clone(), schemas)),
        );
        orchestrator.register(PAGE_UPDATE, Arc::new(PageUpdateHandler::new(generation.clone())));
        orchestrator.register(GENERAL_CHAT, Arc::new(GeneralChatHandler::new(generation)));
        orchestrator
    }

    /// Register (or replace) the handler for `name`
    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn OperationHandler>) {
        let name = name.into();
        if self.handlers.insert(name.clone(), handler).is_some() {
            tracing::debug!("Replaced handler for {}", name);
        }
    }

    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn handler_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Run the handler registered under `name`
    pub async fn run(&self, name: &str, input: &OperationInput) -> Result<OperationOutput> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| AssistError::UnknownOperation(name.to_string()))?;
        handler.handle(input).await
    }

    /// Keyword-only routing; never consults the collaborator
    pub fn classify_operation(&self, command: &str) -> &'static str {
        keyword::classify_operation(command)
    }

    pub async fn classify(&self, command: &str, context: Option<&str>) -> ClassificationResult {
        self.classifier.classify(command, context).await
    }

    /// Classify `input.command`, run the chosen handler, record the session
    pub async fn dispatch(&self, input: &OperationInput) -> Result<Dispatched> {
        self.sessions.evict_expired();

        let session = self.sessions.get_or_create(input.session_id);
        let mut context = format!("Block type: {}", input.block_type);
        let recent = session.recent_commands(5);
        if !recent.is_empty() {
            context.push_str("\nRecent commands:\n");
            for command in &recent {
                context.push_str(&format!("- {}\n", command));
            }
        }

        let classification = self.classify(&input.command, Some(&context)).await;
        tracing::info!(
            "Dispatching {:?} to {} ({:?}, {:.2})",
            input.command,
            classification.agent_name,
            classification.method,
            classification.confidence
        );

        let output = self.run(&classification.agent_name, input).await?;
        self.sessions.record(
            input.session_id,
            SessionEntry {
                command: input.command.clone(),
                operation: classification.agent_name.clone(),
                message: output.message.clone(),
                change_count: output.changes.len(),
            },
        );

        Ok(Dispatched {
            classification,
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ClassificationMethod;
    use crate::intent::rules::RULES;
    use crate::schema::registry::BlockRegistry;
    use async_trait::async_trait;
    use serde_json::json;

    fn orchestrator() -> Orchestrator {
        let config = AssistConfig::default();
        Orchestrator::with_builtin_handlers(
            None,
            Arc::new(BlockRegistry::builtin()),
            Arc::new(RuleClassifier::new(RULES, &config)),
            &config,
        )
    }

    struct Echo;

    #[async_trait]
    impl OperationHandler for Echo {
        async fn handle(&self, input: &OperationInput) -> Result<OperationOutput> {
            Ok(OperationOutput::message(input.command.clone()))
        }
    }

    #[test]
    fn test_builtin_registry() {
        assert_eq!(
            orchestrator().handler_names(),
            vec![BLOCK_CREATE, CONTENT_UPDATE, GENERAL_CHAT, PAGE_UPDATE, PROPERTY_CHANGE]
        );
    }

    #[tokio::test]
    async fn test_unknown_operation() {
        let result = orchestrator()
            .run("delete_everything", &OperationInput::new("x", "hero", json!({})))
            .await;
        assert!(matches!(result, Err(AssistError::UnknownOperation(name)) if name == "delete_everything"));
    }

    #[tokio::test]
    async fn test_register_replaces_handler() {
        let mut orchestrator = orchestrator();
        orchestrator.register(GENERAL_CHAT, Arc::new(Echo));
        let output = orchestrator
            .run(GENERAL_CHAT, &OperationInput::new("hello there", "hero", json!({})))
            .await
            .unwrap();
        assert_eq!(output.message, "hello there");
    }

    #[tokio::test]
    async fn test_dispatch_records_session() {
        let orchestrator = orchestrator();
        let tree = BlockRegistry::builtin().defaults("hero").unwrap();
        let input = OperationInput::new("make this full width", "hero", tree);

        let dispatched = orchestrator.dispatch(&input).await.unwrap();
        assert_eq!(dispatched.classification.agent_name, PROPERTY_CHANGE);
        assert_eq!(dispatched.classification.method, ClassificationMethod::Rule);
        assert_eq!(
            dispatched.output.tree.unwrap()["layout"]["blockSettings"]["blockWidth"],
            json!(true)
        );

        let history = orchestrator.sessions().history(input.session_id);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].operation, PROPERTY_CHANGE);
        assert_eq!(history[0].change_count, 1);
    }

    #[tokio::test]
    async fn test_dispatch_without_generator_falls_back_to_chat() {
        let orchestrator = orchestrator();
        let dispatched = orchestrator
            .dispatch(&OperationInput::new("tell me a joke", "hero", json!({})))
            .await
            .unwrap();
        assert_eq!(dispatched.classification.agent_name, GENERAL_CHAT);
        assert_eq!(dispatched.classification.method, ClassificationMethod::Fallback);
        assert!(dispatched.output.message.starts_with("Sorry"));
    }

    #[tokio::test]
    async fn test_dispatch_evicts_idle_sessions() {
        let config = AssistConfig::default();
        let store = Arc::new(InMemorySessionStore::new(std::time::Duration::ZERO, 10));
        let sessions: Arc<dyn SessionStore> = store.clone();
        let mut orchestrator = Orchestrator::new(HybridClassifier::new(None, &config), sessions);
        orchestrator.register(GENERAL_CHAT, Arc::new(Echo));

        orchestrator
            .dispatch(&OperationInput::new("hello", "hero", json!({})))
            .await
            .unwrap();
        assert_eq!(store.len(), 1);

        orchestrator
            .dispatch(&OperationInput::new("hello again", "hero", json!({})))
            .await
            .unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_keeps_live_sessions() {
        let config = AssistConfig::default();
        let store = Arc::new(InMemorySessionStore::from_config(&config));
        let sessions: Arc<dyn SessionStore> = store.clone();
        let mut orchestrator = Orchestrator::new(HybridClassifier::new(None, &config), sessions);
        orchestrator.register(GENERAL_CHAT, Arc::new(Echo));

        for command in ["hello", "hello again"] {
            orchestrator
                .dispatch(&OperationInput::new(command, "hero", json!({})))
                .await
                .unwrap();
        }
        assert_eq!(store.len(), 2);
    }
}
