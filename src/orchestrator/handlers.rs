//! Built-in operation handlers
//!
//! Every handler has the same shape: [`OperationInput`] in,
//! [`OperationOutput`] out. Handlers never mutate the input tree; a new tree
//! is returned when something changed.

use crate::command::executor::ChangeExecutor;
use crate::command::resolver::TargetResolver;
use crate::core::config::AssistConfig;
use crate::core::error::{AssistError, CollaboratorFailure, Result};
use crate::core::types::{
    Intent, IntentAction, IntentCategory, PropertyChange, PropertyTree, SessionId,
};
use crate::intent::classifier::RuleClassifier;
use crate::llm::client::{with_timeout, CompletionRequest, TextGenerator};
use crate::llm::context::BlockContext;
use crate::merge::engine::{apply_full_replace, apply_page_updates, merge_generated_content, PageMergeReport};
use crate::merge::extract::extract_structured;
use crate::schema::registry::SchemaProvider;
use crate::tree::path;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OperationInput {
    pub command: String,
    pub block_type: String,
    pub tree: PropertyTree,
    /// Free-form caller context; for page updates, a JSON array of block trees
    pub context: Option<String>,
    pub session_id: SessionId,
}

impl OperationInput {
    pub fn new(command: impl Into<String>, block_type: impl Into<String>, tree: PropertyTree) -> Self {
        Self {
            command: command.into(),
            block_type: block_type.into(),
            tree,
            context: None,
            session_id: SessionId::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_session(mut self, session_id: SessionId) -> Self {
        self.session_id = session_id;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OperationOutput {
    /// New tree, `None` when nothing changed
    pub tree: Option<PropertyTree>,
    pub changes: Vec<PropertyChange>,
    /// Message for the person typing commands
    pub message: String,
    /// Result of a page-level merge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageMergeReport>,
}

impl OperationOutput {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }
}

#[async_trait]
pub trait OperationHandler: Send + Sync {
    async fn handle(&self, input: &OperationInput) -> Result<OperationOutput>;
}

/// Generation settings shared by the generative handlers
#[derive(Clone)]
pub struct Generation {
    generator: Option<Arc<dyn TextGenerator>>,
    timeout: Duration,
    max_tokens: u32,
    temperature: f32,
}

impl Generation {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, config: &AssistConfig) -> Self {
        Self {
            generator,
            timeout: config.collaborator_timeout(),
            max_tokens: config.generation_max_tokens,
            temperature: config.generation_temperature,
        }
    }

    pub fn is_available(&self) -> bool {
        self.generator.is_some()
    }

    async fn complete(&self, system: &str, prompt: String) -> Result<String> {
        let generator = self.generator.as_deref().ok_or_else(|| {
            AssistError::Collaborator(CollaboratorFailure::Other(
                "no text generator configured".into(),
            ))
        })?;
        let request = CompletionRequest::new(system, prompt)
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);
        Ok(with_timeout(generator, &request, self.timeout).await?)
    }
}

fn describe(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "unset".into(),
        Some(Value::String(s)) => format!("\"{}\"", s),
        Some(other) => other.to_string(),
    }
}

// ============================================================================
// Property change
// ============================================================================

/// Rule classify -> resolve target -> apply intent
pub struct PropertyChangeHandler {
    rules: Arc<RuleClassifier>,
    resolver: &'static TargetResolver,
    schemas: Arc<dyn SchemaProvider>,
}

impl PropertyChangeHandler {
    pub fn new(rules: Arc<RuleClassifier>, schemas: Arc<dyn SchemaProvider>) -> Self {
        Self {
            rules,
            resolver: TargetResolver::shared(),
            schemas,
        }
    }

    /// Candidate under the resolved target if there is one, else the top one.
    ///
    /// A command naming an element only ever changes that element.
    fn choose<'a>(&self, intents: &'a [Intent], target: Option<&str>) -> Option<&'a Intent> {
        let Some(target) = target else {
            return intents.first();
        };
        let prefix = format!("{}.", target);
        let under_target = intents
            .iter()
            .find(|i| i.path == target || i.path.starts_with(&prefix));
        match under_target {
            Some(intent) => Some(intent),
            None if target.starts_with("elements.") => None,
            None => intents.first(),
        }
    }
}

#[async_trait]
impl OperationHandler for PropertyChangeHandler {
    async fn handle(&self, input: &OperationInput) -> Result<OperationOutput> {
        let defaults = self.schemas.defaults(&input.block_type);
        let intents = self
            .rules
            .classify_for_tree(&input.command, &input.tree, defaults.as_ref());
        let target = self.resolver.resolve(&input.command, &input.block_type);

        let Some(intent) = self.choose(&intents, target.as_deref()) else {
            return Ok(OperationOutput::message(
                "I couldn't match that to a setting. Try something like \"more padding\" or \"full width\".",
            ));
        };

        let result = ChangeExecutor::execute(&input.tree, intent, defaults.as_ref())?;
        let message = match result.changes.as_slice() {
            [single] => format!(
                "Set {} to {} (was {}).",
                single.path,
                describe(Some(&single.new_value)),
                describe(single.old_value.as_ref())
            ),
            many => format!("Updated {} settings under {}.", many.len(), intent.path),
        };

        Ok(OperationOutput {
            tree: Some(result.tree),
            changes: result.changes,
            message,
            page: None,
        })
    }
}

// ============================================================================
// Content update
// ============================================================================

const CONTENT_SYSTEM_PROMPT: &str = r#"You edit the content of one block on a web page.
Apply the user's command to the block described below.

If a target path is given, return ONLY the new value for that path as JSON
(a quoted string for text, or an object if the target is a group of fields).
If the target is the whole block, return the complete updated block as one
JSON object with the same structure as the current properties.
Return JSON only, no explanation."#;

pub struct ContentUpdateHandler {
    generation: Generation,
    resolver: &'static TargetResolver,
    schemas: Arc<dyn SchemaProvider>,
}

impl ContentUpdateHandler {
    pub fn new(generation: Generation, schemas: Arc<dyn SchemaProvider>) -> Self {
        Self {
            generation,
            resolver: TargetResolver::shared(),
            schemas,
        }
    }
}

#[async_trait]
impl OperationHandler for ContentUpdateHandler {
    async fn handle(&self, input: &OperationInput) -> Result<OperationOutput> {
        let target = self.resolver.resolve(&input.command, &input.block_type);
        let context = BlockContext::new(&input.block_type, input.tree.clone())
            .with_summary(self.schemas.summary(&input.block_type))
            .with_target(target.clone());

        let mut prompt = context.summary();
        if let Some(extra) = &input.context {
            prompt.push_str(&format!("\nNotes:\n{}\n", extra));
        }
        prompt.push_str(&format!("\nCOMMAND:\n{}\n", input.command));

        let response = self.generation.complete(CONTENT_SYSTEM_PROMPT, prompt).await?;
        let tree = merge_generated_content(&response, &input.tree, target.as_deref())?;

        let (changes, message) = match &target {
            Some(target) => {
                let new_value = path::get(&tree, target).cloned().unwrap_or(Value::Null);
                let change = PropertyChange {
                    path: target.clone(),
                    old_value: path::get(&input.tree, target).cloned(),
                    new_value: new_value.clone(),
                    intent: Intent {
                        category: IntentCategory::Content,
                        action: IntentAction::Set,
                        path: target.clone(),
                        value: Some(new_value),
                        modifier: None,
                        confidence: 1.0,
                    },
                };
                (vec![change], format!("Updated {}.", target))
            }
            None => (Vec::new(), format!("Rewrote the {} block.", input.block_type)),
        };

        Ok(OperationOutput {
            tree: Some(tree),
            changes,
            message,
            page: None,
        })
    }
}

// ============================================================================
// Block create
// ============================================================================

const CREATE_SYSTEM_PROMPT: &str = r#"You write the content for a new block on a web page.
Start from the default properties below and fill them with content that fits
the user's request. Keep exactly the same structure and keys.
Return the complete block as one JSON object, no explanation."#;

pub struct BlockCreateHandler {
    generation: Generation,
    schemas: Arc<dyn SchemaProvider>,
}

impl BlockCreateHandler {
    pub fn new(generation: Generation, schemas: Arc<dyn SchemaProvider>) -> Self {
        Self {
            generation,
            schemas,
        }
    }
}

#[async_trait]
impl OperationHandler for BlockCreateHandler {
    async fn handle(&self, input: &OperationInput) -> Result<OperationOutput> {
        let defaults = self
            .schemas
            .defaults(&input.block_type)
            .ok_or_else(|| AssistError::UnknownBlockType(input.block_type.clone()))?;

        if !self.generation.is_available() {
            return Ok(OperationOutput {
                tree: Some(defaults),
                message: format!("Created a {} block with default content.", input.block_type),
                ..Default::default()
            });
        }

        let context = BlockContext::new(&input.block_type, defaults.clone())
            .with_summary(self.schemas.summary(&input.block_type));
        let prompt = format!("{}\nREQUEST:\n{}\n", context.summary(), input.command);

        let response = self.generation.complete(CREATE_SYSTEM_PROMPT, prompt).await?;
        let tree = apply_full_replace(&defaults, extract_structured(&response)?)?;

        Ok(OperationOutput {
            tree: Some(tree),
            message: format!("Created a new {} block.", input.block_type),
            ..Default::default()
        })
    }
}

// ============================================================================
// Page update
// ============================================================================

const PAGE_SYSTEM_PROMPT: &str = r#"You apply one editing command across several blocks of a web page.
Blocks are listed with their index. Only include blocks that change, and only
the properties that change.

OUTPUT FORMAT (JSON only, no explanation):
{"updates": [{"index": 0, "properties": { ... }}]}"#;

pub struct PageUpdateHandler {
    generation: Generation,
}

impl PageUpdateHandler {
    pub fn new(generation: Generation) -> Self {
        Self { generation }
    }
}

#[async_trait]
impl OperationHandler for PageUpdateHandler {
    async fn handle(&self, input: &OperationInput) -> Result<OperationOutput> {
        // Without a page in the context, the current block is a page of one
        let page: Option<Vec<PropertyTree>> = input
            .context
            .as_deref()
            .and_then(|c| serde_json::from_str(c).ok());
        let single_block = page.is_none();
        let blocks = page.unwrap_or_else(|| vec![input.tree.clone()]);

        let mut prompt = String::from("BLOCKS:\n");
        for (index, block) in blocks.iter().enumerate() {
            prompt.push_str(&format!("[{}] {}\n", index, block));
        }
        prompt.push_str(&format!("\nCOMMAND:\n{}\n", input.command));

        let response = self.generation.complete(PAGE_SYSTEM_PROMPT, prompt).await?;
        let report = apply_page_updates(&blocks, &response)?;

        let mut message = format!("Updated {} block(s).", report.applied.len());
        if !report.skipped.is_empty() {
            message.push_str(&format!(" Skipped {} invalid update(s).", report.skipped.len()));
        }

        let tree = if single_block && !report.applied.is_empty() {
            report.blocks.first().cloned()
        } else {
            None
        };

        Ok(OperationOutput {
            tree,
            changes: Vec::new(),
            message,
            page: Some(report),
        })
    }
}

// ============================================================================
// General chat
// ============================================================================

const CHAT_SYSTEM_PROMPT: &str = r#"You are a friendly assistant inside a page builder.
Answer briefly. You can change block settings (spacing, width, background,
alignment, visibility), rewrite text, create new blocks and apply changes
across the page."#;

const CHAT_UNAVAILABLE: &str = "Sorry, I can't chat right now. I can still adjust settings like \"more padding\" or \"full width\".";

pub struct GeneralChatHandler {
    generation: Generation,
}

impl GeneralChatHandler {
    pub fn new(generation: Generation) -> Self {
        Self { generation }
    }
}

#[async_trait]
impl OperationHandler for GeneralChatHandler {
    async fn handle(&self, input: &OperationInput) -> Result<OperationOutput> {
        let mut prompt = format!("Block type: {}\n", input.block_type);
        if let Some(context) = &input.context {
            prompt.push_str(&format!("{}\n", context));
        }
        prompt.push_str(&format!("\nUSER:\n{}\n", input.command));

        match self.generation.complete(CHAT_SYSTEM_PROMPT, prompt).await {
            Ok(reply) => Ok(OperationOutput::message(reply.trim())),
            Err(e) => {
                tracing::warn!("General chat unavailable: {}", e);
                Ok(OperationOutput::message(CHAT_UNAVAILABLE))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::rules::RULES;
    use crate::schema::registry::BlockRegistry;
    use serde_json::json;

    struct Canned(&'static str);

    #[async_trait]
    impl TextGenerator for Canned {
        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> std::result::Result<String, CollaboratorFailure> {
            Ok(self.0.to_string())
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    struct Down;

    #[async_trait]
    impl TextGenerator for Down {
        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> std::result::Result<String, CollaboratorFailure> {
            Err(CollaboratorFailure::QuotaExceeded)
        }

        fn model_name(&self) -> &str {
            "down"
        }
    }

    fn schemas() -> Arc<dyn SchemaProvider> {
        Arc::new(BlockRegistry::builtin())
    }

    fn generation(generator: impl TextGenerator + 'static) -> Generation {
        Generation::new(Some(Arc::new(generator)), &AssistConfig::default())
    }

    fn hero() -> PropertyTree {
        BlockRegistry::builtin().defaults("hero").unwrap()
    }

    #[tokio::test]
    async fn test_property_change_applies_rule() {
        let handler = PropertyChangeHandler::new(
            Arc::new(RuleClassifier::new(RULES, &AssistConfig::default())),
            schemas(),
        );
        let mut tree = hero();
        tree["layout"]["spacing"]["padding"] = json!("sm");

        let output = handler
            .handle(&OperationInput::new("add a bit more padding", "hero", tree.clone()))
            .await
            .unwrap();
        let new_tree = output.tree.unwrap();
        assert_eq!(new_tree["layout"]["spacing"]["padding"], json!("md"));
        assert_eq!(output.changes.len(), 1);
        assert!(output.message.contains("layout.spacing.padding"));
        assert_eq!(tree["layout"]["spacing"]["padding"], json!("sm"));
    }

    #[tokio::test]
    async fn test_property_change_without_match() {
        let handler = PropertyChangeHandler::new(
            Arc::new(RuleClassifier::new(RULES, &AssistConfig::default())),
            schemas(),
        );
        let output = handler
            .handle(&OperationInput::new("make it sparkle", "hero", hero()))
            .await
            .unwrap();
        assert!(output.tree.is_none());
        assert!(output.changes.is_empty());
    }

    #[tokio::test]
    async fn test_element_target_never_changes_other_settings() {
        let handler = PropertyChangeHandler::new(
            Arc::new(RuleClassifier::new(RULES, &AssistConfig::default())),
            schemas(),
        );
        let tree = hero();
        let output = handler
            .handle(&OperationInput::new("make the subtitle text tighter", "hero", tree.clone()))
            .await
            .unwrap();
        assert!(output.tree.is_none());
        assert!(output.changes.is_empty());
        assert!(output.message.starts_with("I couldn't match"));
    }

    #[tokio::test]
    async fn test_content_update_targets_button_text() {
        let handler = ContentUpdateHandler::new(
            generation(Canned("```json\n{\"text\":\"Go\"}\n```")),
            schemas(),
        );
        let output = handler
            .handle(&OperationInput::new("change the button text to Go", "hero", hero()))
            .await
            .unwrap();
        let tree = output.tree.unwrap();
        assert_eq!(tree["elements"]["button"]["text"], json!("Go"));
        assert_eq!(tree["elements"]["button"]["variant"], json!("primary"));
        assert_eq!(output.changes[0].path, "elements.button.text");
    }

    #[tokio::test]
    async fn test_content_update_surfaces_collaborator_failure() {
        let handler = ContentUpdateHandler::new(generation(Down), schemas());
        let result = handler
            .handle(&OperationInput::new("rewrite the headline", "hero", hero()))
            .await;
        assert!(matches!(
            result,
            Err(AssistError::Collaborator(CollaboratorFailure::QuotaExceeded))
        ));
    }

    #[tokio::test]
    async fn test_block_create_without_generator_uses_defaults() {
        let handler = BlockCreateHandler::new(
            Generation::new(None, &AssistConfig::default()),
            schemas(),
        );
        let output = handler
            .handle(&OperationInput::new("add a new cta", "cta", json!({})))
            .await
            .unwrap();
        assert_eq!(output.tree.unwrap()["elements"]["button"]["text"], json!("Sign up"));
    }

    #[tokio::test]
    async fn test_block_create_unknown_type() {
        let handler = BlockCreateHandler::new(generation(Canned("{}")), schemas());
        let result = handler
            .handle(&OperationInput::new("add a pricing table", "pricing", json!({})))
            .await;
        assert!(matches!(result, Err(AssistError::UnknownBlockType(_))));
    }

    #[tokio::test]
    async fn test_page_update_over_context_blocks() {
        let handler = PageUpdateHandler::new(generation(Canned(
            r#"{"updates": [{"index": 1, "properties": {"layout": {"spacing": {"padding": "lg"}}}}, {"index": 9, "properties": {}}]}"#,
        )));
        let page = json!([{"layout": {"spacing": {"padding": "md"}}}, {"layout": {"spacing": {"padding": "sm"}}}]);
        let input = OperationInput::new("more padding on every section", "hero", json!({}))
            .with_context(page.to_string());

        let output = handler.handle(&input).await.unwrap();
        assert!(output.tree.is_none());
        let report = output.page.unwrap();
        assert_eq!(report.applied, vec![1]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.blocks[1]["layout"]["spacing"]["padding"], json!("lg"));
        assert!(output.message.contains("Skipped 1"));
    }

    #[tokio::test]
    async fn test_chat_failure_is_a_message() {
        let handler = GeneralChatHandler::new(generation(Down));
        let output = handler
            .handle(&OperationInput::new("what can you do?", "hero", hero()))
            .await
            .unwrap();
        assert_eq!(output.message, CHAT_UNAVAILABLE);
        assert!(output.tree.is_none());
    }
}
