//! Hybrid operation classification
//!
//! Rule pass first; the text-generation collaborator is only consulted when
//! the rules are unsure. Any collaborator or parsing failure degrades to a
//! fixed low-confidence route to the conversational handler, so
//! [`HybridClassifier::classify`] always returns a result.

use crate::core::config::AssistConfig;
use crate::core::error::{AssistError, CollaboratorFailure, Result};
use crate::core::types::{ClassificationMethod, ClassificationResult};
use crate::intent::classifier::RuleClassifier;
use crate::intent::rules::RULES;
use crate::llm::client::{with_timeout, CompletionRequest, TextGenerator};
use crate::llm::parser::{parse_routing_answer, routing_prompt, ROUTING_SYSTEM_PROMPT};
use crate::routing::keyword::{operation_names, KeywordRouter, GENERAL_CHAT, OPERATIONS};
use std::sync::Arc;
use std::time::Duration;

pub struct HybridClassifier {
    router: KeywordRouter,
    generator: Option<Arc<dyn TextGenerator>>,
    threshold: f32,
    floor: f32,
    ceiling: f32,
    fallback_confidence: f32,
    timeout: Duration,
    max_tokens: u32,
    temperature: f32,
}

impl HybridClassifier {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, config: &AssistConfig) -> Self {
        Self::with_rules(
            Arc::new(RuleClassifier::new(RULES, config)),
            generator,
            config,
        )
    }

    /// Share an already compiled rule classifier
    pub fn with_rules(
        rules: Arc<RuleClassifier>,
        generator: Option<Arc<dyn TextGenerator>>,
        config: &AssistConfig,
    ) -> Self {
        Self {
            router: KeywordRouter::new(rules),
            generator,
            threshold: config.routing_threshold,
            floor: config.ai_confidence_floor,
            ceiling: config.ai_confidence_ceiling,
            fallback_confidence: config.fallback_confidence,
            timeout: config.collaborator_timeout(),
            max_tokens: config.classification_max_tokens,
            temperature: config.classification_temperature,
        }
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Route `command` to an operation. Never fails.
    pub async fn classify(&self, command: &str, context: Option<&str>) -> ClassificationResult {
        let guess = self.router.route(command);
        if guess.confidence >= self.threshold {
            tracing::debug!(
                "Rule route {} ({:.2}) for {:?}",
                guess.agent_name,
                guess.confidence,
                command
            );
            return ClassificationResult {
                agent_name: guess.agent_name.to_string(),
                confidence: guess.confidence,
                reasoning: guess.reasoning,
                method: ClassificationMethod::Rule,
            };
        }

        match self.ask(command, context).await {
            Ok(result) => {
                tracing::debug!(
                    "AI route {} ({:.2}) for {:?}",
                    result.agent_name,
                    result.confidence,
                    command
                );
                result
            }
            Err(e) => {
                tracing::warn!("Routing fell back for {:?}: {}", command, e);
                self.fallback(&e)
            }
        }
    }

    async fn ask(&self, command: &str, context: Option<&str>) -> Result<ClassificationResult> {
        let generator = self.generator.as_deref().ok_or_else(|| {
            AssistError::Collaborator(CollaboratorFailure::Other(
                "no text generator configured".into(),
            ))
        })?;

        let request = CompletionRequest::new(
            ROUTING_SYSTEM_PROMPT,
            routing_prompt(OPERATIONS, command, context),
        )
        .with_max_tokens(self.max_tokens)
        .with_temperature(self.temperature);

        let response = with_timeout(generator, &request, self.timeout).await?;
        let answer = parse_routing_answer(&response, &operation_names())?;

        Ok(ClassificationResult {
            agent_name: answer.agent_name,
            // Total even when a hand-built config holds NaN
            confidence: answer.confidence.max(self.floor).min(self.ceiling),
            reasoning: answer.reasoning,
            method: ClassificationMethod::Ai,
        })
    }

    fn fallback(&self, error: &AssistError) -> ClassificationResult {
        ClassificationResult {
            agent_name: GENERAL_CHAT.to_string(),
            confidence: self.fallback_confidence,
            reasoning: format!("Classification unavailable ({}); using conversational fallback", error),
            method: ClassificationMethod::Fallback,
        }
    }
}
