//! Parse routing answers from the text-generation collaborator
//!
//! The collaborator is asked which operation should handle a command and
//! must answer with a strict `{agentName, confidence, reasoning}` record.
//! Anything else, including an operation name we don't know, is treated as
//! an unparsable response.

use crate::core::error::{AssistError, Result};
use crate::merge::extract::extract_structured;
use serde::{Deserialize, Serialize};

/// Routing answer as returned by the collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoutingAnswer {
    pub agent_name: String,
    pub confidence: f32,
    #[serde(default)]
    pub reasoning: String,
}

/// Parse `response` into a routing answer naming one of `known` operations
pub fn parse_routing_answer(response: &str, known: &[&str]) -> Result<RoutingAnswer> {
    let value = extract_structured(response)?;

    let answer: RoutingAnswer = serde_json::from_value(value).map_err(|e| {
        AssistError::UnparsableResponse(format!(
            "Failed to parse routing answer: {} - Response: {}",
            e, response
        ))
    })?;

    if !known.contains(&answer.agent_name.as_str()) {
        return Err(AssistError::UnparsableResponse(format!(
            "unknown operation '{}'",
            answer.agent_name
        )));
    }
    if !answer.confidence.is_finite() {
        return Err(AssistError::UnparsableResponse(
            "confidence is not a number".into(),
        ));
    }

    Ok(answer)
}

/// Build the routing prompt from operation descriptions, the command and
/// any caller-supplied context
pub fn routing_prompt(operations: &[(&str, &str)], command: &str, context: Option<&str>) -> String {
    let mut s = String::from("OPERATIONS:\n");
    for (name, description) in operations {
        s.push_str(&format!("- {}: {}\n", name, description));
    }
    if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
        s.push_str(&format!("\nCONTEXT:\n{}\n", context));
    }
    s.push_str(&format!(
        "\nCOMMAND:\n{}\n\nChoose the operation. Answer with JSON only:",
        command
    ));
    s
}

/// System prompt for operation routing
pub const ROUTING_SYSTEM_PROMPT: &str = r#"You route editing commands for a page builder.
Each command edits one content block (hero, features, call to action, ...).
Pick the single operation that should handle the command.

OUTPUT FORMAT (JSON only, no explanation):
{
  "agentName": "one of the listed operation names",
  "confidence": 0.0-1.0,
  "reasoning": "one short sentence"
}

Examples:
"make the background darker" -> {"agentName": "property_change", "confidence": 0.9, "reasoning": "Visual setting on the block"}
"rewrite the headline to sound friendlier" -> {"agentName": "content_update", "confidence": 0.85, "reasoning": "Changes copy"}
"add a pricing section below" -> {"agentName": "block_create", "confidence": 0.8, "reasoning": "Asks for a new block"}
"what can you do?" -> {"agentName": "general_chat", "confidence": 0.9, "reasoning": "Question, not an edit"}
"#;
