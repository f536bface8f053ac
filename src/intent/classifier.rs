//! Rule-based intent classification
//!
//! Runs a command through the compiled rule table and returns every
//! candidate intent, deduplicated by `(path, action)` and sorted by
//! confidence. Over-generation is expected; callers threshold downstream.

use crate::core::config::{config, AssistConfig};
use crate::core::types::{Intent, IntentAction, Modifier};
use crate::intent::rules::{normalize_capture, RuleEntry, RuleValue, RULES};
use crate::tree::path;
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::OnceLock;

/// A rule with its patterns compiled
struct CompiledRule {
    regexes: Vec<Regex>,
    entry: &'static RuleEntry,
}

/// Pattern-table classifier; immutable and safe to share across threads
pub struct RuleClassifier {
    rules: Vec<CompiledRule>,
    significant: Option<Regex>,
    slight: Option<Regex>,
    base_confidence: f32,
    specific_bonus: f32,
    specific_length: usize,
}

static SHARED: OnceLock<RuleClassifier> = OnceLock::new();

fn compile(pattern: &str) -> Option<Regex> {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::warn!("Skipping invalid rule pattern {:?}: {}", pattern, e);
            None
        }
    }
}

impl RuleClassifier {
    /// Compile a rule table. Invalid patterns are logged and skipped.
    pub fn new(entries: &'static [RuleEntry], config: &AssistConfig) -> Self {
        let rules = entries
            .iter()
            .map(|entry| CompiledRule {
                regexes: entry.patterns.iter().filter_map(|p| compile(p)).collect(),
                entry,
            })
            .collect();

        Self {
            rules,
            significant: compile(
                r"\b(?:much|a\s+lot|lots|dramatically|significantly|substantially|considerably|way)\b",
            ),
            slight: compile(r"\b(?:a\s+little|a\s+bit|slightly|a\s+touch|a\s+tad|somewhat|tiny)\b"),
            base_confidence: config.rule_base_confidence,
            specific_bonus: config.specific_match_bonus,
            specific_length: config.specific_match_length,
        }
    }

    /// Classifier over the built-in table using the global config
    pub fn shared() -> &'static RuleClassifier {
        SHARED.get_or_init(|| RuleClassifier::new(RULES, config()))
    }

    /// Every candidate intent for `command`, most confident first.
    ///
    /// Returns an empty list when nothing matches.
    pub fn classify(&self, command: &str) -> Vec<Intent> {
        let mut candidates = Vec::new();

        for rule in &self.rules {
            for regex in &rule.regexes {
                if let Some(caps) = regex.captures(command) {
                    let span = caps.get(0).map_or(0, |m| m.as_str().chars().count());
                    let captured = caps.get(1).map(|m| normalize_capture(m.as_str()));
                    if let Some(intent) = self.draft(rule.entry, command, span, captured) {
                        candidates.push(intent);
                    }
                    break;
                }
            }
        }

        let mut seen = HashSet::new();
        candidates.retain(|intent: &Intent| seen.insert((intent.path.clone(), intent.action)));

        // Stable sort keeps table order among equal confidences
        candidates.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        tracing::debug!("Rule classifier: {} candidate(s) for {:?}", candidates.len(), command);
        candidates
    }

    /// Like [`classify`](Self::classify), but drops candidates whose path
    /// cannot be written in `tree` or, when known, in the block's defaults.
    pub fn classify_for_tree(
        &self,
        command: &str,
        tree: &Value,
        defaults: Option<&Value>,
    ) -> Vec<Intent> {
        self.classify(command)
            .into_iter()
            .filter(|intent| {
                is_writable(tree, &intent.path)
                    && defaults.map_or(true, |d| is_writable(d, &intent.path))
            })
            .collect()
    }

    /// Intensity of a relative adjustment, from words in the command
    pub fn detect_modifier(&self, command: &str) -> Modifier {
        let matches = |regex: &Option<Regex>| regex.as_ref().is_some_and(|r| r.is_match(command));
        if matches(&self.significant) {
            Modifier::Significant
        } else if matches(&self.slight) {
            Modifier::Slight
        } else {
            Modifier::Moderate
        }
    }

    fn draft(
        &self,
        entry: &RuleEntry,
        command: &str,
        span: usize,
        captured: Option<String>,
    ) -> Option<Intent> {
        let template = &entry.template;

        let path = if template.path_from_capture {
            path::join_path(template.path, captured.as_deref()?)
        } else {
            template.path.to_string()
        };

        let value = match template.value {
            RuleValue::None => None,
            RuleValue::Bool(b) => Some(Value::Bool(b)),
            RuleValue::Text(text) => Some(Value::String(text.to_string())),
            RuleValue::Captured => Some(Value::String(captured?)),
        };

        let modifier = match template.action {
            IntentAction::Increase | IntentAction::Decrease => Some(self.detect_modifier(command)),
            _ => None,
        };

        let mut confidence = self.base_confidence;
        if span > self.specific_length {
            confidence += self.specific_bonus;
        }

        Some(Intent {
            category: template.category,
            action: template.action,
            path,
            value,
            modifier,
            confidence: confidence.min(1.0),
        })
    }
}

/// A path is writable when it exists, or its deepest existing ancestor is
/// an object that can grow the missing keys.
fn is_writable(tree: &Value, target: &str) -> bool {
    if path::has(tree, target) {
        return true;
    }
    let mut prefix = target;
    while let Some(pos) = prefix.rfind('.') {
        prefix = &prefix[..pos];
        if let Some(node) = path::get(tree, prefix) {
            return node.is_object() || node.is_null();
        }
    }
    tree.is_object() || tree.is_null()
}
