//! Keyword-only operation routing
//!
//! Fast, synchronous first pass of operation classification. Anything it
//! scores at or above the routing threshold never reaches the
//! text-generation collaborator.

use crate::command::keywords::{
    mentions, mentions_any, normalize, BACKGROUND, BLOCK_TABLES, GENERIC_ELEMENTS, LAYOUT,
};
use crate::core::config::config;
use crate::intent::classifier::RuleClassifier;
use crate::intent::rules::RULES;
use std::sync::{Arc, OnceLock};

pub const PROPERTY_CHANGE: &str = "property_change";
pub const CONTENT_UPDATE: &str = "content_update";
pub const BLOCK_CREATE: &str = "block_create";
pub const PAGE_UPDATE: &str = "page_update";
/// Generic conversational handler, also the fallback route
pub const GENERAL_CHAT: &str = "general_chat";

/// Every routable operation with the one-line semantics shown to the
/// collaborator
pub const OPERATIONS: &[(&str, &str)] = &[
    (
        PROPERTY_CHANGE,
        "adjust a visual setting of the block: layout, spacing, alignment, background, visibility",
    ),
    (
        CONTENT_UPDATE,
        "write or rewrite text content of the block or one of its elements",
    ),
    (BLOCK_CREATE, "generate a new block's content from scratch"),
    (PAGE_UPDATE, "apply a change across several blocks of the page"),
    (GENERAL_CHAT, "answer a question or chat without editing anything"),
];

pub fn operation_names() -> Vec<&'static str> {
    OPERATIONS.iter().map(|(name, _)| *name).collect()
}

/// Confidence for commands the property rule table recognises
const PROPERTY_RULE_CONFIDENCE: f32 = 0.95;
/// Extra confidence per additional keyword hit
const HIT_BONUS: f32 = 0.05;
/// Keyword scores never reach the routing threshold on their own
const KEYWORD_CEILING: f32 = 0.85;

struct KeywordRule {
    operation: &'static str,
    keywords: &'static [&'static str],
    weight: f32,
}

/// Phrases decisive enough to route without further checks
const PAGE_PHRASES: &[&str] = &[
    "whole page",
    "entire page",
    "all blocks",
    "every block",
    "all sections",
    "every section",
    "across the page",
    "all the sections",
];

const CREATE_PHRASES: &[&str] = &[
    "add a new",
    "create a new",
    "new section",
    "new block",
    "add a section",
    "add another section",
    "generate a",
    "start a new",
];

static KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        operation: CONTENT_UPDATE,
        keywords: &[
            "rewrite", "reword", "rephrase", "write", "copy", "wording", "headline", "tone",
            "sound", "translate", "shorten", "lengthen", "say", "says", "text", "friendlier",
            "punchier", "catchier",
        ],
        weight: 0.75,
    },
    KeywordRule {
        operation: PROPERTY_CHANGE,
        keywords: &[
            "color", "colour", "padding", "margin", "background", "align", "alignment", "width",
            "height", "spacing", "gradient", "darker", "lighter", "hide", "show", "bigger",
            "smaller", "layout",
        ],
        weight: 0.8,
    },
    KeywordRule {
        operation: BLOCK_CREATE,
        keywords: &["create", "add", "insert", "new"],
        weight: 0.6,
    },
    KeywordRule {
        operation: GENERAL_CHAT,
        keywords: &["help", "hello", "hi", "thanks", "explain", "why", "how", "what"],
        weight: 0.6,
    },
];

/// Quick routing guess
#[derive(Debug, Clone, PartialEq)]
pub struct RouteGuess {
    pub agent_name: &'static str,
    pub confidence: f32,
    pub reasoning: String,
}

/// Keyword router over the built-in operation tables
pub struct KeywordRouter {
    rules: Arc<RuleClassifier>,
}

static SHARED: OnceLock<KeywordRouter> = OnceLock::new();

impl KeywordRouter {
    pub fn new(rules: Arc<RuleClassifier>) -> Self {
        Self { rules }
    }

    /// Router over the built-in rule table using the global config
    pub fn shared() -> &'static KeywordRouter {
        SHARED.get_or_init(|| KeywordRouter::new(Arc::new(RuleClassifier::new(RULES, config()))))
    }

    pub fn route(&self, command: &str) -> RouteGuess {
        let normalized = normalize(command);

        if mentions_any(&normalized, PAGE_PHRASES) {
            return RouteGuess {
                agent_name: PAGE_UPDATE,
                confidence: 0.92,
                reasoning: "Command addresses the whole page".into(),
            };
        }

        // Creating something inside an existing block is an edit, not a new block
        if mentions_any(&normalized, CREATE_PHRASES)
            && !names_element(&normalized)
            && self.rules.classify(command).is_empty()
        {
            return RouteGuess {
                agent_name: BLOCK_CREATE,
                confidence: 0.9,
                reasoning: "Command asks for a new block".into(),
            };
        }

        if let Some(top) = self.rules.classify(command).first() {
            return RouteGuess {
                agent_name: PROPERTY_CHANGE,
                confidence: PROPERTY_RULE_CONFIDENCE,
                reasoning: format!("Matched property rule for {}", top.path),
            };
        }

        let best = KEYWORD_RULES
            .iter()
            .filter_map(|rule| {
                let hits = rule
                    .keywords
                    .iter()
                    .filter(|kw| mentions(&normalized, kw))
                    .count();
                (hits > 0).then(|| {
                    let score = rule.weight + HIT_BONUS * (hits - 1) as f32;
                    (rule, hits, score.min(KEYWORD_CEILING))
                })
            })
            // Table order breaks ties
            .fold(None, |best: Option<(&KeywordRule, usize, f32)>, candidate| match best {
                Some(b) if b.2 >= candidate.2 => Some(b),
                _ => Some(candidate),
            });

        match best {
            Some((rule, hits, score)) => RouteGuess {
                agent_name: rule.operation,
                confidence: score,
                reasoning: format!("{} keyword hit(s) for {}", hits, rule.operation),
            },
            None if command.trim_end().ends_with('?') => RouteGuess {
                agent_name: GENERAL_CHAT,
                confidence: 0.6,
                reasoning: "Command is a question".into(),
            },
            None => RouteGuess {
                agent_name: GENERAL_CHAT,
                confidence: 0.0,
                reasoning: "No keyword matched".into(),
            },
        }
    }
}

/// Whether the command names a part of some block (title, button, background...)
fn names_element(normalized: &str) -> bool {
    BLOCK_TABLES
        .iter()
        .flat_map(|table| table.elements.iter())
        .chain(GENERIC_ELEMENTS.iter())
        .chain([&BACKGROUND, &LAYOUT])
        .any(|group| mentions_any(normalized, group.keywords))
}

/// Synchronous keyword-only routing, for callers that cannot await
pub fn classify_operation(command: &str) -> &'static str {
    KeywordRouter::shared().route(command).agent_name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_rule_is_decisive() {
        let guess = KeywordRouter::shared().route("make this full width");
        assert_eq!(guess.agent_name, PROPERTY_CHANGE);
        assert!(guess.confidence >= 0.9);
    }

    #[test]
    fn test_page_phrase_beats_property_rule() {
        let guess = KeywordRouter::shared().route("more padding on every section");
        assert_eq!(guess.agent_name, PAGE_UPDATE);
    }

    #[test]
    fn test_create_phrase() {
        assert_eq!(classify_operation("add a new pricing section"), BLOCK_CREATE);
    }

    #[test]
    fn test_create_phrase_naming_an_element_is_not_decisive() {
        let router = KeywordRouter::shared();

        let guess = router.route("add a new button");
        assert_eq!(guess.agent_name, BLOCK_CREATE);
        assert!(guess.confidence < 0.9);

        let guess = router.route("generate a catchier headline");
        assert_eq!(guess.agent_name, CONTENT_UPDATE);
        assert!(guess.confidence < 0.9);
    }

    #[test]
    fn test_create_phrase_with_property_rule_routes_to_property_change() {
        let guess = KeywordRouter::shared().route("create a new full width layout");
        assert_eq!(guess.agent_name, PROPERTY_CHANGE);
    }

    #[test]
    fn test_copy_change_stays_below_threshold() {
        let guess = KeywordRouter::shared().route("rewrite the headline so it sounds friendlier");
        assert_eq!(guess.agent_name, CONTENT_UPDATE);
        assert!(guess.confidence < 0.9);
    }

    #[test]
    fn test_unmatched_command() {
        let guess = KeywordRouter::shared().route("bananas");
        assert_eq!(guess.agent_name, GENERAL_CHAT);
        assert_eq!(guess.confidence, 0.0);
    }

    #[test]
    fn test_operation_names_are_unique() {
        let mut names = operation_names();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), OPERATIONS.len());
    }
}
