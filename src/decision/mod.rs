//! DecisionEngine: how generated content should be applied to a block

pub mod engine;
pub mod heuristic;

pub use engine::{Decision, DecisionAction, DecisionCounts, DecisionEngine, PageDecision};
pub use heuristic::{HeuristicStateClassifier, LlmStateClassifier, StateAssessment, StateClassifier};
