//! Property-level intent classification
//!
//! Turns a command like "add a bit more padding" into candidate
//! [`Intent`](crate::core::types::Intent)s using a declarative rule table.

pub mod classifier;
pub mod rules;

pub use classifier::RuleClassifier;
pub use rules::{IntentTemplate, RuleEntry, RuleValue, RULES};
