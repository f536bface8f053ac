//! Command-to-mutation pipeline
//!
//! Resolves which field a command targets and converts intents into
//! concrete property changes:
//! Intent -> TargetResolver -> ChangeExecutor -> Vec<PropertyChange> -> new tree

pub mod executor;
pub mod keywords;
pub mod resolver;

pub use executor::{apply_changes, apply_intent, ChangeExecutor, ExecutionResult};
pub use resolver::{resolve_target, TargetResolver};
