//! Block Assist - natural-language editing for page blocks
//!
//! Turns commands like "add a bit more padding" or "rewrite the headline"
//! into concrete mutations of a block's property tree, using a rule table
//! first and a text-generation collaborator only when the rules are unsure.

pub mod assistant;
pub mod command;
pub mod core;
pub mod decision;
pub mod intent;
pub mod llm;
pub mod merge;
pub mod orchestrator;
pub mod routing;
pub mod schema;
pub mod tree;

pub use assistant::Assistant;
