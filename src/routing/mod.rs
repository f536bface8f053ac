//! Operation routing: which handler should run for a command
//!
//! Command -> KeywordRouter (sync) -> [collaborator, if unsure] -> ClassificationResult

pub mod hybrid;
pub mod keyword;

pub use hybrid::HybridClassifier;
pub use keyword::{
    classify_operation, operation_names, KeywordRouter, RouteGuess, BLOCK_CREATE, CONTENT_UPDATE,
    GENERAL_CHAT, OPERATIONS, PAGE_UPDATE, PROPERTY_CHANGE,
};
