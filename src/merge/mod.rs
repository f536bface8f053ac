//! MergeEngine: turn generated text into property-tree updates

pub mod engine;
pub mod extract;

pub use engine::{
    apply_full_replace, apply_page_updates, apply_targeted, merge_generated_content,
    PageMergeReport, SkippedUpdate,
};
pub use extract::{extract_structured, extract_value, ExtractStrategy, STRATEGIES};
