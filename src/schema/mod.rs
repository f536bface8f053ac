//! Block schemas: default trees and field summaries per block type

pub mod builtin;
pub mod registry;

pub use builtin::BUILTIN_BLOCKS;
pub use registry::{BlockDefinition, BlockMeta, BlockRegistry, SchemaProvider};
