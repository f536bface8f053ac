//! Block schema registry
//!
//! Holds each block type's default property tree and a short description of
//! its fields. Definitions are TOML files:
//!
//! ```toml
//! [meta]
//! id = "hero"
//! name = "Hero"
//! summary = "Large intro section: title, subtitle, button, image"
//!
//! [defaults.elements.title]
//! text = "Welcome"
//! ```

use crate::core::error::{AssistError, Result};
use crate::core::types::PropertyTree;
use ahash::AHashMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

/// Read-only source of block defaults and schema summaries
pub trait SchemaProvider: Send + Sync {
    /// Default property tree for `block_type`, `None` if unknown
    fn defaults(&self, block_type: &str) -> Option<PropertyTree>;

    /// Human-readable description of the block's fields
    fn summary(&self, block_type: &str) -> Option<String>;

    fn contains(&self, block_type: &str) -> bool {
        self.defaults(block_type).is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockMeta {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub summary: Option<String>,
}

/// One block type
#[derive(Debug, Clone, Deserialize)]
pub struct BlockDefinition {
    pub meta: BlockMeta,
    #[serde(default = "empty_tree")]
    pub defaults: PropertyTree,
}

fn empty_tree() -> PropertyTree {
    Value::Object(Map::new())
}

impl BlockDefinition {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AssistError::Schema(e.to_string()))
    }
}

/// Registry of block definitions keyed by lowercase block type
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    blocks: AHashMap<String, BlockDefinition>,
}

impl BlockRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, replacing any previous one with the same id
    pub fn register(&mut self, definition: BlockDefinition) -> Result<String> {
        let id = definition.meta.id.trim().to_lowercase();
        if id.is_empty() {
            return Err(AssistError::Schema("block definition has an empty id".into()));
        }
        if !definition.defaults.is_object() {
            return Err(AssistError::Schema(format!(
                "defaults for '{}' must be a table",
                id
            )));
        }

        if self.blocks.insert(id.clone(), definition).is_some() {
            tracing::debug!("Replaced block definition '{}'", id);
        }
        Ok(id)
    }

    /// Load a block definition from a TOML file
    pub fn load_file(&mut self, path: &Path) -> Result<String> {
        let content = std::fs::read_to_string(path)?;
        let definition: BlockDefinition = toml::from_str(&content)
            .map_err(|e| AssistError::Schema(format!("{}: {}", path.display(), e)))?;
        self.register(definition)
    }

    /// Load all .toml files from a directory recursively
    pub fn load_directory(&mut self, path: &Path) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        self.load_directory_recursive(path, &mut ids)?;
        tracing::info!("Loaded {} block definition(s) from {}", ids.len(), path.display());
        Ok(ids)
    }

    fn load_directory_recursive(&mut self, path: &Path, ids: &mut Vec<String>) -> Result<()> {
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let entry_path = entry.path();

            if entry_path.is_dir() {
                self.load_directory_recursive(&entry_path, ids)?;
            } else if entry_path.extension().map_or(false, |ext| ext == "toml") {
                ids.push(self.load_file(&entry_path)?);
            }
        }
        Ok(())
    }

    pub fn get(&self, block_type: &str) -> Option<&BlockDefinition> {
        self.blocks.get(&block_type.trim().to_lowercase())
    }

    /// Registered block types, sorted
    pub fn block_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.blocks.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl SchemaProvider for BlockRegistry {
    fn defaults(&self, block_type: &str) -> Option<PropertyTree> {
        self.get(block_type).map(|d| d.defaults.clone())
    }

    fn summary(&self, block_type: &str) -> Option<String> {
        self.get(block_type).and_then(|d| d.meta.summary.clone())
    }
}
