//! Gather block context for LLM prompts
//!
//! Builds a plain-text summary of the block being edited so generative
//! prompts can see what is already there and what may be changed.

use crate::core::types::PropertyTree;

/// Recent exchanges kept in a prompt
const MAX_RECENT: usize = 5;

/// Block context for LLM prompts
#[derive(Debug, Clone)]
pub struct BlockContext {
    /// Block type identifier ("hero", "features", ...)
    pub block_type: String,
    /// Current property tree
    pub tree: PropertyTree,
    /// Human-readable description of the block's fields
    pub schema_summary: Option<String>,
    /// Path the command is believed to edit; `None` means the whole block
    pub target: Option<String>,
    /// Most recent commands in this session, oldest first
    pub recent_commands: Vec<String>,
}

impl BlockContext {
    pub fn new(block_type: impl Into<String>, tree: PropertyTree) -> Self {
        Self {
            block_type: block_type.into(),
            tree,
            schema_summary: None,
            target: None,
            recent_commands: Vec::new(),
        }
    }

    pub fn with_summary(mut self, summary: Option<String>) -> Self {
        self.schema_summary = summary;
        self
    }

    pub fn with_target(mut self, target: Option<String>) -> Self {
        self.target = target;
        self
    }

    /// Add a prior command, keeping only the most recent few
    pub fn add_command(&mut self, command: impl Into<String>) {
        self.recent_commands.push(command.into());
        if self.recent_commands.len() > MAX_RECENT {
            self.recent_commands.remove(0);
        }
    }

    /// Generate a text summary of the context for LLM prompts
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str(&format!("Block type: {}\n", self.block_type));

        if let Some(summary) = &self.schema_summary {
            s.push_str(&format!("Fields: {}\n", summary));
        }

        match &self.target {
            Some(target) => s.push_str(&format!("Target path: {}\n", target)),
            None => s.push_str("Target: whole block\n"),
        }

        let pretty = serde_json::to_string_pretty(&self.tree).unwrap_or_else(|_| "{}".into());
        s.push_str(&format!("\nCurrent properties:\n{}\n", pretty));

        if !self.recent_commands.is_empty() {
            s.push_str("\nRecent commands:\n");
            for command in &self.recent_commands {
                s.push_str(&format!("- {}\n", command));
            }
        }

        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_names_target() {
        let ctx = BlockContext::new("hero", json!({"elements": {"title": {"text": "Hi"}}}))
            .with_target(Some("elements.title.text".into()))
            .with_summary(Some("title, subtitle, button".into()));
        let summary = ctx.summary();
        assert!(summary.contains("Block type: hero"));
        assert!(summary.contains("Target path: elements.title.text"));
        assert!(summary.contains("Fields: title, subtitle, button"));
        assert!(summary.contains("\"Hi\""));
    }

    #[test]
    fn test_whole_block_when_no_target() {
        let ctx = BlockContext::new("cta", json!({}));
        assert!(ctx.summary().contains("Target: whole block"));
    }

    #[test]
    fn test_recent_commands_are_bounded() {
        let mut ctx = BlockContext::new("hero", json!({}));
        for i in 0..8 {
            ctx.add_command(format!("command {}", i));
        }
        assert_eq!(ctx.recent_commands.len(), MAX_RECENT);
        assert_eq!(ctx.recent_commands[0], "command 3");
    }
}
