//! Assistant configuration with documented constants
//!
//! All tunable thresholds are collected here with explanations of how they
//! interact. Values can be overridden from a TOML file; missing keys keep
//! their defaults.

use crate::core::error::{AssistError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for the command-to-mutation pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistConfig {
    // === RULE CLASSIFIER ===
    /// Confidence given to any rule-table match
    pub rule_base_confidence: f32,

    /// Bonus added when the matched span is long enough to look intentional
    ///
    /// Short spans ("bg", "pad") are often accidental partial matches.
    pub specific_match_bonus: f32,

    /// Matched spans longer than this many chars earn `specific_match_bonus`
    pub specific_match_length: usize,

    // === ROUTING ===
    /// Keyword routing at or above this confidence skips the model round-trip
    pub routing_threshold: f32,

    /// Model-reported confidence is clamped into [floor, ceiling]
    pub ai_confidence_floor: f32,
    pub ai_confidence_ceiling: f32,

    /// Confidence reported when both keyword and model routing fail
    pub fallback_confidence: f32,

    // === COLLABORATOR ===
    /// Hard timeout around every text-generation call
    pub collaborator_timeout_secs: u64,

    /// Output budget for routing prompts (small structured answers)
    pub classification_max_tokens: u32,

    /// Output budget for content generation prompts
    pub generation_max_tokens: u32,

    pub classification_temperature: f32,
    pub generation_temperature: f32,

    // === SESSIONS ===
    /// Idle sessions older than this are evicted
    pub session_ttl_secs: u64,

    /// Maximum number of history entries kept per session
    pub max_session_history: usize,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            rule_base_confidence: 0.8,
            specific_match_bonus: 0.1,
            specific_match_length: 12,

            routing_threshold: 0.9,
            ai_confidence_floor: 0.5,
            ai_confidence_ceiling: 1.0,
            fallback_confidence: 0.3,

            collaborator_timeout_secs: 30,
            classification_max_tokens: 256,
            generation_max_tokens: 4096,
            classification_temperature: 0.0,
            generation_temperature: 0.7,

            session_ttl_secs: 1800,
            max_session_history: 20,
        }
    }
}

impl AssistConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AssistConfig =
            toml::from_str(content).map_err(|e| AssistError::Config(e.to_string()))?;
        config.validate().map_err(AssistError::Config)?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| AssistError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_secs(self.collaborator_timeout_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        let confidences = [
            ("rule_base_confidence", self.rule_base_confidence),
            ("specific_match_bonus", self.specific_match_bonus),
            ("routing_threshold", self.routing_threshold),
            ("ai_confidence_floor", self.ai_confidence_floor),
            ("ai_confidence_ceiling", self.ai_confidence_ceiling),
            ("fallback_confidence", self.fallback_confidence),
        ];
        // NaN fails the range check too
        for (name, value) in confidences {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} ({}) must be within [0, 1]", name, value));
            }
        }

        if self.ai_confidence_floor > self.ai_confidence_ceiling {
            return Err(format!(
                "ai_confidence_floor ({}) should be <= ai_confidence_ceiling ({})",
                self.ai_confidence_floor, self.ai_confidence_ceiling
            ));
        }

        // The fallback must never look more certain than a real answer
        if self.fallback_confidence >= self.ai_confidence_floor {
            return Err(format!(
                "fallback_confidence ({}) should be < ai_confidence_floor ({})",
                self.fallback_confidence, self.ai_confidence_floor
            ));
        }

        if self.collaborator_timeout_secs == 0 {
            return Err("collaborator_timeout_secs must be positive".into());
        }

        Ok(())
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<AssistConfig> = OnceLock::new();

/// Get the global assistant config (initializes with defaults if not set)
pub fn config() -> &'static AssistConfig {
    CONFIG.get_or_init(AssistConfig::default)
}

/// Set the global assistant config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: AssistConfig) -> std::result::Result<(), AssistConfig> {
    CONFIG.set(config)
}
