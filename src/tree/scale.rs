//! Ordered discrete levels for relative adjustments ("more padding")
//!
//! Scales are immutable tables shared across every computation. Stepping is
//! total: it clamps at the ends and never fails.

use crate::core::types::Modifier;

/// A fixed, ordered list of level names with a designated neutral level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrdinalScale {
    levels: &'static [&'static str],
    neutral: usize,
}

/// Spacing sizes used for padding, margin and gap
pub const SPACING_SCALE: OrdinalScale =
    OrdinalScale::new(&["none", "xs", "sm", "md", "lg", "xl", "2xl"], 3);

impl OrdinalScale {
    /// `neutral` is the index used when the current level is unknown.
    /// Must be a valid index into a non-empty `levels`.
    pub const fn new(levels: &'static [&'static str], neutral: usize) -> Self {
        assert!(!levels.is_empty());
        assert!(neutral < levels.len());
        Self { levels, neutral }
    }

    pub fn levels(&self) -> &'static [&'static str] {
        self.levels
    }

    pub fn first(&self) -> &'static str {
        self.levels[0]
    }

    pub fn last(&self) -> &'static str {
        self.levels[self.levels.len() - 1]
    }

    pub fn neutral(&self) -> &'static str {
        self.levels[self.neutral]
    }

    pub fn index_of(&self, level: &str) -> Option<usize> {
        self.levels.iter().position(|l| l.eq_ignore_ascii_case(level))
    }

    pub fn contains(&self, level: &str) -> bool {
        self.index_of(level).is_some()
    }

    fn resolve_index(&self, current: Option<&str>) -> usize {
        current
            .and_then(|level| self.index_of(level))
            .unwrap_or(self.neutral)
    }

    /// Step up by the modifier's step count, clamped at the top level
    pub fn increase(&self, current: Option<&str>, modifier: Option<Modifier>) -> &'static str {
        let index = self.resolve_index(current);
        let step = modifier.unwrap_or_default().steps();
        let last = self.levels.len() - 1;
        self.levels[(index + step).min(last)]
    }

    /// Step down by the modifier's step count, clamped at the bottom level
    pub fn decrease(&self, current: Option<&str>, modifier: Option<Modifier>) -> &'static str {
        let index = self.resolve_index(current);
        let step = modifier.unwrap_or_default().steps();
        self.levels[index.saturating_sub(step)]
    }
}
