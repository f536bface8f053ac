//! Target resolution - maps a command to the path it most likely edits
//!
//! `None` means "no single target": the command names the whole block, names
//! more than one element, or names nothing we recognise. Callers then fall
//! back to a whole-block update instead of guessing.

use crate::command::keywords::{
    elements_for, mentions, mentions_any, normalize, ElementGroup, BACKGROUND, BLOCK_WIDE, LAYOUT,
};
use crate::tree::path::join_path;
use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;

/// Resolves commands to dot-delimited target paths
pub struct TargetResolver {
    /// Change verb followed by a background kind noun ("switch to a gradient")
    kind_switch: Option<Regex>,
    /// Explicit array reference ("feature 2", "card #3")
    item_index: Option<Regex>,
}

static SHARED: OnceLock<TargetResolver> = OnceLock::new();

fn compile(pattern: &str) -> Option<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| tracing::warn!("Invalid resolver pattern {:?}: {}", pattern, e))
        .ok()
}

impl TargetResolver {
    pub fn new() -> Self {
        Self {
            kind_switch: compile(
                r"\b(?:change|replace|switch|swap|convert|turn)\b.*\b(?:to|into|with)\s+(?:an?\s+|the\s+)?(?:solid\s+)?(color|colour|image|photo|picture|gradient|video)\b",
            ),
            item_index: compile(
                r"\b(?:feature|item|card|testimonial|quote|review)\s*#?(\d+)\b",
            ),
        }
    }

    /// Resolver shared across requests
    pub fn shared() -> &'static TargetResolver {
        SHARED.get_or_init(TargetResolver::new)
    }

    /// Resolve `command` for a block of `block_type`
    pub fn resolve(&self, command: &str, block_type: &str) -> Option<String> {
        let normalized = normalize(command);

        if mentions_any(&normalized, BLOCK_WIDE) {
            tracing::debug!("Target: block-wide wording in {:?}", command);
            return None;
        }

        let elements = elements_for(block_type);

        // An explicit "item N" reference is unambiguous on its own
        if let Some(path) = self.resolve_indexed(command, &normalized, elements) {
            return Some(path);
        }

        // "background image" names the background, not the image element
        let background_named = mentions_any(&normalized, BACKGROUND_NOUNS);
        let matched: Vec<&ElementGroup> = elements
            .iter()
            .filter(|group| {
                group.keywords.iter().any(|kw| {
                    mentions(&normalized, kw)
                        && !(background_named && is_background_refinement(kw))
                })
            })
            .collect();

        match matched.as_slice() {
            [single] => return Some(refine(single, &normalized)),
            [] => {}
            _ => {
                tracing::debug!(
                    "Target: {} element groups matched, using whole-block update",
                    matched.len()
                );
                return None;
            }
        }

        if mentions_any(&normalized, BACKGROUND.keywords) {
            if self
                .kind_switch
                .as_ref()
                .is_some_and(|re| re.is_match(command))
            {
                return Some(BACKGROUND.prefix.to_string());
            }
            return Some(refine(&BACKGROUND, &normalized));
        }

        if mentions_any(&normalized, LAYOUT.keywords) {
            return Some(refine(&LAYOUT, &normalized));
        }

        None
    }

    fn resolve_indexed(
        &self,
        command: &str,
        normalized: &str,
        elements: &[ElementGroup],
    ) -> Option<String> {
        let caps = self.item_index.as_ref()?.captures(command)?;
        let number: usize = caps.get(1)?.as_str().parse().ok()?;
        let index = number.checked_sub(1)?;
        let group = elements.iter().find(|g| g.indexed)?;

        let base = format!("{}[{}]", group.prefix, index);
        let suffix = group
            .refinements
            .iter()
            .find(|r| mentions_any(normalized, r.keywords))
            .map(|r| r.suffix);
        Some(match suffix {
            Some(suffix) => join_path(&base, suffix),
            None => base,
        })
    }
}

impl Default for TargetResolver {
    fn default() -> Self {
        Self::new()
    }
}

const BACKGROUND_NOUNS: &[&str] = &["background", "bg", "backdrop"];

fn is_background_refinement(keyword: &str) -> bool {
    BACKGROUND
        .refinements
        .iter()
        .any(|r| r.keywords.contains(&keyword))
}

/// Narrow a group's prefix by its first matching refinement (declared order)
fn refine(group: &ElementGroup, normalized: &str) -> String {
    group
        .refinements
        .iter()
        .find(|r| mentions_any(normalized, r.keywords))
        .map_or_else(
            || group.prefix.to_string(),
            |r| join_path(group.prefix, r.suffix),
        )
}

/// Resolve with the shared resolver
pub fn resolve_target(command: &str, block_type: &str) -> Option<String> {
    TargetResolver::shared().resolve(command, block_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_and_button_is_ambiguous() {
        assert_eq!(resolve_target("change the title and the button", "hero"), None);
    }

    #[test]
    fn test_button_refinements() {
        assert_eq!(
            resolve_target("change the button text to Sign up", "hero").as_deref(),
            Some("elements.button.text")
        );
        assert_eq!(
            resolve_target("make the button style secondary", "hero").as_deref(),
            Some("elements.button.variant")
        );
        assert_eq!(
            resolve_target("point the cta url at /pricing", "hero").as_deref(),
            Some("elements.button.href")
        );
    }

    #[test]
    fn test_subtitle_is_not_title() {
        assert_eq!(
            resolve_target("change the subtitle", "hero").as_deref(),
            Some("elements.subtitle")
        );
    }

    #[test]
    fn test_gradient_tweak_is_narrow() {
        assert_eq!(
            resolve_target("sunset gradient background", "hero").as_deref(),
            Some("background.gradient")
        );
    }

    #[test]
    fn test_kind_switch_targets_whole_background() {
        assert_eq!(
            resolve_target("switch the background to an image", "hero").as_deref(),
            Some("background")
        );
        assert_eq!(
            resolve_target("replace the background with a gradient", "hero").as_deref(),
            Some("background")
        );
    }

    #[test]
    fn test_background_image_is_not_the_image_element() {
        assert_eq!(
            resolve_target("use a mountain photo as the background image", "hero").as_deref(),
            Some("background.image")
        );
    }

    #[test]
    fn test_color_change_without_kind_noun_after_verb_is_narrow() {
        assert_eq!(
            resolve_target("change the background color to navy", "hero").as_deref(),
            Some("background.color")
        );
    }

    #[test]
    fn test_layout_refinement() {
        assert_eq!(
            resolve_target("make this full width", "hero").as_deref(),
            Some("layout.blockSettings.blockWidth")
        );
        assert_eq!(
            resolve_target("more padding", "cta").as_deref(),
            Some("layout.spacing.padding")
        );
    }

    #[test]
    fn test_block_wide_wording() {
        assert_eq!(resolve_target("make everything feel more playful", "hero"), None);
        assert_eq!(resolve_target("make it pop", "hero"), None);
    }

    #[test]
    fn test_indexed_item_reference() {
        assert_eq!(
            resolve_target("change feature 2 title to Speed", "features").as_deref(),
            Some("elements.items[1].title")
        );
        assert_eq!(
            resolve_target("rewrite card #3", "features").as_deref(),
            Some("elements.items[2]")
        );
    }

    #[test]
    fn test_item_zero_is_not_an_index() {
        assert_eq!(resolve_target("update item 0", "features").as_deref(), Some("elements.items"));
    }
}
