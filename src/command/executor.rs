//! Change execution - converts intents into property changes and applies them

use crate::core::error::Result;
use crate::core::types::{Intent, IntentAction, IntentCategory, PropertyChange, PropertyTree};
use crate::tree::path;
use crate::tree::scale::SPACING_SCALE;
use serde_json::{Number, Value};

/// Sides a spacing value can be split into
const DIRECTIONS: [&str; 4] = ["top", "right", "bottom", "left"];

/// Numeric spacing values move by this many units per scale step
const NUMERIC_STEP: i64 = 4;

/// Executes intents against a property tree
pub struct ChangeExecutor;

impl ChangeExecutor {
    /// Resolve an intent into concrete changes without touching the tree.
    ///
    /// `defaults` supplies reset targets; without it a reset falls back to
    /// the scale's neutral level for spacing and `null` otherwise.
    pub fn plan(
        tree: &PropertyTree,
        intent: &Intent,
        defaults: Option<&PropertyTree>,
    ) -> Result<Vec<PropertyChange>> {
        path::parse_path(&intent.path)?;
        let old = path::get(tree, &intent.path);

        // Spacing split into sides fans out to one change per side
        if intent.category == IntentCategory::Spacing && intent.action != IntentAction::Reset {
            if let Some(Value::Object(sides)) = old {
                let present: Vec<&str> = DIRECTIONS
                    .iter()
                    .copied()
                    .filter(|d| sides.contains_key(*d))
                    .collect();
                let targets = if present.is_empty() {
                    DIRECTIONS.to_vec()
                } else {
                    present
                };

                return Ok(targets
                    .into_iter()
                    .map(|side| {
                        let old_side = sides.get(side);
                        PropertyChange {
                            path: path::join_path(&intent.path, side),
                            old_value: old_side.cloned(),
                            new_value: next_value(intent, old_side, None),
                            intent: intent.clone(),
                        }
                    })
                    .collect());
            }
        }

        let reset_to = defaults.and_then(|d| path::get(d, &intent.path));
        Ok(vec![PropertyChange {
            path: intent.path.clone(),
            old_value: old.cloned(),
            new_value: next_value(intent, old, reset_to),
            intent: intent.clone(),
        }])
    }

    /// Apply changes to a clone of `tree`. On error the original is untouched.
    pub fn apply(tree: &PropertyTree, changes: &[PropertyChange]) -> Result<PropertyTree> {
        let mut updated = tree.clone();
        for change in changes {
            // A reset with nothing to reset to clears the key
            if change.intent.action == IntentAction::Reset && change.new_value.is_null() {
                path::remove(&mut updated, &change.path);
            } else {
                path::set(&mut updated, &change.path, change.new_value.clone())?;
            }
        }
        Ok(updated)
    }

    /// Plan and apply in one step
    pub fn execute(
        tree: &PropertyTree,
        intent: &Intent,
        defaults: Option<&PropertyTree>,
    ) -> Result<ExecutionResult> {
        let changes = Self::plan(tree, intent, defaults)?;
        let tree = Self::apply(tree, &changes)?;
        tracing::debug!("Applied {} change(s) for {}", changes.len(), intent.path);
        Ok(ExecutionResult { tree, changes })
    }
}

/// Result of executing an intent
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub tree: PropertyTree,
    pub changes: Vec<PropertyChange>,
}

/// Changes an intent implies for `tree` (0, 1 or one per spacing side)
pub fn apply_intent(tree: &PropertyTree, intent: &Intent) -> Result<Vec<PropertyChange>> {
    ChangeExecutor::plan(tree, intent, None)
}

/// Apply changes to a clone of `tree`
pub fn apply_changes(tree: &PropertyTree, changes: &[PropertyChange]) -> Result<PropertyTree> {
    ChangeExecutor::apply(tree, changes)
}

fn next_value(intent: &Intent, old: Option<&Value>, reset_to: Option<&Value>) -> Value {
    match intent.action {
        IntentAction::Set => intent.value.clone().unwrap_or(Value::Bool(true)),
        IntentAction::Toggle => {
            Value::Bool(!old.and_then(Value::as_bool).unwrap_or(false))
        }
        IntentAction::Increase | IntentAction::Decrease => step(intent, old),
        IntentAction::Reset => match reset_to {
            Some(value) => value.clone(),
            None if intent.category == IntentCategory::Spacing => {
                Value::String(SPACING_SCALE.neutral().to_string())
            }
            None => Value::Null,
        },
    }
}

fn step(intent: &Intent, old: Option<&Value>) -> Value {
    let modifier = intent.modifier.unwrap_or_default();
    let up = intent.action == IntentAction::Increase;

    let delta = NUMERIC_STEP * modifier.steps() as i64;

    // Integers stay integers
    if let Some(n) = old.and_then(Value::as_i64) {
        let next = if up { n.saturating_add(delta) } else { n.saturating_sub(delta).max(0) };
        return Value::from(next);
    }
    if let Some(n) = old.and_then(Value::as_u64) {
        let delta = delta.unsigned_abs();
        let next = if up { n.saturating_add(delta) } else { n.saturating_sub(delta) };
        return Value::from(next);
    }
    if let Some(n) = old.and_then(Value::as_f64) {
        let delta = delta as f64;
        let next = if up { n + delta } else { (n - delta).max(0.0) };
        return Number::from_f64(next).map_or(Value::Null, Value::Number);
    }

    let current = old.and_then(Value::as_str);
    let level = if up {
        SPACING_SCALE.increase(current, Some(modifier))
    } else {
        SPACING_SCALE.decrease(current, Some(modifier))
    };
    Value::String(level.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Modifier;
    use serde_json::json;

    fn intent(category: IntentCategory, action: IntentAction, path: &str) -> Intent {
        Intent {
            category,
            action,
            path: path.into(),
            value: None,
            modifier: None,
            confidence: 0.8,
        }
    }

    #[test]
    fn test_slight_increase_on_scalar_padding() {
        let tree = json!({"layout": {"spacing": {"padding": "sm"}}});
        let mut i = intent(IntentCategory::Spacing, IntentAction::Increase, "layout.spacing.padding");
        i.modifier = Some(Modifier::Slight);

        let result = ChangeExecutor::execute(&tree, &i, None).unwrap();
        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].old_value, Some(json!("sm")));
        assert_eq!(result.tree["layout"]["spacing"]["padding"], json!("md"));
    }

    #[test]
    fn test_spacing_fans_out_to_present_sides() {
        let tree = json!({"layout": {"spacing": {"padding": {"top": "sm", "bottom": "lg"}}}});
        let i = intent(IntentCategory::Spacing, IntentAction::Decrease, "layout.spacing.padding");

        let changes = apply_intent(&tree, &i).unwrap();
        let paths: Vec<&str> = changes.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["layout.spacing.padding.top", "layout.spacing.padding.bottom"]);
        assert_eq!(changes[0].new_value, json!("none"));
        assert_eq!(changes[1].new_value, json!("sm"));
    }

    #[test]
    fn test_empty_side_object_fans_out_to_all_four() {
        let tree = json!({"layout": {"spacing": {"padding": {}}}});
        let i = intent(IntentCategory::Spacing, IntentAction::Increase, "layout.spacing.padding");
        assert_eq!(apply_intent(&tree, &i).unwrap().len(), 4);
    }

    #[test]
    fn test_toggle_absent_becomes_true() {
        let tree = json!({});
        let i = intent(IntentCategory::Content, IntentAction::Toggle, "elements.image.visible");
        let result = ChangeExecutor::execute(&tree, &i, None).unwrap();
        assert_eq!(result.tree["elements"]["image"]["visible"], json!(true));
    }

    #[test]
    fn test_numeric_spacing_steps() {
        let tree = json!({"layout": {"spacing": {"gap": 2}}});
        let i = intent(IntentCategory::Spacing, IntentAction::Decrease, "layout.spacing.gap");
        let changes = apply_intent(&tree, &i).unwrap();
        assert_eq!(changes[0].new_value, json!(0));
    }

    #[test]
    fn test_integer_spacing_stays_integer() {
        let tree = json!({"layout": {"spacing": {"gap": 16}}});
        let i = intent(IntentCategory::Spacing, IntentAction::Increase, "layout.spacing.gap");
        let changes = apply_intent(&tree, &i).unwrap();
        assert_eq!(changes[0].new_value, json!(24));
        assert!(changes[0].new_value.is_i64());

        let mut i = intent(IntentCategory::Spacing, IntentAction::Decrease, "layout.spacing.gap");
        i.modifier = Some(Modifier::Slight);
        assert_eq!(apply_intent(&tree, &i).unwrap()[0].new_value, json!(12));
    }

    #[test]
    fn test_fractional_spacing_steps_as_float() {
        let tree = json!({"layout": {"spacing": {"gap": 1.5}}});
        let i = intent(IntentCategory::Spacing, IntentAction::Increase, "layout.spacing.gap");
        let changes = apply_intent(&tree, &i).unwrap();
        assert_eq!(changes[0].new_value.as_f64(), Some(9.5));
    }

    #[test]
    fn test_reset_uses_defaults() {
        let tree = json!({"background": {"type": "video"}});
        let defaults = json!({"background": {"type": "color", "color": "#ffffff"}});
        let i = intent(IntentCategory::Background, IntentAction::Reset, "background");
        let result = ChangeExecutor::execute(&tree, &i, Some(&defaults)).unwrap();
        assert_eq!(result.tree["background"], defaults["background"]);
    }

    #[test]
    fn test_reset_without_default_clears_key() {
        let tree = json!({"background": {"type": "color", "overlay": "dark"}});
        let i = intent(IntentCategory::Background, IntentAction::Reset, "background.overlay");
        let result = ChangeExecutor::execute(&tree, &i, None).unwrap();
        assert_eq!(result.tree, json!({"background": {"type": "color"}}));
        assert_eq!(result.changes[0].old_value, Some(json!("dark")));
    }

    #[test]
    fn test_failed_apply_leaves_original_untouched() {
        let tree = json!({"title": "Hello"});
        let mut i = intent(IntentCategory::Content, IntentAction::Set, "title.text");
        i.value = Some(json!("Hi"));
        assert!(ChangeExecutor::execute(&tree, &i, None).is_err());
        assert_eq!(tree, json!({"title": "Hello"}));
    }

    #[test]
    fn test_invalid_path_rejected() {
        let i = intent(IntentCategory::Layout, IntentAction::Set, "");
        assert!(apply_intent(&json!({}), &i).is_err());
    }
}
