//! Reconcile generated content back into property trees
//!
//! Every merge works on a clone: a failed merge never touches the caller's
//! tree.

use crate::core::error::{AssistError, Result};
use crate::core::types::PropertyTree;
use crate::merge::extract::{extract_structured, extract_value};
use crate::tree::path::{self, Segment};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Replace the whole tree with a generated object
pub fn apply_full_replace(current: &PropertyTree, generated: Value) -> Result<PropertyTree> {
    if !generated.is_object() {
        return Err(AssistError::UnparsableResponse(
            "generated block content is not an object".into(),
        ));
    }
    tracing::debug!(
        "Full replace: {} top-level keys -> {}",
        current.as_object().map_or(0, |m| m.len()),
        generated.as_object().map_or(0, |m| m.len())
    );
    Ok(generated)
}

/// Write a generated value at `target` in a clone of `tree`.
///
/// Generators often echo the nested shape around the value they were asked
/// for (`{"button": {"text": "Go"}}` for `elements.button.text`). When the
/// generated value is a container that contains the target path, or a
/// trailing part of it, the leaf at that path is used instead.
pub fn apply_targeted(tree: &PropertyTree, target: &str, generated: Value) -> Result<PropertyTree> {
    let segments = path::parse_path(target)?;
    let effective = extract_leaf(&generated, &segments).unwrap_or(generated);

    let mut updated = tree.clone();
    path::set(&mut updated, target, effective)?;
    Ok(updated)
}

/// Longest suffix of `segments` that walks all the way through `generated`
fn extract_leaf(generated: &Value, segments: &[Segment]) -> Option<Value> {
    if !(generated.is_object() || generated.is_array()) {
        return None;
    }

    (0..segments.len()).find_map(|start| {
        let mut current = generated;
        for segment in &segments[start..] {
            current = match (segment, current) {
                (Segment::Key(key), Value::Object(map)) => map.get(key)?,
                (Segment::Index(index), Value::Array(items)) => items.get(*index)?,
                _ => return None,
            };
        }
        Some(current.clone())
    })
}

/// Merge raw generated text into `tree`: targeted when a path is given,
/// full replace otherwise
pub fn merge_generated_content(
    raw: &str,
    tree: &PropertyTree,
    target: Option<&str>,
) -> Result<PropertyTree> {
    match target {
        Some(target) => apply_targeted(tree, target, extract_value(raw)?),
        None => apply_full_replace(tree, extract_structured(raw)?),
    }
}

/// One per-block update in a page-level answer
#[derive(Debug, Clone, Deserialize)]
struct PageUpdate {
    index: usize,
    properties: Value,
}

/// Update entry that was not applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedUpdate {
    /// Position of the entry in the generated list
    pub entry: usize,
    pub reason: String,
}

/// Outcome of a page-level merge
#[derive(Debug, Clone, Serialize)]
pub struct PageMergeReport {
    pub blocks: Vec<PropertyTree>,
    /// Block indices that were updated, in application order
    pub applied: Vec<usize>,
    pub skipped: Vec<SkippedUpdate>,
}

/// Apply a generated page-level answer of the form
/// `{"updates": [{"index": 0, "properties": {...}}, ...]}` (`"blocks"` is
/// accepted as the collection name too).
///
/// Each entry is merged into its block independently; bad entries are
/// skipped and reported rather than failing the batch.
pub fn apply_page_updates(blocks: &[PropertyTree], raw: &str) -> Result<PageMergeReport> {
    let answer = extract_structured(raw)?;
    let entries = answer
        .get("updates")
        .or_else(|| answer.get("blocks"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            AssistError::UnparsableResponse("page answer has no update list".into())
        })?;

    let mut report = PageMergeReport {
        blocks: blocks.to_vec(),
        applied: Vec::new(),
        skipped: Vec::new(),
    };

    for (entry, raw_update) in entries.iter().enumerate() {
        let update: PageUpdate = match serde_json::from_value(raw_update.clone()) {
            Ok(update) => update,
            Err(e) => {
                report.skipped.push(SkippedUpdate {
                    entry,
                    reason: format!("malformed update: {}", e),
                });
                continue;
            }
        };

        if update.index >= blocks.len() {
            report.skipped.push(SkippedUpdate {
                entry,
                reason: format!(
                    "index {} out of range for {} block(s)",
                    update.index,
                    blocks.len()
                ),
            });
            continue;
        }
        if !update.properties.is_object() {
            report.skipped.push(SkippedUpdate {
                entry,
                reason: "properties is not an object".into(),
            });
            continue;
        }

        merge_into(&mut report.blocks[update.index], update.properties);
        report.applied.push(update.index);
    }

    if !report.skipped.is_empty() {
        tracing::warn!("Page merge skipped {} update(s)", report.skipped.len());
    }
    Ok(report)
}

/// Overlay `patch` onto `base`: objects merge key by key, anything else
/// replaces
fn merge_into(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hero() -> Value {
        json!({
            "elements": {"button": {"text": "Start", "href": "/"}},
            "layout": {"spacing": {"padding": "md"}}
        })
    }

    #[test]
    fn test_fenced_targeted_merge() {
        let raw = "```json\n{\"text\":\"Go\"}\n```";
        let merged = merge_generated_content(raw, &hero(), Some("elements.button.text")).unwrap();
        assert_eq!(merged["elements"]["button"]["text"], json!("Go"));
        assert_eq!(merged["elements"]["button"]["href"], json!("/"));
    }

    #[test]
    fn test_full_nested_echo_equals_bare_value() {
        let nested = json!({"a": {"b": {"c": "X"}}});
        let tree = json!({"a": {"b": {"c": "old", "d": 1}}});
        let from_nested = apply_targeted(&tree, "a.b.c", nested).unwrap();
        let from_bare = apply_targeted(&tree, "a.b.c", json!("X")).unwrap();
        assert_eq!(from_nested, from_bare);
    }

    #[test]
    fn test_container_without_path_used_as_is() {
        let tree = json!({"background": {"type": "color"}});
        let generated = json!({"type": "gradient", "gradient": "sunset"});
        let merged = apply_targeted(&tree, "background", generated.clone()).unwrap();
        assert_eq!(merged["background"], generated);
    }

    #[test]
    fn test_full_replace_rejects_non_object() {
        assert!(apply_full_replace(&hero(), json!("nope")).is_err());
        assert!(merge_generated_content("just words", &hero(), None).is_err());
    }

    #[test]
    fn test_failed_targeted_merge_leaves_tree() {
        let tree = json!({"title": "Hello"});
        let result = merge_generated_content("\"Hi\"", &tree, Some("title.text"));
        assert!(result.is_err());
        assert_eq!(tree, json!({"title": "Hello"}));
    }

    #[test]
    fn test_page_updates_skip_out_of_range() {
        let blocks = vec![hero(), json!({"elements": {"title": {"text": "Features"}}})];
        let raw = r#"Here are the changes:
{"updates": [
  {"index": 1, "properties": {"elements": {"title": {"text": "Why us"}}}},
  {"index": 7, "properties": {}},
  {"index": 0, "properties": {"layout": {"spacing": {"padding": "lg"}}}},
  {"properties": {}}
]}"#;
        let report = apply_page_updates(&blocks, raw).unwrap();

        assert_eq!(report.applied, vec![1, 0]);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].entry, 1);
        assert!(report.skipped[0].reason.contains("out of range"));
        assert_eq!(report.blocks[1]["elements"]["title"]["text"], json!("Why us"));
        assert_eq!(report.blocks[0]["layout"]["spacing"]["padding"], json!("lg"));
        assert_eq!(report.blocks[0]["elements"]["button"]["text"], json!("Start"));
    }

    #[test]
    fn test_page_updates_accept_blocks_key() {
        let raw = r#"{"blocks": [{"index": 0, "properties": {"x": 1}}]}"#;
        let report = apply_page_updates(&[json!({})], raw).unwrap();
        assert_eq!(report.blocks[0], json!({"x": 1}));
    }

    #[test]
    fn test_page_answer_without_list_is_unparsable() {
        assert!(matches!(
            apply_page_updates(&[json!({})], r#"{"changes": []}"#),
            Err(AssistError::UnparsableResponse(_))
        ));
    }
}
