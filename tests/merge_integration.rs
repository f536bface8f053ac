//! Merge engine integration tests
//!
//! Generated text arrives wrapped in prose and code fences, sometimes
//! echoing more structure than was asked for. These tests pin down what
//! ends up in the tree.

use block_assist::core::error::AssistError;
use block_assist::merge::{apply_page_updates, apply_targeted, extract_structured, merge_generated_content};
use block_assist::schema::registry::{BlockRegistry, SchemaProvider};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn features() -> Value {
    BlockRegistry::builtin().defaults("features").unwrap()
}

#[test]
fn test_indexed_item_merge() {
    let tree = features();
    let merged = merge_generated_content("\"Blazing\"", &tree, Some("elements.items[1].title")).unwrap();
    assert_eq!(merged["elements"]["items"][1]["title"], json!("Blazing"));
    assert_eq!(merged["elements"]["items"][0], tree["elements"]["items"][0]);
}

#[test]
fn test_full_replace_from_prose() {
    let tree = features();
    let mut generated = tree.clone();
    generated["elements"]["title"]["text"] = json!("Why teams pick us");

    let raw = format!("Sure, here is the block:\n\n{}\n\nLet me know!", generated);
    let merged = merge_generated_content(&raw, &tree, None).unwrap();
    assert_eq!(merged, generated);
}

#[test]
fn test_targeted_merge_into_missing_branch() {
    let tree = json!({"elements": {}});
    let merged = apply_targeted(&tree, "elements.badge.text", json!("New")).unwrap();
    assert_eq!(merged, json!({"elements": {"badge": {"text": "New"}}}));
}

#[test]
fn test_targeted_merge_refuses_to_clobber_scalar() {
    let tree = json!({"elements": {"title": "Plain"}});
    let result = apply_targeted(&tree, "elements.title.text", json!("Fancy"));
    assert!(matches!(result, Err(AssistError::InvalidPath(_))));
}

#[test]
fn test_page_merge_reports_skips() {
    let blocks = vec![
        json!({"layout": {"spacing": {"padding": "md", "margin": "none"}}}),
        json!({"layout": {"spacing": {"padding": "sm", "margin": "none"}}}),
    ];
    let raw = r#"```json
{"updates": [
  {"index": 0, "properties": {"layout": {"spacing": {"padding": "lg"}}}},
  {"index": 5, "properties": {"layout": {}}},
  {"oops": true},
  {"index": 1, "properties": {"layout": {"spacing": {"padding": "lg"}}}}
]}
```"#;

    let report = apply_page_updates(&blocks, raw).unwrap();
    assert_eq!(report.applied, vec![0, 1]);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.skipped[0].entry, 1);
    assert_eq!(report.skipped[1].entry, 2);
    for block in &report.blocks {
        assert_eq!(block["layout"]["spacing"], json!({"padding": "lg", "margin": "none"}));
    }
    assert_eq!(blocks[1]["layout"]["spacing"]["padding"], json!("sm"));
}

fn small_object() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-z]{1,8}", "[A-Za-z0-9 ]{0,12}", 1..5).prop_map(|m| {
        Value::Object(m.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
    })
}

proptest! {
    #[test]
    fn prop_wrapping_does_not_change_extraction(
        object in small_object(),
        before in "[A-Za-z ,.!]{0,40}",
        after in "[A-Za-z ,.!]{0,40}",
        fenced in any::<bool>(),
    ) {
        let body = object.to_string();
        let wrapped = if fenced {
            format!("{}\n```json\n{}\n```\n{}", before, body, after)
        } else {
            format!("{}\n{}\n{}", before, body, after)
        };
        prop_assert_eq!(extract_structured(&wrapped).unwrap(), extract_structured(&body).unwrap());
    }

    #[test]
    fn prop_nested_echo_matches_bare_leaf(
        keys in prop::collection::vec("[a-z]{1,6}", 1..4),
        leaf in "[A-Za-z ]{1,16}",
    ) {
        let target = keys.join(".");
        let nested = keys
            .iter()
            .rev()
            .fold(json!(leaf.clone()), |inner, key| {
                let mut wrapper = Map::new();
                wrapper.insert(key.clone(), inner);
                Value::Object(wrapper)
            });
        let tree = json!({});

        let from_nested = apply_targeted(&tree, &target, nested).unwrap();
        let from_bare = apply_targeted(&tree, &target, json!(leaf)).unwrap();
        prop_assert_eq!(from_nested, from_bare);
    }
}
