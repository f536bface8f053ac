//! Dot-delimited path access into a property tree
//!
//! Paths look like `layout.blockSettings.height`. Array elements use a
//! bracket index on the owning key: `items[2].title`.
//!
//! Reads never fail: a missing or malformed path is simply `None`.
//! Writes create the minimum chain of empty containers needed to reach the
//! leaf, but never replace an existing scalar with a container. A `null`
//! counts as absent and may be replaced.

use crate::core::error::{AssistError, Result};
use serde_json::{Map, Value};

/// One step of a parsed path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Segment::Key(key) => write!(f, "'{}'", key),
            Segment::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// Parse a path into segments
pub fn parse_path(path: &str) -> Result<Vec<Segment>> {
    if path.trim().is_empty() {
        return Err(AssistError::InvalidPath("empty path".into()));
    }

    let mut segments = Vec::new();
    for part in path.split('.') {
        let (key, mut rest) = match part.find('[') {
            Some(pos) => (&part[..pos], &part[pos..]),
            None => (part, ""),
        };
        if key.is_empty() {
            return Err(AssistError::InvalidPath(format!(
                "empty segment in '{}'",
                path
            )));
        }
        segments.push(Segment::Key(key.to_string()));

        while !rest.is_empty() {
            let close = rest
                .find(']')
                .filter(|_| rest.starts_with('['))
                .ok_or_else(|| AssistError::InvalidPath(format!("malformed index in '{}'", path)))?;
            let index = rest[1..close]
                .parse::<usize>()
                .map_err(|_| AssistError::InvalidPath(format!("bad array index in '{}'", path)))?;
            segments.push(Segment::Index(index));
            rest = &rest[close + 1..];
        }
    }

    Ok(segments)
}

/// Join a prefix and a suffix into one path
pub fn join_path(prefix: &str, suffix: &str) -> String {
    match (prefix.is_empty(), suffix.is_empty()) {
        (true, _) => suffix.to_string(),
        (_, true) => prefix.to_string(),
        _ => format!("{}.{}", prefix, suffix),
    }
}

/// Read the value at `path`
pub fn get<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    let segments = parse_path(path).ok()?;
    let mut current = tree;
    for segment in &segments {
        current = match (segment, current) {
            (Segment::Key(key), Value::Object(map)) => map.get(key)?,
            (Segment::Index(index), Value::Array(items)) => items.get(*index)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable variant of [`get`]
pub fn get_mut<'a>(tree: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    let segments = parse_path(path).ok()?;
    let mut current = tree;
    for segment in &segments {
        current = match (segment, current) {
            (Segment::Key(key), Value::Object(map)) => map.get_mut(key)?,
            (Segment::Index(index), Value::Array(items)) => items.get_mut(*index)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Whether a value exists at `path`
pub fn has(tree: &Value, path: &str) -> bool {
    get(tree, path).is_some()
}

/// Write `value` at `path`, creating intermediate containers as needed.
///
/// Mutates and returns the same tree; clone first for an immutable update.
pub fn set<'a>(tree: &'a mut Value, path: &str, value: Value) -> Result<&'a mut Value> {
    let segments = parse_path(path)?;
    let (last, parents) = segments
        .split_last()
        .ok_or_else(|| AssistError::InvalidPath("empty path".into()))?;

    {
        let mut current = &mut *tree;
        for (i, segment) in parents.iter().enumerate() {
            let next = &segments[i + 1];
            current = descend(current, segment, next, path)?;
        }
        assign(current, last, value, path)?;
    }

    Ok(tree)
}

/// Remove and return the value at `path`
pub fn remove(tree: &mut Value, path: &str) -> Option<Value> {
    let segments = parse_path(path).ok()?;
    let (last, parents) = segments.split_last()?;

    let mut current = tree;
    for segment in parents {
        current = match (segment, current) {
            (Segment::Key(key), Value::Object(map)) => map.get_mut(key)?,
            (Segment::Index(index), Value::Array(items)) => items.get_mut(*index)?,
            _ => return None,
        };
    }

    match (last, current) {
        (Segment::Key(key), Value::Object(map)) => map.remove(key),
        (Segment::Index(index), Value::Array(items)) if *index < items.len() => {
            Some(items.remove(*index))
        }
        _ => None,
    }
}

/// Every scalar leaf of the tree with its path, in document order.
///
/// Empty containers count as leaves so that "cleared" fields are visible.
pub fn leaves(tree: &Value) -> Vec<(String, &Value)> {
    let mut out = Vec::new();
    collect_leaves(tree, String::new(), &mut out);
    out
}

fn collect_leaves<'a>(node: &'a Value, prefix: String, out: &mut Vec<(String, &'a Value)>) {
    match node {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                collect_leaves(child, join_path(&prefix, key), out);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (index, child) in items.iter().enumerate() {
                collect_leaves(child, format!("{}[{}]", prefix, index), out);
            }
        }
        _ => out.push((prefix, node)),
    }
}

fn empty_container_for(segment: &Segment) -> Value {
    match segment {
        Segment::Key(_) => Value::Object(Map::new()),
        Segment::Index(_) => Value::Array(Vec::new()),
    }
}

fn descend<'a>(
    node: &'a mut Value,
    segment: &Segment,
    next: &Segment,
    path: &str,
) -> Result<&'a mut Value> {
    if node.is_null() {
        *node = empty_container_for(segment);
    }

    let child = match (segment, node) {
        (Segment::Key(key), Value::Object(map)) => map
            .entry(key.clone())
            .or_insert_with(|| empty_container_for(next)),
        (Segment::Index(index), Value::Array(items)) => {
            if *index == items.len() {
                items.push(empty_container_for(next));
            }
            items.get_mut(*index).ok_or_else(|| {
                AssistError::InvalidPath(format!("index {} out of range in '{}'", index, path))
            })?
        }
        (segment, _) => {
            return Err(AssistError::InvalidPath(format!(
                "{} is not addressable in '{}'",
                segment, path
            )))
        }
    };

    if child.is_null() {
        *child = empty_container_for(next);
    }
    let is_container = match next {
        Segment::Key(_) => child.is_object(),
        Segment::Index(_) => child.is_array(),
    };
    if !is_container {
        return Err(AssistError::InvalidPath(format!(
            "{} is not a container in '{}'",
            segment, path
        )));
    }
    Ok(child)
}

fn assign(node: &mut Value, segment: &Segment, value: Value, path: &str) -> Result<()> {
    if node.is_null() {
        *node = empty_container_for(segment);
    }

    match (segment, node) {
        (Segment::Key(key), Value::Object(map)) => {
            map.insert(key.clone(), value);
            Ok(())
        }
        (Segment::Index(index), Value::Array(items)) => {
            if *index < items.len() {
                items[*index] = value;
                Ok(())
            } else if *index == items.len() {
                items.push(value);
                Ok(())
            } else {
                Err(AssistError::InvalidPath(format!(
                    "index {} out of range in '{}'",
                    index, path
                )))
            }
        }
        (segment, _) => Err(AssistError::InvalidPath(format!(
            "{} is not addressable in '{}'",
            segment, path
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_get_nested() {
        let tree = json!({"layout": {"blockSettings": {"height": "full"}}});
        assert_eq!(get(&tree, "layout.blockSettings.height"), Some(&json!("full")));
        assert_eq!(get(&tree, "layout.missing.height"), None);
        assert_eq!(get(&tree, "layout.blockSettings.height.deeper"), None);
    }

    #[test]
    fn test_get_array_index() {
        let tree = json!({"items": [{"title": "a"}, {"title": "b"}]});
        assert_eq!(get(&tree, "items[1].title"), Some(&json!("b")));
        assert_eq!(get(&tree, "items[5].title"), None);
    }

    #[test]
    fn test_set_creates_intermediates() {
        let mut tree = json!({});
        set(&mut tree, "elements.button.text", json!("Go")).unwrap();
        assert_eq!(tree, json!({"elements": {"button": {"text": "Go"}}}));
    }

    #[test]
    fn test_set_replaces_null_placeholder() {
        let mut tree = json!({"background": null});
        set(&mut tree, "background.color", json!("#fff")).unwrap();
        assert_eq!(get(&tree, "background.color"), Some(&json!("#fff")));
    }

    #[test]
    fn test_set_refuses_to_overwrite_scalar_with_container() {
        let mut tree = json!({"title": "Hello"});
        let result = set(&mut tree, "title.text", json!("x"));
        assert!(matches!(result, Err(AssistError::InvalidPath(_))));
        assert_eq!(tree, json!({"title": "Hello"}));
    }

    #[test]
    fn test_set_empty_path_is_invalid() {
        let mut tree = json!({});
        assert!(matches!(set(&mut tree, "", json!(1)), Err(AssistError::InvalidPath(_))));
        assert!(matches!(set(&mut tree, "a..b", json!(1)), Err(AssistError::InvalidPath(_))));
    }

    #[test]
    fn test_set_array_append_only_at_end() {
        let mut tree = json!({"items": ["a"]});
        set(&mut tree, "items[1]", json!("b")).unwrap();
        assert_eq!(tree, json!({"items": ["a", "b"]}));
        assert!(set(&mut tree, "items[5]", json!("z")).is_err());
    }

    #[test]
    fn test_remove() {
        let mut tree = json!({"a": {"b": 1, "c": 2}});
        assert_eq!(remove(&mut tree, "a.b"), Some(json!(1)));
        assert_eq!(tree, json!({"a": {"c": 2}}));
        assert_eq!(remove(&mut tree, "a.zzz"), None);
    }

    #[test]
    fn test_leaves_include_empty_containers() {
        let tree = json!({"a": {"b": 1}, "c": [], "d": [true]});
        let paths: Vec<String> = leaves(&tree).into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["a.b", "c", "d[0]"]);
    }

    fn key() -> impl Strategy<Value = String> {
        "[a-z]{1,6}"
    }

    proptest! {
        #[test]
        fn prop_set_then_get_round_trips(
            seed_paths in prop::collection::vec(prop::collection::vec(key(), 1..4), 0..4),
            target in prop::collection::vec(key(), 1..5),
            value in any::<i64>(),
        ) {
            let mut tree = json!({});
            for seed in &seed_paths {
                let _ = set(&mut tree, &seed.join("."), json!("seed"));
            }

            let path = target.join(".");
            let mut copy = tree.clone();
            if set(&mut copy, &path, json!(value)).is_ok() {
                prop_assert_eq!(get(&copy, &path), Some(&json!(value)));
            }

            let mut fresh = json!({});
            set(&mut fresh, &path, json!(value)).unwrap();
            prop_assert_eq!(get(&fresh, &path), Some(&json!(value)));
        }
    }
}
