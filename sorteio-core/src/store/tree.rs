//! Path operations over a JSON tree.
//!
//! `null` and empty objects never live in the tree: writing either one
//! deletes the location, and parents left empty by a delete are pruned.

use serde_json::{Map, Value};

/// Drop nulls and empty objects, recursively. `None` means "no data".
pub fn normalize(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(map) => {
            let map: Map<String, Value> = map
                .into_iter()
                .filter_map(|(key, child)| normalize(child).map(|child| (key, child)))
                .collect();
            if map.is_empty() {
                None
            } else {
                Some(Value::Object(map))
            }
        }
        other => Some(other),
    }
}

pub fn get<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut node = root;
    for segment in segments {
        node = node.as_object()?.get(segment)?;
    }
    if node.is_null() {
        None
    } else {
        Some(node)
    }
}

pub fn set(root: &mut Value, segments: &[String], value: Value) {
    set_in(root, segments, normalize(value));
}

fn set_in(node: &mut Value, segments: &[String], value: Option<Value>) {
    let Some((head, rest)) = segments.split_first() else {
        *node = value.unwrap_or(Value::Null);
        return;
    };

    if !node.is_object() {
        if value.is_none() {
            return;
        }
        *node = Value::Object(Map::new());
    }

    if let Value::Object(map) = node {
        let emptied = {
            let child = map.entry(head.clone()).or_insert(Value::Null);
            set_in(child, rest, value);
            child.is_null()
        };
        if emptied {
            map.remove(head);
        }
        if map.is_empty() {
            *node = Value::Null;
        }
    }
}

/// Flatten a normalized value into `(relative segments, leaf)` pairs.
/// Arrays are kept whole as leaves.
pub fn leaves(value: &Value) -> Vec<(Vec<String>, Value)> {
    let mut out = Vec::new();
    collect_leaves(value, &mut Vec::new(), &mut out);
    out
}

fn collect_leaves(value: &Value, prefix: &mut Vec<String>, out: &mut Vec<(Vec<String>, Value)>) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, child) in map {
                prefix.push(key.clone());
                collect_leaves(child, prefix, out);
                prefix.pop();
            }
        }
        leaf => out.push((prefix.clone(), leaf.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn segs(path: &str) -> Vec<String> {
        crate::store::path::segments(path).unwrap()
    }

    #[test]
    fn test_set_creates_intermediate_objects() {
        let mut root = Value::Null;
        set(&mut root, &segs("draw/current"), json!({ "number": 3 }));
        assert_eq!(root, json!({ "draw": { "current": { "number": 3 } } }));
        assert_eq!(get(&root, &segs("draw/current/number")), Some(&json!(3)));
    }

    #[test]
    fn test_set_null_removes_and_prunes() {
        let mut root = json!({ "participants": { "a": { "joinedAt": 1 } }, "draw": 1 });
        set(&mut root, &segs("participants/a"), Value::Null);
        assert_eq!(root, json!({ "draw": 1 }));
        set(&mut root, &segs("draw"), Value::Null);
        assert!(root.is_null());
    }

    #[test]
    fn test_set_replaces_scalar_parent() {
        let mut root = json!({ "draw": 5 });
        set(&mut root, &segs("draw/current"), json!(1));
        assert_eq!(root, json!({ "draw": { "current": 1 } }));
    }

    #[test]
    fn test_removing_missing_location_is_noop() {
        let mut root = json!({ "a": 1 });
        set(&mut root, &segs("b/c"), Value::Null);
        assert_eq!(root, json!({ "a": 1 }));
    }

    #[test]
    fn test_normalize_drops_empty_objects() {
        assert_eq!(normalize(json!({ "a": {}, "b": null })), None);
        assert_eq!(
            normalize(json!({ "a": { "b": 1 }, "c": {} })),
            Some(json!({ "a": { "b": 1 } }))
        );
    }

    #[test]
    fn test_leaves() {
        let value = json!({ "a": { "b": 1, "c": [1, 2] }, "d": "x" });
        let mut leaves = leaves(&value);
        leaves.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            leaves,
            vec![
                (segs("a/b"), json!(1)),
                (segs("a/c"), json!([1, 2])),
                (segs("d"), json!("x")),
            ]
        );
    }
}
