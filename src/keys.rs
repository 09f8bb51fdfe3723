//! Conversion between nested translation documents and flat key maps.

use std::collections::HashMap;

use serde_json::{
    Map,
    Value,
};
use thiserror::Error;

use crate::types::{
    Language,
    Translation,
};

/// A flat key that cannot be placed into a nested document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnflattenError {
    /// The key needs to descend into a segment that already holds a string.
    #[error("Key '{key}' descends into '{segment}', which already holds a value")]
    LeafInPath {
        /// Full flat key being inserted
        key: String,
        /// Segment already occupied by a leaf
        segment: String,
    },
    /// The key would replace a nested object with a string.
    #[error("Key '{key}' would overwrite the nested object at '{segment}'")]
    ObjectAtLeaf {
        /// Full flat key being inserted
        key: String,
        /// Segment already occupied by an object
        segment: String,
    },
}

/// Flatten a nested JSON object into a separator-joined key map.
///
/// Only string leaves become translations. Numbers, booleans, null and
/// arrays are skipped.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use translation_store::keys::flatten;
///
/// let json = json!({
///     "common": {
///         "hello": "Hello",
///         "goodbye": "Goodbye"
///     }
/// });
///
/// let flattened = flatten(&json, ".", None);
/// assert_eq!(flattened.get("common.hello").map(|t| t.template.as_str()), Some("Hello"));
/// assert_eq!(flattened.get("common.goodbye").map(|t| t.template.as_str()), Some("Goodbye"));
/// ```
#[must_use]
pub fn flatten(json: &Value, separator: &str, prefix: Option<&str>) -> Language {
    let mut result = HashMap::new();
    if let Value::Object(map) = json {
        flatten_object(map, separator, prefix, &mut result);
    }
    result
}

/// Recursive step of [`flatten`] over a single object.
///
/// String leaves are collected before nested objects are merged, so a key
/// produced by recursion replaces a literal leaf with the same flat key.
/// Local keys that would yield empty segments are skipped.
fn flatten_object(
    map: &Map<String, Value>,
    separator: &str,
    prefix: Option<&str>,
    result: &mut Language,
) {
    let mut nested = Language::new();
    for (key, value) in map {
        let full_key = prefix.map_or_else(|| key.clone(), |p| format!("{p}{separator}{key}"));
        if !is_valid_key(key, separator) {
            tracing::warn!(key = %full_key, "Skipping key with an empty segment");
            continue;
        }
        match value {
            Value::String(template) => {
                result.insert(full_key.clone(), Translation::new(full_key, template.clone()));
            }
            Value::Object(child) => {
                flatten_object(child, separator, Some(&full_key), &mut nested);
            }
            _ => {
                tracing::trace!(key = %full_key, "Skipping unsupported value type");
            }
        }
    }
    result.extend(nested);
}

/// Re-nest a flat key map into a JSON object.
///
/// The result does not depend on the iteration order of `language`.
///
/// # Errors
/// Returns [`UnflattenError`] when one key is a prefix path of another
/// (e.g. `"a"` and `"a.b"`), since no document can hold both.
pub fn unflatten(language: &Language, separator: &str) -> Result<Value, UnflattenError> {
    let mut root = Map::new();
    for translation in language.values() {
        insert(&mut root, &translation.key, &translation.key, &translation.template, separator)?;
    }
    Ok(Value::Object(root))
}

/// Insert `rest -> value` into `target`, descending one segment per call.
fn insert(
    target: &mut Map<String, Value>,
    full_key: &str,
    rest: &str,
    value: &str,
    separator: &str,
) -> Result<(), UnflattenError> {
    let Some((head, tail)) = rest.split_once(separator) else {
        if matches!(target.get(rest), Some(Value::Object(_))) {
            return Err(UnflattenError::ObjectAtLeaf {
                key: full_key.to_string(),
                segment: rest.to_string(),
            });
        }
        target.insert(rest.to_string(), Value::String(value.to_string()));
        return Ok(());
    };

    let child = target.entry(head.to_string()).or_insert_with(|| Value::Object(Map::new()));
    let Value::Object(child) = child else {
        return Err(UnflattenError::LeafInPath {
            key: full_key.to_string(),
            segment: head.to_string(),
        });
    };
    insert(child, full_key, tail, value, separator)
}

/// Checks that `key` is a usable flat key: non-empty, with no empty segments.
#[must_use]
pub fn is_valid_key(key: &str, separator: &str) -> bool {
    !key.is_empty() && key.split(separator).all(|segment| !segment.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn language(entries: &[(&str, &str)]) -> Language {
        entries
            .iter()
            .map(|(key, value)| ((*key).to_string(), Translation::new(*key, *value)))
            .collect()
    }

    fn templates(language: &Language) -> HashMap<String, String> {
        language.iter().map(|(k, t)| (k.clone(), t.template.clone())).collect()
    }

    #[googletest::test]
    fn test_flatten_simple() {
        let json = json!({
            "hello": "Hello",
            "goodbye": "Goodbye"
        });

        let result = flatten(&json, ".", None);

        expect_that!(result.get("hello").map(|t| &t.template), some(eq(&"Hello".to_string())));
        expect_that!(result.get("goodbye").map(|t| &t.template), some(eq(&"Goodbye".to_string())));
        expect_that!(result.len(), eq(2));
    }

    #[googletest::test]
    fn test_flatten_nested() {
        let json = json!({"a": {"b": "x", "c": "y"}, "d": "z"});

        let result = flatten(&json, ".", None);

        assert_eq!(
            templates(&result),
            HashMap::from([
                ("a.b".to_string(), "x".to_string()),
                ("a.c".to_string(), "y".to_string()),
                ("d".to_string(), "z".to_string()),
            ])
        );
    }

    #[googletest::test]
    fn test_flatten_keeps_key_on_translation() {
        let json = json!({"PAGE": {"LOADING": "Loading..."}});

        let result = flatten(&json, ".", None);

        let translation = result.get("PAGE.LOADING");
        expect_that!(translation.map(|t| &t.key), some(eq(&"PAGE.LOADING".to_string())));
    }

    #[googletest::test]
    fn test_flatten_deep_nested() {
        let json = json!({
            "a": {
                "b": {
                    "c": "Deep value"
                }
            }
        });

        let result = flatten(&json, ".", None);

        expect_that!(result.get("a.b.c").map(|t| &t.template), some(eq(&"Deep value".to_string())));
        expect_that!(result.len(), eq(1));
    }

    #[googletest::test]
    fn test_flatten_custom_separator() {
        let json = json!({
            "common": {
                "hello": "Hello"
            }
        });

        let result = flatten(&json, "_", None);

        expect_that!(result.contains_key("common_hello"), eq(true));
    }

    #[googletest::test]
    fn test_flatten_with_prefix() {
        let json = json!({"hello": "Hello"});

        let result = flatten(&json, ".", Some("common"));

        expect_that!(result.contains_key("common.hello"), eq(true));
    }

    #[googletest::test]
    fn test_flatten_skips_unsupported_values() {
        let json = json!({
            "number": 42,
            "boolean": true,
            "null": null,
            "items": ["apple", "banana"],
            "kept": "yes"
        });

        let result = flatten(&json, ".", None);

        expect_that!(result.len(), eq(1));
        expect_that!(result.contains_key("kept"), eq(true));
    }

    #[googletest::test]
    fn test_flatten_non_object_root() {
        expect_that!(flatten(&json!("text"), ".", None).is_empty(), eq(true));
        expect_that!(flatten(&json!([1, 2]), ".", None).is_empty(), eq(true));
    }

    #[googletest::test]
    fn test_flatten_nested_key_wins_over_literal() {
        let json = json!({"a": {"b": "nested"}, "a.b": "literal"});

        let result = flatten(&json, ".", None);

        expect_that!(result.get("a.b").map(|t| t.template.as_str()), some(eq("nested")));
        expect_that!(result.len(), eq(1));
    }

    #[googletest::test]
    fn test_flatten_literal_dotted_key_without_collision() {
        let json = json!({"a.b": "literal", "c": {"d": "nested"}});

        let result = flatten(&json, ".", None);

        expect_that!(result.get("a.b").map(|t| t.template.as_str()), some(eq("literal")));
        expect_that!(result.get("c.d").map(|t| t.template.as_str()), some(eq("nested")));
    }

    #[rstest]
    #[case::empty_root_key(json!({"": "y", "ok": "v"}))]
    #[case::empty_nested_key(json!({"a": {"": "x"}, "ok": "v"}))]
    #[case::empty_object_key(json!({"": {"b": "x"}, "ok": "v"}))]
    #[case::trailing_separator(json!({"a.": "x", "ok": "v"}))]
    #[case::doubled_separator(json!({"a": {"b..c": "x"}, "ok": "v"}))]
    fn test_flatten_skips_empty_segments(#[case] tree: Value) {
        let result = flatten(&tree, ".", None);

        let keys: Vec<&String> = result.keys().collect();
        assert_eq!(keys, vec!["ok"]);
        assert!(result.keys().all(|key| is_valid_key(key, ".")));
    }

    #[googletest::test]
    fn test_unflatten_nested() {
        let flat = language(&[("a.b", "x"), ("a.c", "y"), ("d", "z")]);

        let result = unflatten(&flat, ".").unwrap();

        assert_eq!(result, json!({"a": {"b": "x", "c": "y"}, "d": "z"}));
    }

    #[googletest::test]
    fn test_unflatten_empty() {
        let result = unflatten(&Language::new(), ".").unwrap();

        assert_eq!(result, json!({}));
    }

    #[rstest]
    #[case::flat(json!({"hello": "Hello", "bye": "Bye"}))]
    #[case::nested(json!({"PAGE": {"LOADING": "Loading", "TITLE": "Title"}, "OK": "Ok"}))]
    #[case::deep(json!({"a": {"b": {"c": {"d": "deep"}}, "e": "shallow"}}))]
    #[case::empty(json!({}))]
    fn test_round_trip(#[case] tree: Value) {
        let flat = flatten(&tree, ".", None);
        let rebuilt = unflatten(&flat, ".").unwrap();

        assert_eq!(rebuilt, tree);
        assert_eq!(templates(&flatten(&rebuilt, ".", None)), templates(&flat));
    }

    #[rstest]
    #[case::leaf_then_child(&[("a", "leaf")], "a.b")]
    #[case::child_then_leaf(&[("a.b", "child")], "a")]
    #[case::deep_leaf_in_path(&[("a.b", "leaf")], "a.b.c")]
    fn test_unflatten_conflict(#[case] existing: &[(&str, &str)], #[case] conflicting: &str) {
        let mut root = Map::new();
        for (key, value) in existing {
            insert(&mut root, key, key, value, ".").unwrap();
        }

        let result = insert(&mut root, conflicting, conflicting, "value", ".");

        assert_that!(result, err(anything()));
    }

    #[googletest::test]
    fn test_unflatten_conflict_in_any_order() {
        let flat = language(&[("a", "leaf"), ("a.b", "child")]);

        let result = unflatten(&flat, ".");

        expect_that!(result.map_err(|e| e.to_string()), err(contains_substring("'a'")));
    }

    #[rstest]
    #[case("PAGE.LOADING", true)]
    #[case("single", true)]
    #[case("", false)]
    #[case(".leading", false)]
    #[case("trailing.", false)]
    #[case("double..dot", false)]
    fn test_is_valid_key(#[case] key: &str, #[case] expected: bool) {
        assert_eq!(is_valid_key(key, "."), expected);
    }
}
