//! Layered configuration merge
//!
//! Layers are merged lowest precedence first: built-in defaults, then the toolkit's
//! `config/defaults.*`, then the project's `aikit.*`.
//!
//! - Objects: deep-merge by key
//! - Arrays: replace (the overriding array wins entirely)
//! - Scalars and type changes: override
//! - `null`: overrides, so a project can clear a default
//!
//! Neither input is modified; the merged document is a fresh value.

use serde_json::Value;

/// Deep merge `overrides` onto `defaults`.
///
/// Keys absent from `overrides` keep their default. A non-object `overrides` replaces
/// `defaults` entirely, so a top-level `null` yields `null`.
///
/// # Examples
///
/// ```rust
/// use aikit_cli::config::merge::deep_merge;
/// use serde_json::json;
///
/// let defaults = json!({"standards": {"indentation": 4, "lineLength": 120}});
/// let overrides = json!({"standards": {"indentation": 2}});
///
/// let merged = deep_merge(&defaults, &overrides);
/// assert_eq!(merged, json!({"standards": {"indentation": 2, "lineLength": 120}}));
/// ```
#[must_use]
pub fn deep_merge(defaults: &Value, overrides: &Value) -> Value {
    match (defaults, overrides) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            let mut merged = base_map.clone();
            for (key, overlay_value) in overlay_map {
                let value = match (merged.get(key), overlay_value) {
                    (Some(base_value @ Value::Object(_)), Value::Object(_)) => {
                        deep_merge(base_value, overlay_value)
                    }
                    _ => overlay_value.clone(),
                };
                merged.insert(key.clone(), value);
            }
            Value::Object(merged)
        }

        // Arrays, scalars, null and type changes: overlay wins
        (_, overlay) => overlay.clone(),
    }
}

/// Merge layers in order (first is the base, last has highest precedence).
///
/// An empty slice yields an empty object.
#[must_use]
pub fn merge_layers(layers: &[Value]) -> Value {
    match layers.split_first() {
        Some((first, rest)) => rest.iter().fold(first.clone(), |acc, layer| deep_merge(&acc, layer)),
        None => Value::Object(serde_json::Map::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_override() {
        let merged = deep_merge(&json!({"standards": {"lineLength": 120}}), &json!({"standards": {"lineLength": 100}}));
        assert_eq!(merged["standards"]["lineLength"], 100);
    }

    #[test]
    fn test_object_deep_merge_keeps_untouched_keys() {
        let defaults = json!({"paths": {"css": "src/css", "public": "web"}});
        let overrides = json!({"paths": {"css": "assets/css"}});

        let merged = deep_merge(&defaults, &overrides);

        assert_eq!(merged["paths"]["css"], "assets/css");
        assert_eq!(merged["paths"]["public"], "web");
    }

    #[test]
    fn test_array_replace_not_concatenate() {
        let merged = deep_merge(&json!({"modules": ["a", "b"]}), &json!({"modules": ["c"]}));
        assert_eq!(merged["modules"], json!(["c"]));
    }

    #[test]
    fn test_null_overrides() {
        let merged = deep_merge(&json!({"context": "RULES.md"}), &json!({"context": null}));
        assert_eq!(merged["context"], Value::Null);
    }

    #[test]
    fn test_type_change_replaces() {
        let merged = deep_merge(&json!({"framework": false}), &json!({"framework": {"doctrine": true}}));
        assert_eq!(merged["framework"], json!({"doctrine": true}));

        let merged = deep_merge(&json!({"editors": {"claude": true}}), &json!({"editors": ["cursor"]}));
        assert_eq!(merged["editors"], json!(["cursor"]));
    }

    #[test]
    fn test_non_object_override_replaces_whole_document() {
        assert_eq!(deep_merge(&json!({"a": 1}), &json!(null)), Value::Null);
        assert_eq!(deep_merge(&json!({"a": 1}), &json!([1, 2])), json!([1, 2]));
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let defaults = json!({"a": {"b": 1}});
        let overrides = json!({"a": {"c": 2}});
        let before = (defaults.clone(), overrides.clone());

        let _ = deep_merge(&defaults, &overrides);

        assert_eq!((defaults, overrides), before);
    }

    #[test]
    fn test_precedence_overrides_win_at_every_leaf() {
        let defaults = json!({"x": {"y": {"z": 1, "w": 2}}, "k": "d"});
        let overrides = json!({"x": {"y": {"z": 10}}, "k": "o"});

        let merged = deep_merge(&defaults, &overrides);

        assert_eq!(merged, json!({"x": {"y": {"z": 10, "w": 2}}, "k": "o"}));
    }

    #[test]
    fn test_merge_layers_order() {
        let merged = merge_layers(&[
            json!({"project": {"type": "web"}, "standards": {"indentation": 4}}),
            json!({"standards": {"indentation": 2, "lineLength": 100}}),
            json!({"standards": {"lineLength": 80}}),
        ]);

        assert_eq!(merged["project"]["type"], "web");
        assert_eq!(merged["standards"]["indentation"], 2);
        assert_eq!(merged["standards"]["lineLength"], 80);
    }

    #[test]
    fn test_merge_layers_empty() {
        assert_eq!(merge_layers(&[]), json!({}));
    }
}
