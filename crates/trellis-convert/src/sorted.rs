//! JSON maps with sorted keys

use std::cmp::Ordering;

use serde_json::{Map, Value as JsonValue};
use trellis_domain::Value;

use crate::error::ConvertError;
use crate::to_json::JsonWriter;

/// Serialize a map, or a node's properties, with keys sorted at every level
///
/// With `ignore_case` keys order by their lowercase form; keys equal
/// ignoring case stay distinct and order by their exact form.
///
/// # Examples
///
/// ```
/// use trellis_convert::to_sorted_json_map;
/// use trellis_domain::Value;
///
/// let map = Value::map([("b", Value::from(8)), ("C", Value::from(9)), ("a", Value::from(2))]);
/// assert_eq!(to_sorted_json_map(&map, true).unwrap(), r#"{"a":2,"b":8,"C":9}"#);
/// assert_eq!(to_sorted_json_map(&map, false).unwrap(), r#"{"C":9,"a":2,"b":8}"#);
/// ```
pub fn to_sorted_json_map(value: &Value, ignore_case: bool) -> Result<String, ConvertError> {
    let json = match value {
        Value::Map(_) => JsonWriter::new().write(value),
        Value::Node(node) => JsonWriter::new().write(&Value::Map(node.properties.clone())),
        _ => return Err(ConvertError::NotAMap),
    };
    Ok(sort_keys(json, ignore_case).to_string())
}

fn sort_keys(value: JsonValue, ignore_case: bool) -> JsonValue {
    match value {
        JsonValue::Object(map) => {
            let mut entries: Vec<(String, JsonValue)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| compare_keys(a, b, ignore_case));
            JsonValue::Object(
                entries
                    .into_iter()
                    .map(|(key, item)| (key, sort_keys(item, ignore_case)))
                    .collect::<Map<String, JsonValue>>(),
            )
        }
        JsonValue::Array(items) => {
            JsonValue::Array(items.into_iter().map(|item| sort_keys(item, ignore_case)).collect())
        }
        other => other,
    }
}

fn compare_keys(a: &str, b: &str, ignore_case: bool) -> Ordering {
    if ignore_case {
        a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
    } else {
        a.cmp(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_domain::{Node, NodeId};

    fn sample() -> Value {
        Value::map([
            ("b", Value::from(8)),
            ("d", Value::from(3)),
            ("a", Value::from(2)),
            ("E", Value::from(12)),
            ("C", Value::from(9)),
        ])
    }

    #[test]
    fn test_case_sensitive_order() {
        assert_eq!(
            to_sorted_json_map(&sample(), false).unwrap(),
            r#"{"C":9,"E":12,"a":2,"b":8,"d":3}"#
        );
    }

    #[test]
    fn test_case_insensitive_order() {
        assert_eq!(
            to_sorted_json_map(&sample(), true).unwrap(),
            r#"{"a":2,"b":8,"C":9,"d":3,"E":12}"#
        );
    }

    #[test]
    fn test_keys_equal_ignoring_case_are_kept() {
        let map = Value::map([("a", Value::from(1)), ("A", Value::from(2))]);
        assert_eq!(to_sorted_json_map(&map, true).unwrap(), r#"{"A":2,"a":1}"#);
    }

    #[test]
    fn test_nested_maps_sorted() {
        let map = Value::map([(
            "outer",
            Value::List(vec![Value::map([("z", Value::from(1)), ("Y", Value::from(2))])]),
        )]);
        assert_eq!(to_sorted_json_map(&map, true).unwrap(), r#"{"outer":[{"Y":2,"z":1}]}"#);
    }

    #[test]
    fn test_node_properties() {
        let node = Node::new(NodeId::new(1), "n1").with_property("b", 1).with_property("a", 2);
        assert_eq!(to_sorted_json_map(&Value::from(node), false).unwrap(), r#"{"a":2,"b":1}"#);
    }

    #[test]
    fn test_rejects_other_values() {
        let err = to_sorted_json_map(&Value::from(3), true).unwrap_err();
        assert_eq!(err.to_string(), "input value must be a Node or a map");
    }
}
