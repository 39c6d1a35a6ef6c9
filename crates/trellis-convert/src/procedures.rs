//! Conversion entry points
//!
//! Thin functions over the lenient reader, [`JsonPath`], [`JsonWriter`]
//! and the tree builder, shaped the way a query procedure exposes them:
//! JSON text in, values out.

use std::fmt::Display;

use serde_json::Value as JsonValue;
use tracing::debug;
use trellis_domain::{GraphStore, Node, NodeId, NodeResolver, Value};

use crate::config::{PathOption, PathOptions};
use crate::error::ConvertError;
use crate::json_path::JsonPath;
use crate::lenient;
use crate::to_json::JsonWriter;

/// Parse JSON text and extract with an optional path
///
/// Empty text reads as `null`. A missing path, `""` or `"$"` returns the
/// whole document and ignores the options.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use trellis_convert::json_path;
///
/// let doc = r#"{"columns":{"col2":{"_id":"772col2"}}}"#;
/// assert_eq!(json_path(doc, Some("$..columns"), Some(&["AS_PATH_LIST"][..])).unwrap(), json!(["$['columns']"]));
/// assert_eq!(json_path("{a:[1,2,3]}", None, None::<&[&str]>).unwrap(), json!({"a": [1, 2, 3]}));
/// ```
pub fn json_path<S: AsRef<str>>(
    json: &str,
    path: Option<&str>,
    options: Option<&[S]>,
) -> Result<JsonValue, ConvertError> {
    let options = PathOptions::parse(options)?;
    extract(json, path, &options)
}

fn extract(json: &str, path: Option<&str>, options: &PathOptions) -> Result<JsonValue, ConvertError> {
    if json.trim().is_empty() {
        return Ok(JsonValue::Null);
    }
    let document = lenient::parse(json)?;
    match path.map(str::trim) {
        None | Some("") | Some("$") => Ok(document),
        Some(expression) => JsonPath::compile(expression)?.read(&document, options),
    }
}

/// As [`json_path`], wrapping a single non-list result in a list
///
/// `null` stays `null`.
pub fn from_json_list<S: AsRef<str>>(
    json: &str,
    path: Option<&str>,
    options: Option<&[S]>,
) -> Result<JsonValue, ConvertError> {
    Ok(into_list(json_path(json, path, options)?))
}

fn into_list(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Null | JsonValue::Array(_) => value,
        other => JsonValue::Array(vec![other]),
    }
}

/// As [`json_path`], requiring a map result
pub fn from_json_map<S: AsRef<str>>(
    json: &str,
    path: Option<&str>,
    options: Option<&[S]>,
) -> Result<JsonValue, ConvertError> {
    let options = PathOptions::parse(options)?;
    if options.contains(PathOption::AlwaysReturnList) {
        return Err(ConvertError::AlwaysReturnListForMap);
    }
    into_map(extract(json, path, &options)?)
}

fn into_map(value: JsonValue) -> Result<JsonValue, ConvertError> {
    match value {
        JsonValue::Null | JsonValue::Object(_) => Ok(value),
        other => Err(ConvertError::TypeMismatch {
            expected: "map",
            found: json_type(&other),
        }),
    }
}

fn json_type(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "list",
        JsonValue::Object(_) => "map",
    }
}

/// JSON text held by a node property
///
/// A string property is taken as JSON text; any other value is
/// serialized first.
fn property_json(node: &Node, key: &str) -> Option<String> {
    match node.property(key)? {
        Value::String(text) => Some(text.clone()),
        other => Some(JsonWriter::new().write(other).to_string()),
    }
}

/// Extract from a JSON node property; a missing property yields `null`
pub fn get_json_property<S: AsRef<str>>(
    node: &Node,
    key: &str,
    path: Option<&str>,
    options: Option<&[S]>,
) -> Result<JsonValue, ConvertError> {
    match property_json(node, key) {
        Some(json) => json_path(&json, path, options),
        None => Ok(JsonValue::Null),
    }
}

/// As [`get_json_property`], requiring a map result
pub fn get_json_property_map<S: AsRef<str>>(
    node: &Node,
    key: &str,
    path: Option<&str>,
    options: Option<&[S]>,
) -> Result<JsonValue, ConvertError> {
    match property_json(node, key) {
        Some(json) => from_json_map(&json, path, options),
        None => {
            // options are still validated
            from_json_map("", None, options)
        }
    }
}

/// Store `value` as JSON text in a node property
///
/// Relationship endpoints in `value` are resolved through the store.
pub fn set_json_property<S>(
    store: &mut S,
    node: NodeId,
    key: &str,
    value: &Value,
) -> Result<Node, ConvertError>
where
    S: GraphStore + NodeResolver,
    S::Error: Display,
{
    let json = to_json_with(value, &*store);
    debug!(node = node.value(), key, "Setting JSON property");
    store
        .set_node_property(node, key, Value::String(json))
        .map_err(|e| ConvertError::Store(e.to_string()))
}

/// Serialize a value to JSON text
///
/// Endpoints of relationships outside a path serialize as bare
/// `{"id", "type": "node"}` objects; see [`to_json_with`].
///
/// # Examples
///
/// ```
/// use trellis_convert::to_json;
/// use trellis_domain::Value;
///
/// let list = Value::List(vec![Value::from(1), Value::from(2), Value::from(3)]);
/// assert_eq!(to_json(&list), "[1,2,3]");
/// ```
pub fn to_json(value: &Value) -> String {
    JsonWriter::new().write(value).to_string()
}

/// Serialize a value to JSON text, looking up relationship endpoints in `resolver`
pub fn to_json_with(value: &Value, resolver: &dyn NodeResolver) -> String {
    JsonWriter::with_resolver(resolver).write(value).to_string()
}

/// Read a parsed JSON document back as a graph value
///
/// Integral numbers become integers, other numbers floats; objects become
/// maps. Nothing is inferred from strings.
pub fn json_to_value(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Array(items) => Value::List(items.iter().map(json_to_value).collect()),
        JsonValue::Object(map) => Value::map(map.iter().map(|(k, v)| (k.clone(), json_to_value(v)))),
    }
}
