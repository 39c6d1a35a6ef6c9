//! Graph values to JSON
//!
//! Nodes and relationships are written with call-local sequence ids
//! (`"0"`, `"1"`, ...) instead of store ids. The two kinds have separate
//! sequences; an entity keeps the id it got on first encounter for the
//! rest of the call, so a node shared by two paths serializes identically
//! in both.

use std::collections::HashMap;

use serde_json::{Map, Number, Value as JsonValue};
use trellis_domain::temporal::{format_date, format_date_time, format_local_date_time, format_local_time};
use trellis_domain::{Node, NodeId, NodeResolver, Path, Point, RelId, Relationship, Value};

/// Serializer for one conversion call
///
/// Holds the id sequences; create a new writer per call.
///
/// # Examples
///
/// ```
/// use trellis_convert::JsonWriter;
/// use trellis_domain::{Node, NodeId, Value};
///
/// let node = Node::new(NodeId::new(42), "n42").with_labels(["Test"]).with_property("foo", 7);
/// let json = JsonWriter::new().write(&Value::from(node));
/// assert_eq!(json.to_string(), r#"{"id":"0","type":"node","labels":["Test"],"properties":{"foo":7}}"#);
/// ```
#[derive(Default)]
pub struct JsonWriter<'r> {
    resolver: Option<&'r dyn NodeResolver>,
    node_ids: HashMap<NodeId, usize>,
    rel_ids: HashMap<RelId, usize>,
    seen: HashMap<NodeId, Node>,
}

impl<'r> JsonWriter<'r> {
    /// Writer without endpoint lookup
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer that resolves endpoints of bare relationships through `resolver`
    pub fn with_resolver(resolver: &'r dyn NodeResolver) -> Self {
        Self {
            resolver: Some(resolver),
            ..Self::default()
        }
    }

    /// Convert a value
    pub fn write(&mut self, value: &Value) -> JsonValue {
        match value {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Integer(i) => JsonValue::from(*i),
            Value::Float(f) => float(*f),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Bytes(bytes) => JsonValue::Array(bytes.iter().map(|b| JsonValue::from(*b)).collect()),
            Value::List(items) => JsonValue::Array(items.iter().map(|item| self.write(item)).collect()),
            Value::Map(map) => JsonValue::Object(
                map.iter()
                    .map(|(key, item)| (key.clone(), self.write(item)))
                    .collect(),
            ),
            Value::Date(date) => JsonValue::String(format_date(date)),
            Value::LocalTime(time) => JsonValue::String(format_local_time(time)),
            Value::Time(time) => JsonValue::String(time.to_string()),
            Value::LocalDateTime(value) => JsonValue::String(format_local_date_time(value)),
            Value::DateTime(value) => JsonValue::String(format_date_time(value)),
            Value::Duration(duration) => JsonValue::String(duration.to_string()),
            Value::Point(point) => point_json(point),
            Value::Node(node) => self.node(node),
            Value::Relationship(rel) => self.bare_relationship(rel),
            Value::Path(path) => self.path(path),
        }
    }

    fn node_id(&mut self, id: NodeId) -> String {
        let next = self.node_ids.len();
        self.node_ids.entry(id).or_insert(next).to_string()
    }

    fn rel_id(&mut self, id: RelId) -> String {
        let next = self.rel_ids.len();
        self.rel_ids.entry(id).or_insert(next).to_string()
    }

    fn node(&mut self, node: &Node) -> JsonValue {
        let mut out = Map::new();
        out.insert("id".to_string(), JsonValue::String(self.node_id(node.id)));
        out.insert("type".to_string(), JsonValue::from("node"));
        if !node.labels.is_empty() {
            out.insert("labels".to_string(), JsonValue::from(node.labels.clone()));
        }
        if !node.properties.is_empty() {
            let properties = self.write_map(&node.properties);
            out.insert("properties".to_string(), properties);
        }
        self.seen.entry(node.id).or_insert_with(|| node.clone());
        JsonValue::Object(out)
    }

    fn write_map(&mut self, map: &trellis_domain::Properties) -> JsonValue {
        JsonValue::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), self.write(item)))
                .collect(),
        )
    }

    /// Endpoint known only by id
    fn placeholder(&mut self, id: NodeId) -> JsonValue {
        let mut out = Map::new();
        out.insert("id".to_string(), JsonValue::String(self.node_id(id)));
        out.insert("type".to_string(), JsonValue::from("node"));
        JsonValue::Object(out)
    }

    fn endpoint(&mut self, id: NodeId, known: Option<&Node>) -> JsonValue {
        let found = known
            .cloned()
            .or_else(|| self.seen.get(&id).cloned())
            .or_else(|| self.resolver.and_then(|resolver| resolver.resolve_node(id)));
        match found {
            Some(node) => self.node(&node),
            None => self.placeholder(id),
        }
    }

    fn relationship(&mut self, rel: &Relationship, start: Option<&Node>, end: Option<&Node>) -> JsonValue {
        let mut out = Map::new();
        out.insert("id".to_string(), JsonValue::String(self.rel_id(rel.id)));
        out.insert("type".to_string(), JsonValue::from("relationship"));
        out.insert("label".to_string(), JsonValue::String(rel.rel_type.clone()));
        let start = self.endpoint(rel.start, start);
        out.insert("start".to_string(), start);
        let end = self.endpoint(rel.end, end);
        out.insert("end".to_string(), end);
        if !rel.properties.is_empty() {
            let properties = self.write_map(&rel.properties);
            out.insert("properties".to_string(), properties);
        }
        JsonValue::Object(out)
    }

    fn bare_relationship(&mut self, rel: &Relationship) -> JsonValue {
        self.relationship(rel, None, None)
    }

    fn path(&mut self, path: &Path) -> JsonValue {
        let nodes = path.nodes();
        let find = |id: NodeId| nodes.iter().find(|node| node.id == id);

        let mut out = Vec::with_capacity(nodes.len() + path.relationships().len());
        out.push(self.node(path.start_node()));
        for (rel, next) in path.relationships().iter().zip(nodes.iter().skip(1)) {
            out.push(self.relationship(rel, find(rel.start), find(rel.end)));
            out.push(self.node(next));
        }
        JsonValue::Array(out)
    }
}

/// Convert a value with a fresh writer
pub fn value_to_json(value: &Value) -> JsonValue {
    JsonWriter::new().write(value)
}

/// Non-finite floats have no JSON number form and become strings
fn float(value: f64) -> JsonValue {
    match Number::from_f64(value) {
        Some(number) => JsonValue::Number(number),
        None if value.is_nan() => JsonValue::from("NaN"),
        None if value > 0.0 => JsonValue::from("Infinity"),
        None => JsonValue::from("-Infinity"),
    }
}

fn point_json(point: &Point) -> JsonValue {
    let crs = point.crs();
    let mut out = Map::new();
    out.insert("crs".to_string(), JsonValue::from(crs.name()));
    if crs.is_geographic() {
        out.insert("latitude".to_string(), float(point.y()));
        out.insert("longitude".to_string(), float(point.x()));
        if let Some(height) = point.z() {
            out.insert("height".to_string(), float(height));
        }
    } else {
        out.insert("x".to_string(), float(point.x()));
        out.insert("y".to_string(), float(point.y()));
        if let Some(z) = point.z() {
            out.insert("z".to_string(), float(z));
        }
    }
    JsonValue::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;
    use trellis_domain::{Crs, Duration};

    fn node(id: i64, labels: &[&str]) -> Node {
        Node::new(NodeId::new(id), format!("n{}", id)).with_labels(labels.iter().copied())
    }

    #[test]
    fn test_scalars_and_nulls() {
        let value = Value::map([
            ("a", Value::Null),
            ("b", Value::from("myString")),
            ("c", Value::List(vec![Value::from(1), Value::from("2"), Value::Null])),
        ]);
        assert_eq!(value_to_json(&value), json!({"a": null, "b": "myString", "c": [1, "2", null]}));
    }

    #[test]
    fn test_non_finite_floats() {
        let value = Value::List(vec![
            Value::Float(f64::NAN),
            Value::Float(f64::INFINITY),
            Value::Float(f64::NEG_INFINITY),
            Value::Float(1.5),
        ]);
        assert_eq!(value_to_json(&value), json!(["NaN", "Infinity", "-Infinity", 1.5]));
    }

    #[test]
    fn test_bytes_and_points() {
        assert_eq!(value_to_json(&Value::Bytes(vec![0, 255])), json!([0, 255]));
        assert_eq!(
            value_to_json(&Value::Point(Point::wgs84_3d(56.7, 12.78, 1.1))),
            json!({"crs": "wgs-84-3d", "latitude": 12.78, "longitude": 56.7, "height": 1.1})
        );
        let cartesian = Point::new(Crs::Cartesian, 1.0, 2.0, None).unwrap();
        assert_eq!(value_to_json(&Value::Point(cartesian)), json!({"crs": "cartesian", "x": 1.0, "y": 2.0}));
    }

    #[test]
    fn test_ids_follow_first_encounter() {
        let a = node(40, &["Test"]);
        let b = node(7, &[]);
        let value = Value::List(vec![a.clone().into(), b.into(), a.into()]);
        let json = value_to_json(&value);
        assert_eq!(json[0]["id"], "0");
        assert_eq!(json[1]["id"], "1");
        assert_eq!(json[2]["id"], "0");
        assert!(json[1].get("labels").is_none());
        assert!(json[1].get("properties").is_none());
    }

    #[test]
    fn test_bare_relationship_endpoints() {
        let start = node(1, &["User"]).with_property("name", "Adam");
        let rel = Relationship::new(RelId::new(9), "r9", "KNOWS", NodeId::new(1), NodeId::new(2))
            .with_property("bffSince", Duration::new(5, 1, 43200, 0));

        let mut resolver = BTreeMap::new();
        resolver.insert(start.id, start);

        let json = JsonWriter::with_resolver(&resolver).write(&Value::from(rel));
        assert_eq!(json["id"], "0");
        assert_eq!(json["label"], "KNOWS");
        assert_eq!(json["start"], json!({"id": "0", "type": "node", "labels": ["User"], "properties": {"name": "Adam"}}));
        assert_eq!(json["end"], json!({"id": "1", "type": "node"}));
        assert_eq!(json["properties"], json!({"bffSince": "P5M1DT12H"}));
    }

    #[test]
    fn test_path_against_traversal_direction() {
        let a = node(10, &["Test"]);
        let b = node(11, &["Baz"]);
        let c = node(12, &["Bar"]);
        let ab = Relationship::new(RelId::new(1), "r1", "TEST", a.id, b.id);
        let cb = Relationship::new(RelId::new(2), "r2", "TEST_2", c.id, b.id);
        let path = Path::new(vec![a, b, c], vec![ab, cb]).unwrap();

        let json = value_to_json(&Value::from(path));
        let list = json.as_array().unwrap();
        assert_eq!(list.len(), 5);
        assert_eq!(list[3]["start"]["id"], "2");
        assert_eq!(list[3]["end"]["id"], "1");
        assert_eq!(list[4]["id"], "2");
    }
}
