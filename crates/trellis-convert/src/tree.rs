//! Nested documents from collections of paths
//!
//! Every path is walked from its start node. Each relationship hangs a
//! map for the node on its far side into a list on the near node's map,
//! keyed by the relationship type; relationship properties are copied
//! into that child map as `<type>.<key>`. Paths sharing a prefix therefore
//! merge into one tree per start node.

use std::collections::HashMap;

use serde_json::{Map, Value as JsonValue};
use tracing::debug;
use trellis_domain::{Node, Path, Relationship};

use crate::config::{ConvertConfig, PropertyFilter};
use crate::error::ConvertError;
use crate::to_json::value_to_json;

/// Build one tree per distinct start node
///
/// An empty input yields a single empty map.
pub fn to_tree(
    paths: &[Path],
    lower_case_rels: bool,
    config: &ConvertConfig,
) -> Result<Vec<JsonValue>, ConvertError> {
    config.validate()?;
    if paths.is_empty() {
        return Ok(vec![JsonValue::Object(Map::new())]);
    }

    let mut ordered: Vec<&Path> = paths.iter().collect();
    if config.sort_paths {
        ordered.sort_by_key(|path| std::cmp::Reverse(path.length()));
    }

    let mut builder = TreeBuilder {
        config,
        lower_case_rels,
        arena: Vec::new(),
        current: HashMap::new(),
    };
    for path in &ordered {
        builder.add_path(path)?;
    }

    let mut roots: Vec<&str> = Vec::new();
    for path in &ordered {
        let start = path.start_node().element_id.as_str();
        if !roots.contains(&start) {
            roots.push(start);
        }
    }
    debug!(paths = paths.len(), trees = roots.len(), "Built trees");

    Ok(roots
        .into_iter()
        .map(|element_id| match builder.current.remove(element_id) {
            Some(index) => builder.materialize(index),
            None => JsonValue::Object(Map::new()),
        })
        .collect())
}

/// Entry of a map under construction
enum Entry {
    Value(JsonValue),
    Children(Vec<usize>),
}

#[derive(Default)]
struct TreeMap {
    entries: Vec<(String, Entry)>,
}

impl TreeMap {
    fn insert(&mut self, key: String, value: JsonValue) {
        self.entries.push((key, Entry::Value(value)));
    }

    fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, entry)| entry)
    }

    fn string(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(Entry::Value(JsonValue::String(s))) => Some(s),
            _ => None,
        }
    }

    fn children(&self, key: &str) -> &[usize] {
        match self.get(key) {
            Some(Entry::Children(children)) => children,
            _ => &[],
        }
    }

    /// Append to the child list under `key`; a scalar under that key is replaced
    fn push_child(&mut self, key: &str, index: usize) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, Entry::Children(children))) => children.push(index),
            Some((_, entry)) => *entry = Entry::Children(vec![index]),
            None => self.entries.push((key.to_string(), Entry::Children(vec![index]))),
        }
    }
}

struct TreeBuilder<'c> {
    config: &'c ConvertConfig,
    lower_case_rels: bool,
    arena: Vec<TreeMap>,
    /// Element id to the map new children of that node attach to
    current: HashMap<String, usize>,
}

impl<'c> TreeBuilder<'c> {
    fn add_path(&mut self, path: &Path) -> Result<(), ConvertError> {
        let nodes = path.nodes();
        for (i, rel) in path.relationships().iter().enumerate() {
            let (near, far) = (&nodes[i], &nodes[i + 1]);
            let parent = self.current_map(near)?;
            self.attach(parent, rel, far)?;
        }
        if path.length() == 0 {
            self.current_map(path.start_node())?;
        }
        Ok(())
    }

    fn current_map(&mut self, node: &Node) -> Result<usize, ConvertError> {
        if let Some(&index) = self.current.get(&node.element_id) {
            return Ok(index);
        }
        let index = self.node_map(node)?;
        self.current.insert(node.element_id.clone(), index);
        Ok(index)
    }

    fn node_map(&mut self, node: &Node) -> Result<usize, ConvertError> {
        let filter = self.config.node_filter(&node.labels)?;
        let mut map = TreeMap::default();
        map.insert("_id".to_string(), JsonValue::from(node.id.value()));
        map.insert("_elementId".to_string(), JsonValue::from(node.element_id.clone()));
        map.insert("_type".to_string(), JsonValue::from(node.label_string()));
        for (key, value) in &node.properties {
            if kept(filter.as_ref(), key) {
                map.insert(key.clone(), value_to_json(value));
            }
        }
        self.arena.push(map);
        Ok(self.arena.len() - 1)
    }

    fn attach(&mut self, parent: usize, rel: &Relationship, child: &Node) -> Result<(), ConvertError> {
        let key = if self.lower_case_rels {
            rel.rel_type.to_lowercase()
        } else {
            rel.rel_type.clone()
        };
        let rel_id_key = format!("{}._elementId", key);

        let duplicate = self.arena[parent].children(&key).iter().any(|&index| {
            let sibling = &self.arena[index];
            sibling.string("_elementId") == Some(child.element_id.as_str())
                && sibling.string(&rel_id_key) == Some(rel.element_id.as_str())
        });
        if duplicate {
            return Ok(());
        }

        let index = self.node_map(child)?;
        let filter = self.config.rel_filter(&rel.rel_type)?;
        let map = &mut self.arena[index];
        map.insert(format!("{}._id", key), JsonValue::from(rel.id.value()));
        map.insert(rel_id_key, JsonValue::from(rel.element_id.clone()));
        for (prop, value) in &rel.properties {
            if kept(filter.as_ref(), prop) {
                map.insert(format!("{}.{}", key, prop), value_to_json(value));
            }
        }

        self.arena[parent].push_child(&key, index);
        self.current.insert(child.element_id.clone(), index);
        Ok(())
    }

    fn materialize(&self, index: usize) -> JsonValue {
        let mut out = Map::new();
        for (key, entry) in &self.arena[index].entries {
            let value = match entry {
                Entry::Value(value) => value.clone(),
                Entry::Children(children) => {
                    JsonValue::Array(children.iter().map(|&child| self.materialize(child)).collect())
                }
            };
            out.insert(key.clone(), value);
        }
        JsonValue::Object(out)
    }
}

fn kept(filter: Option<&PropertyFilter>, key: &str) -> bool {
    filter.map_or(true, |filter| filter.keeps(key))
}
