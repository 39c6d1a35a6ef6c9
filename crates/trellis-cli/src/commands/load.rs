//! Load command implementation.

use crate::cli::LoadArgs;
use crate::commands::{open_store, read_input};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use tracing::debug;
use trellis_convert::{json_to_value, lenient};
use trellis_domain::{GraphStore, NodeId, Properties};

/// Execute the load command.
pub fn execute_load(args: LoadArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let document: GraphDocument = serde_json::from_value(lenient::parse(&read_input(&args.input)?)?)?;

    let mut store = open_store(config)?;
    if args.replace {
        store.clear()?;
    }
    let (nodes, rels) = load_document(&mut store, &document)?;

    println!(
        "{}",
        formatter.success(&format!("Loaded {} node(s) and {} relationship(s)", nodes, rels))
    );
    Ok(())
}

/// Nodes and relationships to load.
///
/// Relationships name their endpoints by the `key` given to a node in the
/// same document.
#[derive(Debug, Default, Deserialize)]
pub struct GraphDocument {
    /// Nodes
    #[serde(default)]
    pub nodes: Vec<NodeDefinition>,

    /// Relationships
    #[serde(default, alias = "rels")]
    pub relationships: Vec<RelationshipDefinition>,
}

/// Node entry of a [`GraphDocument`].
#[derive(Debug, Deserialize)]
pub struct NodeDefinition {
    /// Document-local name used by relationships
    pub key: String,

    /// Labels
    #[serde(default)]
    pub labels: Vec<String>,

    /// Properties
    #[serde(default)]
    pub properties: Map<String, JsonValue>,
}

/// Relationship entry of a [`GraphDocument`].
#[derive(Debug, Deserialize)]
pub struct RelationshipDefinition {
    /// Key of the start node
    pub start: String,

    /// Key of the end node
    pub end: String,

    /// Relationship type
    #[serde(rename = "type")]
    pub rel_type: String,

    /// Properties
    #[serde(default)]
    pub properties: Map<String, JsonValue>,
}

/// Create everything a document describes; returns the node and relationship counts.
pub fn load_document<S>(store: &mut S, document: &GraphDocument) -> Result<(usize, usize)>
where
    S: GraphStore,
    CliError: From<S::Error>,
{
    let mut ids: HashMap<&str, NodeId> = HashMap::new();
    for def in &document.nodes {
        if ids.contains_key(def.key.as_str()) {
            return Err(CliError::InvalidInput(format!("Duplicate node key '{}'", def.key)));
        }
        let labels: Vec<&str> = def.labels.iter().map(String::as_str).collect();
        let node = store.create_node(&labels, properties(&def.properties))?;
        ids.insert(def.key.as_str(), node.id);
    }

    for def in &document.relationships {
        let endpoint = |key: &str| {
            ids.get(key)
                .copied()
                .ok_or_else(|| CliError::InvalidInput(format!("Unknown node key '{}'", key)))
        };
        let (start, end) = (endpoint(def.start.as_str())?, endpoint(def.end.as_str())?);
        store.create_relationship(start, end, &def.rel_type, properties(&def.properties))?;
    }

    debug!(
        nodes = document.nodes.len(),
        relationships = document.relationships.len(),
        "document loaded"
    );
    Ok((document.nodes.len(), document.relationships.len()))
}

fn properties(map: &Map<String, JsonValue>) -> Properties {
    map.iter().map(|(key, value)| (key.clone(), json_to_value(value))).collect()
}
