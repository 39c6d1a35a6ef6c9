//! Trellis Convert
//!
//! Conversions between property-graph values and JSON.
//!
//! # Overview
//!
//! Graph queries produce nodes, relationships, paths and plain values;
//! applications want JSON. This crate serializes graph values to JSON
//! with call-local ids, reads (lenient) JSON back and extracts from it
//! with JSONPath, and folds collections of paths into nested documents.
//!
//! # Architecture
//!
//! ```text
//! JSON text ─► lenient ─► serde_json::Value ─► JsonPath ─► value | list | paths
//! Value ─► JsonWriter ─► JSON text
//! [Path] ─► to_tree ─► [nested map]
//! ```
//!
//! # Key Features
//!
//! - **JSONPath**: deep scans, filters, slices and the five path options
//! - **Lenient JSON**: unquoted keys, single quotes and comments
//! - **Stable ids**: nodes and relationships numbered per call
//! - **Tree reconstruction**: per-label and per-type property filters
//!
//! # Example Usage
//!
//! ```
//! use serde_json::json;
//! use trellis_convert::{from_json_map, to_json};
//! use trellis_domain::Value;
//!
//! let doc = r#"{"columns":{"col2":{"_id":"772col2"}}}"#;
//! let map = from_json_map(doc, Some("$.columns.col2"), None::<&[&str]>).unwrap();
//! assert_eq!(map, json!({"_id": "772col2"}));
//!
//! let value = Value::map([("a", Value::from(42)), ("b", Value::from("foo"))]);
//! assert_eq!(to_json(&value), r#"{"a":42,"b":"foo"}"#);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
pub mod json_path;
pub mod lenient;
mod procedures;
mod sorted;
mod to_json;
mod tree;

#[cfg(test)]
mod tests;

pub use config::{ConvertConfig, PathOption, PathOptions, PropertyFilter};
pub use error::{
    ConvertError, ALWAYS_RETURN_LIST_MAP_MESSAGE, MIXED_FILTER_MESSAGE, PATH_OPTIONS_ERROR_MESSAGE,
};
pub use json_path::{JsonPath, Match};
pub use procedures::{
    from_json_list, from_json_map, get_json_property, get_json_property_map, json_path,
    json_to_value, set_json_property, to_json, to_json_with,
};
pub use sorted::to_sorted_json_map;
pub use to_json::{value_to_json, JsonWriter};
pub use tree::to_tree;
