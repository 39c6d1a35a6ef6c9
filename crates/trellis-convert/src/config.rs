//! Configuration for conversions

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

/// Options controlling JSONPath evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PathOption {
    /// A missing leaf property evaluates to `null`
    DefaultPathLeafToNull,
    /// Definite paths also return a list
    AlwaysReturnList,
    /// Return normalized paths instead of values
    AsPathList,
    /// Evaluation errors yield `null` or `[]`
    SuppressExceptions,
    /// Missing properties in indefinite paths are errors
    RequireProperties,
}

impl PathOption {
    /// Every option, in documentation order
    pub const ALL: [PathOption; 5] = [
        PathOption::DefaultPathLeafToNull,
        PathOption::AlwaysReturnList,
        PathOption::AsPathList,
        PathOption::SuppressExceptions,
        PathOption::RequireProperties,
    ];

    /// Option name as accepted by [`PathOptions::parse`]
    pub fn name(&self) -> &'static str {
        match self {
            PathOption::DefaultPathLeafToNull => "DEFAULT_PATH_LEAF_TO_NULL",
            PathOption::AlwaysReturnList => "ALWAYS_RETURN_LIST",
            PathOption::AsPathList => "AS_PATH_LIST",
            PathOption::SuppressExceptions => "SUPPRESS_EXCEPTIONS",
            PathOption::RequireProperties => "REQUIRE_PROPERTIES",
        }
    }
}

impl FromStr for PathOption {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PathOption::ALL
            .into_iter()
            .find(|option| option.name() == s)
            .ok_or(ConvertError::InvalidPathOptions)
    }
}

impl fmt::Display for PathOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of [`PathOption`]s
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathOptions {
    options: Vec<PathOption>,
}

impl PathOptions {
    /// No options at all
    pub fn none() -> Self {
        Self::default()
    }

    /// The options used when the caller passes none:
    /// `DEFAULT_PATH_LEAF_TO_NULL` and `SUPPRESS_EXCEPTIONS`
    pub fn defaults() -> Self {
        Self::from_iter([PathOption::DefaultPathLeafToNull, PathOption::SuppressExceptions])
    }

    /// Resolve caller-supplied option names
    ///
    /// `None` selects the defaults; an empty list selects no options.
    ///
    /// # Examples
    ///
    /// ```
    /// use trellis_convert::{PathOption, PathOptions};
    ///
    /// let options = PathOptions::parse(Some(&["AS_PATH_LIST"][..])).unwrap();
    /// assert!(options.contains(PathOption::AsPathList));
    /// assert!(!options.contains(PathOption::SuppressExceptions));
    ///
    /// assert!(PathOptions::parse(Some(&["INVALID"][..])).is_err());
    /// assert_eq!(PathOptions::parse::<&str>(None).unwrap(), PathOptions::defaults());
    /// ```
    pub fn parse<S: AsRef<str>>(names: Option<&[S]>) -> Result<Self, ConvertError> {
        match names {
            None => Ok(Self::defaults()),
            Some(names) => names
                .iter()
                .map(|name| name.as_ref().parse::<PathOption>())
                .collect(),
        }
    }

    /// Whether an option is set
    pub fn contains(&self, option: PathOption) -> bool {
        self.options.contains(&option)
    }

    /// Add an option (builder pattern)
    #[must_use]
    pub fn with(mut self, option: PathOption) -> Self {
        if !self.contains(option) {
            self.options.push(option);
        }
        self
    }

    /// Options in insertion order
    pub fn iter(&self) -> impl Iterator<Item = PathOption> + '_ {
        self.options.iter().copied()
    }
}

impl FromIterator<PathOption> for PathOptions {
    fn from_iter<I: IntoIterator<Item = PathOption>>(iter: I) -> Self {
        iter.into_iter().fold(Self::none(), PathOptions::with)
    }
}

/// Keeps or drops properties by key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyFilter {
    /// Keep only these keys
    Include(Vec<String>),
    /// Drop these keys
    Exclude(Vec<String>),
}

impl PropertyFilter {
    /// Build a filter from `["a", "b"]` or `["-a", "-b"]`
    ///
    /// An empty list filters nothing and yields `None`.
    pub fn from_list(keys: &[String]) -> Result<Option<Self>, ConvertError> {
        if keys.is_empty() {
            return Ok(None);
        }
        let excluded = keys.iter().filter(|key| key.starts_with('-')).count();
        if excluded == keys.len() {
            Ok(Some(PropertyFilter::Exclude(
                keys.iter().map(|key| key[1..].to_string()).collect(),
            )))
        } else if excluded == 0 {
            Ok(Some(PropertyFilter::Include(keys.to_vec())))
        } else {
            Err(ConvertError::MixedPropertyFilter)
        }
    }

    /// Whether a property key survives the filter
    pub fn keeps(&self, key: &str) -> bool {
        match self {
            PropertyFilter::Include(keys) => keys.iter().any(|k| k == key),
            PropertyFilter::Exclude(keys) => !keys.iter().any(|k| k == key),
        }
    }
}

/// Configuration for tree reconstruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Process longer paths first
    #[serde(default = "default_sort_paths", alias = "sortPaths")]
    pub sort_paths: bool,

    /// Property lists per node label
    #[serde(default)]
    pub nodes: BTreeMap<String, Vec<String>>,

    /// Property lists per relationship type
    #[serde(default)]
    pub rels: BTreeMap<String, Vec<String>>,
}

fn default_sort_paths() -> bool {
    true
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            sort_paths: true,
            nodes: BTreeMap::new(),
            rels: BTreeMap::new(),
        }
    }
}

impl ConvertConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConvertError> {
        for keys in self.nodes.values().chain(self.rels.values()) {
            PropertyFilter::from_list(keys)?;
        }
        Ok(())
    }

    /// Filter for a node: the first of its labels with a configured list
    pub fn node_filter(&self, labels: &[String]) -> Result<Option<PropertyFilter>, ConvertError> {
        match labels.iter().find_map(|label| self.nodes.get(label)) {
            Some(keys) => PropertyFilter::from_list(keys),
            None => Ok(None),
        }
    }

    /// Filter for a relationship type
    pub fn rel_filter(&self, rel_type: &str) -> Result<Option<PropertyFilter>, ConvertError> {
        match self.rels.get(rel_type) {
            Some(keys) => PropertyFilter::from_list(keys),
            None => Ok(None),
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConvertError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON map such as `{sortPaths: false}`
    pub fn from_json(json: &serde_json::Value) -> Result<Self, ConvertError> {
        let config: Self = serde_json::from_value(json.clone())
            .map_err(|e| ConvertError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConvertError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConvertError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = ConvertConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.sort_paths);
    }

    #[test]
    fn test_mixed_filter_rejected() {
        let mut config = ConvertConfig::default();
        config.nodes.insert("Category".to_string(), keys(&["-name", "name"]));

        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "Only include or exclude attribute are possible!");
    }

    #[test]
    fn test_filter_kinds() {
        let include = PropertyFilter::from_list(&keys(&["name"])).unwrap().unwrap();
        assert!(include.keeps("name"));
        assert!(!include.keeps("surname"));

        let exclude = PropertyFilter::from_list(&keys(&["-id"])).unwrap().unwrap();
        assert!(!exclude.keeps("id"));
        assert!(exclude.keeps("subCat"));

        assert!(PropertyFilter::from_list(&[]).unwrap().is_none());
    }

    #[test]
    fn test_node_filter_uses_first_configured_label() {
        let mut config = ConvertConfig::default();
        config.nodes.insert("Baz".to_string(), keys(&["a"]));

        let filter = config.node_filter(&keys(&["Baa", "Baz"])).unwrap();
        assert_eq!(filter, Some(PropertyFilter::Include(keys(&["a"]))));
        assert!(config.node_filter(&keys(&["Other"])).unwrap().is_none());
    }

    #[test]
    fn test_json_map_with_camel_case_key() {
        let json = serde_json::json!({"sortPaths": false, "rels": {"subcategory": ["id"]}});
        let config = ConvertConfig::from_json(&json).unwrap();
        assert!(!config.sort_paths);
        assert_eq!(config.rels["subcategory"], keys(&["id"]));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = ConvertConfig::default();
        config.sort_paths = false;
        config.nodes.insert("Category".to_string(), keys(&["name", "surname"]));

        let toml_str = config.to_toml().unwrap();
        let parsed = ConvertConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_path_option_names() {
        for option in PathOption::ALL {
            assert_eq!(option.name().parse::<PathOption>().unwrap(), option);
        }
        let err = "as_path_list".parse::<PathOption>().unwrap_err();
        assert!(err.to_string().starts_with("Invalid pathOptions."));
    }

    #[test]
    fn test_explicit_empty_options() {
        let options = PathOptions::parse::<String>(Some(&[][..])).unwrap();
        assert_eq!(options, PathOptions::none());
    }
}
