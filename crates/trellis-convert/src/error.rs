//! Error types for conversions

use thiserror::Error;

/// Message for unknown JSON path option names
pub const PATH_OPTIONS_ERROR_MESSAGE: &str = "Invalid pathOptions. The allowed values are: \
[DEFAULT_PATH_LEAF_TO_NULL, ALWAYS_RETURN_LIST, AS_PATH_LIST, SUPPRESS_EXCEPTIONS, REQUIRE_PROPERTIES]";

/// Message for `ALWAYS_RETURN_LIST` on a map-returning conversion
pub const ALWAYS_RETURN_LIST_MAP_MESSAGE: &str =
    "It's not possible to use ALWAYS_RETURN_LIST option because the conversion should return a Map";

/// Message for a property filter mixing included and excluded keys
pub const MIXED_FILTER_MESSAGE: &str = "Only include or exclude attribute are possible!";

/// Errors that can occur during conversion
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// Unknown JSON path option name
    #[error("{}", PATH_OPTIONS_ERROR_MESSAGE)]
    InvalidPathOptions,

    /// `ALWAYS_RETURN_LIST` requested where a map is required
    #[error("{}", ALWAYS_RETURN_LIST_MAP_MESSAGE)]
    AlwaysReturnListForMap,

    /// Property filter mixing `key` and `-key` entries
    #[error("{}", MIXED_FILTER_MESSAGE)]
    MixedPropertyFilter,

    /// Malformed JSON text
    #[error("Invalid JSON at byte {offset}: {message}")]
    Json {
        /// Byte offset of the offending token
        offset: usize,
        /// What went wrong
        message: String,
    },

    /// JSONPath expression that does not compile
    #[error("Invalid JSONPath '{path}': {message}")]
    InvalidPath {
        /// The expression as given
        path: String,
        /// What went wrong
        message: String,
    },

    /// Evaluation failure, e.g. `No results for path: $['a']`
    #[error("{0}")]
    PathEvaluation(String),

    /// Result of the wrong shape
    #[error("Expected a {expected} but found {found}")]
    TypeMismatch {
        /// Required shape
        expected: &'static str,
        /// Shape produced
        found: &'static str,
    },

    /// Sorted map input that is neither a node nor a map
    #[error("input value must be a Node or a map")]
    NotAMap,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Graph store error
    #[error("Store error: {0}")]
    Store(String),
}

impl From<toml::de::Error> for ConvertError {
    fn from(e: toml::de::Error) -> Self {
        ConvertError::Config(e.to_string())
    }
}
