//! JSONPath extraction
//!
//! Paths compile once into a [`JsonPath`] and evaluate against any
//! `serde_json::Value`. Every match carries its normalized path
//! (`$['store']['book'][0]`), which is what `AS_PATH_LIST` returns.
//!
//! A path is *definite* when it can select at most one value: it contains
//! only single property names and single indexes. Definite paths return a
//! value, indefinite ones a list.

mod eval;
mod filter;
mod parser;

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use tracing::debug;

use crate::config::{PathOption, PathOptions};
use crate::error::ConvertError;

pub use filter::{CompareOp, Filter, FilterExpr, Operand};

/// One step of a path
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Apply the selector to the current value (`.name`, `[0]`)
    Child(Selector),
    /// Apply the selector to the current value and all its descendants (`..name`)
    Descendant(Selector),
}

impl Segment {
    fn is_definite(&self) -> bool {
        match self {
            Segment::Child(selector) => selector.is_definite(),
            Segment::Descendant(_) => false,
        }
    }
}

/// What a segment selects
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// `.name` or `['name']`
    Name(String),
    /// `['a','b']`
    Names(Vec<String>),
    /// `[n]`, negative counts from the end
    Index(i64),
    /// `[a,b]`
    Indexes(Vec<i64>),
    /// `[start:end:step]`
    Slice {
        /// First position (default 0)
        start: Option<i64>,
        /// Position after the last (default: length)
        end: Option<i64>,
        /// Stride (default 1)
        step: Option<i64>,
    },
    /// `*` or `[*]`
    Wildcard,
    /// `[?(<expr>)]`
    Filter(Filter),
}

impl Selector {
    fn is_definite(&self) -> bool {
        matches!(self, Selector::Name(_) | Selector::Index(_))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Name(name) => write!(f, "['{}']", name),
            Selector::Names(names) => {
                let quoted: Vec<String> = names.iter().map(|n| format!("'{}'", n)).collect();
                write!(f, "[{}]", quoted.join(","))
            }
            Selector::Index(index) => write!(f, "[{}]", index),
            Selector::Indexes(indexes) => {
                let listed: Vec<String> = indexes.iter().map(i64::to_string).collect();
                write!(f, "[{}]", listed.join(","))
            }
            Selector::Slice { start, end, step } => {
                let bound = |b: &Option<i64>| b.map(|v| v.to_string()).unwrap_or_default();
                write!(f, "[{}:{}", bound(start), bound(end))?;
                if let Some(step) = step {
                    write!(f, ":{}", step)?;
                }
                f.write_str("]")
            }
            Selector::Wildcard => f.write_str("[*]"),
            Selector::Filter(filter) => write!(f, "[?({})]", filter.source()),
        }
    }
}

/// A located match
#[derive(Debug, Clone, PartialEq)]
pub struct Match<'a> {
    /// Normalized path of the match
    pub path: String,
    /// The matched value (owned when synthesized, e.g. a leaf defaulted to null)
    pub value: Cow<'a, Value>,
}

/// A compiled JSONPath expression
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use trellis_convert::{JsonPath, PathOptions};
///
/// let path: JsonPath = "$.columns.col2".parse().unwrap();
/// let document = json!({"columns": {"col2": {"_id": "772col2"}}});
///
/// assert!(path.is_definite());
/// assert_eq!(path.to_string(), "$['columns']['col2']");
/// assert_eq!(path.read(&document, &PathOptions::none()).unwrap(), json!({"_id": "772col2"}));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    /// Compile an expression
    ///
    /// A leading `$` is optional: `a.b` means `$.a.b`.
    pub fn compile(expression: &str) -> Result<Self, ConvertError> {
        parser::parse_path(expression)
    }

    pub(crate) fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Path steps
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the path selects at most one value
    pub fn is_definite(&self) -> bool {
        self.segments.iter().all(Segment::is_definite)
    }

    /// All matches with their normalized paths
    pub fn select<'a>(
        &self,
        document: &'a Value,
        options: &PathOptions,
    ) -> Result<Vec<Match<'a>>, ConvertError> {
        eval::evaluate(&self.segments, document, document, options)
    }

    /// Evaluate and shape the result according to the options
    ///
    /// - `AS_PATH_LIST`: a list of normalized paths
    /// - definite path: the single value (wrapped in a list with
    ///   `ALWAYS_RETURN_LIST`)
    /// - indefinite path: a list of values
    ///
    /// With `SUPPRESS_EXCEPTIONS`, evaluation errors yield `null` for
    /// definite paths and `[]` otherwise.
    pub fn read(&self, document: &Value, options: &PathOptions) -> Result<Value, ConvertError> {
        let as_path_list = options.contains(PathOption::AsPathList);
        let always_list = options.contains(PathOption::AlwaysReturnList);

        let shaped = self
            .select(document, options)
            .and_then(|matches| self.shape(matches, as_path_list, always_list));

        match shaped {
            Err(e) if options.contains(PathOption::SuppressExceptions) => {
                debug!(path = %self, error = %e, "JSONPath error suppressed");
                if as_path_list || always_list || !self.is_definite() {
                    Ok(Value::Array(Vec::new()))
                } else {
                    Ok(Value::Null)
                }
            }
            other => other,
        }
    }

    fn shape(
        &self,
        matches: Vec<Match<'_>>,
        as_path_list: bool,
        always_list: bool,
    ) -> Result<Value, ConvertError> {
        if matches.is_empty() && (as_path_list || self.is_definite()) {
            return Err(ConvertError::PathEvaluation(format!("No results for path: {}", self)));
        }

        if as_path_list {
            return Ok(Value::Array(
                matches.into_iter().map(|m| Value::String(m.path)).collect(),
            ));
        }

        let mut values: Vec<Value> = matches.into_iter().map(|m| m.value.into_owned()).collect();
        if self.is_definite() && !always_list {
            Ok(values.swap_remove(0))
        } else {
            Ok(Value::Array(values))
        }
    }
}

impl FromStr for JsonPath {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JsonPath::compile(s)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.segments {
            match segment {
                Segment::Child(selector) => write!(f, "{}", selector)?,
                Segment::Descendant(selector) => write!(f, "..{}", selector)?,
            }
        }
        Ok(())
    }
}
