//! Filter predicates for `[?(...)]` selectors

use std::cmp::Ordering;

use serde_json::Value;

use super::JsonPath;
use crate::config::PathOptions;

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

/// One side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Path relative to the item under test (`@.price`)
    Current(JsonPath),
    /// Path from the document root (`$.expensive`)
    Root(JsonPath),
    /// Constant
    Literal(Value),
}

/// Boolean filter expression
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// `a || b`
    Or(Box<FilterExpr>, Box<FilterExpr>),
    /// `a && b`
    And(Box<FilterExpr>, Box<FilterExpr>),
    /// `!a`
    Not(Box<FilterExpr>),
    /// `a <op> b`
    Compare(Operand, CompareOp, Operand),
    /// A bare path: true when it matches anything
    Exists(Operand),
}

/// A compiled filter with the text it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    expr: FilterExpr,
    source: String,
}

impl Filter {
    pub(super) fn new(expr: FilterExpr, source: &str) -> Self {
        Self {
            expr,
            source: source.to_string(),
        }
    }

    /// The predicate
    pub fn expr(&self) -> &FilterExpr {
        &self.expr
    }

    /// Expression text between `?(` and `)`
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether `item` passes the filter
    pub fn accepts(&self, item: &Value, root: &Value) -> bool {
        self.expr.evaluate(item, root)
    }
}

impl FilterExpr {
    fn evaluate(&self, item: &Value, root: &Value) -> bool {
        match self {
            FilterExpr::Or(left, right) => left.evaluate(item, root) || right.evaluate(item, root),
            FilterExpr::And(left, right) => left.evaluate(item, root) && right.evaluate(item, root),
            FilterExpr::Not(inner) => !inner.evaluate(item, root),
            FilterExpr::Exists(operand) => match operand {
                Operand::Current(path) => matches_any(path, item, root),
                Operand::Root(path) => matches_any(path, root, root),
                Operand::Literal(value) => truthy(value),
            },
            FilterExpr::Compare(left, op, right) => {
                let left = operand_value(left, item, root);
                let right = operand_value(right, item, root);
                compare(left.as_ref(), *op, right.as_ref())
            }
        }
    }
}

fn matches_any(path: &JsonPath, start: &Value, root: &Value) -> bool {
    super::eval::evaluate(path.segments(), start, root, &PathOptions::none())
        .map(|matches| !matches.is_empty())
        .unwrap_or(false)
}

fn truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

/// Resolve an operand; `None` when a path selects nothing
fn operand_value(operand: &Operand, item: &Value, root: &Value) -> Option<Value> {
    let (path, start) = match operand {
        Operand::Literal(value) => return Some(value.clone()),
        Operand::Current(path) => (path, item),
        Operand::Root(path) => (path, root),
    };

    let matches = super::eval::evaluate(path.segments(), start, root, &PathOptions::none()).ok()?;
    if path.is_definite() {
        matches.into_iter().next().map(|m| m.value.into_owned())
    } else {
        Some(Value::Array(matches.into_iter().map(|m| m.value.into_owned()).collect()))
    }
}

fn compare(left: Option<&Value>, op: CompareOp, right: Option<&Value>) -> bool {
    let (Some(left), Some(right)) = (left, right) else {
        return op == CompareOp::Ne;
    };

    match op {
        CompareOp::Eq => values_equal(left, right),
        CompareOp::Ne => !values_equal(left, right),
        CompareOp::Lt => ordering(left, right) == Some(Ordering::Less),
        CompareOp::Le => matches!(ordering(left, right), Some(Ordering::Less | Ordering::Equal)),
        CompareOp::Gt => ordering(left, right) == Some(Ordering::Greater),
        CompareOp::Ge => matches!(ordering(left, right), Some(Ordering::Greater | Ordering::Equal)),
    }
}

/// Numbers compare by value regardless of integer or float encoding
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left.as_f64(), right.as_f64()) {
        (Some(l), Some(r)) if left.is_number() && right.is_number() => l == r,
        _ => left == right,
    }
}

fn ordering(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => l.as_f64()?.partial_cmp(&r.as_f64()?),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        _ => None,
    }
}
