//! Path evaluation

use std::borrow::Cow;

use serde_json::{Map, Value};

use super::{Match, Segment, Selector};
use crate::config::{PathOption, PathOptions};
use crate::error::ConvertError;

/// Evaluate `segments` starting at `current`; `root` backs `$` references in filters
pub(crate) fn evaluate<'a>(
    segments: &[Segment],
    current: &'a Value,
    root: &'a Value,
    options: &PathOptions,
) -> Result<Vec<Match<'a>>, ConvertError> {
    let mut evaluator = Evaluator {
        segments,
        root,
        leaf_to_null: options.contains(PathOption::DefaultPathLeafToNull),
        suppress: options.contains(PathOption::SuppressExceptions),
        require: options.contains(PathOption::RequireProperties),
        matches: Vec::new(),
    };
    evaluator.step(0, current, "$".to_string())?;
    Ok(evaluator.matches)
}

struct Evaluator<'p, 'a> {
    segments: &'p [Segment],
    root: &'a Value,
    leaf_to_null: bool,
    suppress: bool,
    require: bool,
    matches: Vec<Match<'a>>,
}

impl<'p, 'a> Evaluator<'p, 'a> {
    fn is_leaf(&self, index: usize) -> bool {
        index + 1 == self.segments.len()
    }

    /// Every segment before `index` selects at most one value
    fn upstream_definite(&self, index: usize) -> bool {
        self.segments[..index].iter().all(Segment::is_definite)
    }

    fn push(&mut self, path: String, value: Cow<'a, Value>) {
        self.matches.push(Match { path, value });
    }

    fn step(&mut self, index: usize, value: &'a Value, path: String) -> Result<(), ConvertError> {
        let segments = self.segments;
        match segments.get(index) {
            None => {
                self.push(path, Cow::Borrowed(value));
                Ok(())
            }
            Some(Segment::Child(selector)) => self.select(index, selector, value, &path),
            Some(Segment::Descendant(selector)) => self.scan(index, selector, value, &path),
        }
    }

    /// Pre-order walk applying `selector` wherever it can match
    fn scan(
        &mut self,
        index: usize,
        selector: &Selector,
        value: &'a Value,
        path: &str,
    ) -> Result<(), ConvertError> {
        if self.scan_accepts(index, selector, value) {
            self.select(index, selector, value, path)?;
        }
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    self.scan(index, selector, child, &format!("{}['{}']", path, key))?;
                }
            }
            Value::Array(items) => {
                for (i, child) in items.iter().enumerate() {
                    self.scan(index, selector, child, &format!("{}[{}]", path, i))?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn scan_accepts(&self, index: usize, selector: &Selector, value: &Value) -> bool {
        match selector {
            Selector::Name(name) => value.as_object().is_some_and(|map| {
                (self.is_leaf(index) && self.leaf_to_null) || map.contains_key(name)
            }),
            Selector::Names(_) => value.is_object(),
            Selector::Wildcard => true,
            Selector::Index(_) | Selector::Indexes(_) | Selector::Slice { .. } => value.is_array(),
            Selector::Filter(filter) => value.is_object() && filter.accepts(value, self.root),
        }
    }

    fn select(
        &mut self,
        index: usize,
        selector: &Selector,
        value: &'a Value,
        path: &str,
    ) -> Result<(), ConvertError> {
        match selector {
            Selector::Name(name) => match value {
                Value::Object(map) => self.property(index, name, map, path, true),
                _ => self.not_an_object(index, selector, value, path),
            },
            Selector::Names(names) => match value {
                Value::Object(map) if self.is_leaf(index) => self.merge(selector, names, map, path),
                Value::Object(map) => {
                    for name in names {
                        self.property(index, name, map, path, false)?;
                    }
                    Ok(())
                }
                _ => self.not_an_object(index, selector, value, path),
            },
            Selector::Index(position) => match value {
                Value::Array(items) => self.items(index, items, &[*position], path),
                _ => self.not_an_array(index, selector, value, path),
            },
            Selector::Indexes(positions) => match value {
                Value::Array(items) => self.items(index, items, positions, path),
                _ => self.not_an_array(index, selector, value, path),
            },
            Selector::Slice { start, end, step } => match value {
                Value::Array(items) => {
                    for i in slice_positions(items.len(), *start, *end, *step) {
                        self.step(index + 1, &items[i], format!("{}[{}]", path, i))?;
                    }
                    Ok(())
                }
                _ => self.not_an_array(index, selector, value, path),
            },
            Selector::Wildcard => {
                match value {
                    Value::Object(map) => {
                        for (key, child) in map {
                            self.step(index + 1, child, format!("{}['{}']", path, key))?;
                        }
                    }
                    Value::Array(items) => {
                        for (i, child) in items.iter().enumerate() {
                            self.step(index + 1, child, format!("{}[{}]", path, i))?;
                        }
                    }
                    _ => {}
                }
                Ok(())
            }
            Selector::Filter(filter) => match value {
                Value::Object(_) => {
                    if filter.accepts(value, self.root) {
                        self.step(index + 1, value, path.to_string())?;
                    }
                    Ok(())
                }
                Value::Array(items) => {
                    for (i, item) in items.iter().enumerate() {
                        if filter.accepts(item, self.root) {
                            self.step(index + 1, item, format!("{}[{}]", path, i))?;
                        }
                    }
                    Ok(())
                }
                _ if self.upstream_definite(index) && !self.suppress => {
                    Err(ConvertError::PathEvaluation(format!(
                        "Filter: {} can not be applied to primitives. Current context is: {}",
                        selector, value
                    )))
                }
                _ => Ok(()),
            },
        }
    }

    fn property(
        &mut self,
        index: usize,
        name: &str,
        map: &'a Map<String, Value>,
        path: &str,
        token_definite: bool,
    ) -> Result<(), ConvertError> {
        let child_path = format!("{}['{}']", path, name);
        if let Some(child) = map.get(name) {
            return self.step(index + 1, child, child_path);
        }

        if self.is_leaf(index) {
            if self.leaf_to_null {
                self.push(child_path, Cow::Owned(Value::Null));
                Ok(())
            } else if self.suppress || !self.require {
                Ok(())
            } else {
                Err(ConvertError::PathEvaluation(format!("No results for path: {}", child_path)))
            }
        } else if (!(self.upstream_definite(index) && token_definite) && !self.require) || self.suppress {
            Ok(())
        } else {
            Err(ConvertError::PathEvaluation(format!("Missing property in path {}", child_path)))
        }
    }

    /// Several names at the leaf select one map holding all of them
    fn merge(
        &mut self,
        selector: &Selector,
        names: &[String],
        map: &Map<String, Value>,
        path: &str,
    ) -> Result<(), ConvertError> {
        let merged_path = format!("{}{}", path, selector);
        let mut merged = Map::new();
        for name in names {
            match map.get(name) {
                Some(value) => {
                    merged.insert(name.clone(), value.clone());
                }
                None if self.leaf_to_null => {
                    merged.insert(name.clone(), Value::Null);
                }
                None if self.require => {
                    return Err(ConvertError::PathEvaluation(format!(
                        "Missing property in path {}",
                        merged_path
                    )));
                }
                None => {}
            }
        }
        self.push(merged_path, Cow::Owned(Value::Object(merged)));
        Ok(())
    }

    fn items(
        &mut self,
        index: usize,
        items: &'a [Value],
        positions: &[i64],
        path: &str,
    ) -> Result<(), ConvertError> {
        for &position in positions {
            if let Some(i) = resolve_index(items.len(), position) {
                self.step(index + 1, &items[i], format!("{}[{}]", path, i))?;
            }
        }
        Ok(())
    }

    fn not_an_object(
        &self,
        index: usize,
        selector: &Selector,
        value: &Value,
        path: &str,
    ) -> Result<(), ConvertError> {
        if !self.upstream_definite(index) || self.suppress {
            return Ok(());
        }
        Err(ConvertError::PathEvaluation(format!(
            "Expected to find an object with property {} in path {} but found '{}'",
            selector,
            path,
            type_name(value)
        )))
    }

    fn not_an_array(
        &self,
        index: usize,
        selector: &Selector,
        value: &Value,
        path: &str,
    ) -> Result<(), ConvertError> {
        if !self.upstream_definite(index) || self.suppress {
            return Ok(());
        }
        if value.is_null() {
            return Err(ConvertError::PathEvaluation(format!("The path {} is null", path)));
        }
        Err(ConvertError::PathEvaluation(format!(
            "Filter: {} can only be applied to arrays. Current context is: {}",
            selector, value
        )))
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Negative positions count from the end; out of range is `None`
fn resolve_index(len: usize, position: i64) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let resolved = if position < 0 { len + position } else { position };
    (0..len).contains(&resolved).then_some(resolved as usize)
}

fn slice_positions(len: usize, start: Option<i64>, end: Option<i64>, step: Option<i64>) -> Vec<usize> {
    let Ok(len) = i64::try_from(len) else {
        return Vec::new();
    };
    let clamp = |bound: i64| {
        if bound < 0 {
            (len + bound).max(0)
        } else {
            bound.min(len)
        }
    };
    let start = start.map_or(0, clamp);
    let end = end.map_or(len, clamp);
    let step = step.unwrap_or(1).max(1) as usize;
    (start..end).step_by(step).map(|i| i as usize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_index() {
        assert_eq!(resolve_index(3, 0), Some(0));
        assert_eq!(resolve_index(3, -1), Some(2));
        assert_eq!(resolve_index(3, 3), None);
        assert_eq!(resolve_index(3, -4), None);
        assert_eq!(resolve_index(0, 0), None);
    }

    #[test]
    fn test_slice_positions() {
        assert_eq!(slice_positions(5, None, None, None), vec![0, 1, 2, 3, 4]);
        assert_eq!(slice_positions(5, Some(1), Some(3), None), vec![1, 2]);
        assert_eq!(slice_positions(5, Some(-2), None, None), vec![3, 4]);
        assert_eq!(slice_positions(5, None, Some(-3), None), vec![0, 1]);
        assert_eq!(slice_positions(5, Some(-10), Some(10), Some(2)), vec![0, 2, 4]);
        assert!(slice_positions(5, Some(4), Some(2), None).is_empty());
    }
}
