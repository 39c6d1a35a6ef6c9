//! JSONPath expression parser

use serde_json::Value;

use super::filter::{CompareOp, Filter, FilterExpr, Operand};
use super::{JsonPath, Segment, Selector};
use crate::error::ConvertError;

/// Bytes that end an unquoted property name
const NAME_TERMINATORS: &[u8] = b".[]()'\" \t\r\n=!<>&|,";

pub(super) fn parse_path(expression: &str) -> Result<JsonPath, ConvertError> {
    let source = expression.trim();
    if source.is_empty() {
        return Err(invalid(expression, "path must not be empty"));
    }

    let mut parser = PathParser {
        expression,
        source,
        bytes: source.as_bytes(),
        position: 0,
    };

    let mut segments = Vec::new();
    // `$` is implied when missing
    if !parser.eat(b'$') && !matches!(parser.peek(), Some(b'[' | b'.')) {
        segments.push(Segment::Child(parser.dot_selector()?));
    }
    parser.segments(&mut segments)?;

    if !parser.at_end() {
        return Err(parser.error("unexpected character"));
    }
    Ok(JsonPath::from_segments(segments))
}

fn invalid(expression: &str, message: impl Into<String>) -> ConvertError {
    ConvertError::InvalidPath {
        path: expression.to_string(),
        message: message.into(),
    }
}

struct PathParser<'s> {
    expression: &'s str,
    source: &'s str,
    bytes: &'s [u8],
    position: usize,
}

impl<'s> PathParser<'s> {
    fn error(&self, message: &str) -> ConvertError {
        invalid(self.expression, format!("{} at position {}", message, self.position))
    }

    fn at_end(&self) -> bool {
        self.position >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.position + offset).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, text: &str) -> bool {
        if self.bytes[self.position..].starts_with(text.as_bytes()) {
            self.position += text.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), ConvertError> {
        if self.eat(byte) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", byte as char)))
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.position += 1;
        }
    }

    /// Parse segments until a byte that cannot start one
    fn segments(&mut self, segments: &mut Vec<Segment>) -> Result<(), ConvertError> {
        loop {
            match self.peek() {
                Some(b'.') if self.peek_at(1) == Some(b'.') => {
                    self.position += 2;
                    let selector = if self.peek() == Some(b'[') {
                        self.bracket()?
                    } else {
                        self.dot_selector()?
                    };
                    segments.push(Segment::Descendant(selector));
                }
                Some(b'.') => {
                    self.position += 1;
                    let selector = if self.peek() == Some(b'[') {
                        self.bracket()?
                    } else {
                        self.dot_selector()?
                    };
                    segments.push(Segment::Child(selector));
                }
                Some(b'[') => {
                    let selector = self.bracket()?;
                    segments.push(Segment::Child(selector));
                }
                _ => return Ok(()),
            }
        }
    }

    /// `*` or an unquoted name
    fn dot_selector(&mut self) -> Result<Selector, ConvertError> {
        if self.eat(b'*') {
            return Ok(Selector::Wildcard);
        }
        let start = self.position;
        while let Some(byte) = self.peek() {
            if NAME_TERMINATORS.contains(&byte) {
                break;
            }
            self.position += 1;
        }
        if start == self.position {
            return Err(self.error("expected a property name"));
        }
        Ok(Selector::Name(self.source[start..self.position].to_string()))
    }

    fn bracket(&mut self) -> Result<Selector, ConvertError> {
        self.expect(b'[')?;
        self.skip_whitespace();

        let selector = match self.peek() {
            Some(b'*') => {
                self.position += 1;
                Selector::Wildcard
            }
            Some(b'?') => {
                self.position += 1;
                self.skip_whitespace();
                self.expect(b'(')?;
                let start = self.position;
                let expr = self.or_expr()?;
                let end = self.position;
                self.skip_whitespace();
                self.expect(b')')?;
                Selector::Filter(Filter::new(expr, self.source[start..end].trim()))
            }
            Some(b'\'' | b'"') => {
                let mut names = vec![self.quoted()?];
                self.skip_whitespace();
                while self.eat(b',') {
                    self.skip_whitespace();
                    names.push(self.quoted()?);
                    self.skip_whitespace();
                }
                if names.len() == 1 {
                    Selector::Name(names.remove(0))
                } else {
                    Selector::Names(names)
                }
            }
            Some(b'0'..=b'9' | b'-' | b':') => self.indexes()?,
            _ => return Err(self.error("unexpected bracket content")),
        };

        self.skip_whitespace();
        self.expect(b']')?;
        Ok(selector)
    }

    fn indexes(&mut self) -> Result<Selector, ConvertError> {
        let first = self.optional_integer()?;
        self.skip_whitespace();

        if self.eat(b':') {
            self.skip_whitespace();
            let end = self.optional_integer()?;
            self.skip_whitespace();
            let step = if self.eat(b':') {
                self.skip_whitespace();
                self.optional_integer()?
            } else {
                None
            };
            if matches!(step, Some(step) if step <= 0) {
                return Err(self.error("slice step must be positive"));
            }
            return Ok(Selector::Slice {
                start: first,
                end,
                step,
            });
        }

        let first = first.ok_or_else(|| self.error("expected an index"))?;
        let mut indexes = vec![first];
        while self.eat(b',') {
            self.skip_whitespace();
            indexes.push(self.optional_integer()?.ok_or_else(|| self.error("expected an index"))?);
            self.skip_whitespace();
        }
        if indexes.len() == 1 {
            Ok(Selector::Index(first))
        } else {
            Ok(Selector::Indexes(indexes))
        }
    }

    fn optional_integer(&mut self) -> Result<Option<i64>, ConvertError> {
        let start = self.position;
        self.eat(b'-');
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.position += 1;
        }
        let text = &self.source[start..self.position];
        match text {
            "" => Ok(None),
            "-" => Err(self.error("expected digits")),
            _ => text
                .parse::<i64>()
                .map(Some)
                .map_err(|_| self.error("integer out of range")),
        }
    }

    fn quoted(&mut self) -> Result<String, ConvertError> {
        let quote = match self.peek() {
            Some(q @ (b'\'' | b'"')) => q,
            _ => return Err(self.error("expected a quoted string")),
        };
        self.position += 1;

        let mut out = String::new();
        let mut chunk_start = self.position;
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string")),
                Some(b'\\') => {
                    out.push_str(&self.source[chunk_start..self.position]);
                    self.position += 1;
                    match self.peek() {
                        Some(b'\\') => out.push('\\'),
                        Some(b'\'') => out.push('\''),
                        Some(b'"') => out.push('"'),
                        Some(b'/') => out.push('/'),
                        Some(b'n') => out.push('\n'),
                        Some(b't') => out.push('\t'),
                        Some(b'r') => out.push('\r'),
                        _ => return Err(self.error("invalid escape")),
                    }
                    self.position += 1;
                    chunk_start = self.position;
                }
                Some(byte) if byte == quote => {
                    out.push_str(&self.source[chunk_start..self.position]);
                    self.position += 1;
                    return Ok(out);
                }
                Some(_) => self.position += 1,
            }
        }
    }

    fn or_expr(&mut self) -> Result<FilterExpr, ConvertError> {
        let mut left = self.and_expr()?;
        loop {
            self.skip_whitespace();
            if !self.eat_str("||") {
                return Ok(left);
            }
            let right = self.and_expr()?;
            left = FilterExpr::Or(Box::new(left), Box::new(right));
        }
    }

    fn and_expr(&mut self) -> Result<FilterExpr, ConvertError> {
        let mut left = self.unary()?;
        loop {
            self.skip_whitespace();
            if !self.eat_str("&&") {
                return Ok(left);
            }
            let right = self.unary()?;
            left = FilterExpr::And(Box::new(left), Box::new(right));
        }
    }

    fn unary(&mut self) -> Result<FilterExpr, ConvertError> {
        self.skip_whitespace();
        if self.peek() == Some(b'!') && self.peek_at(1) != Some(b'=') {
            self.position += 1;
            return Ok(FilterExpr::Not(Box::new(self.unary()?)));
        }
        if self.eat(b'(') {
            let inner = self.or_expr()?;
            self.skip_whitespace();
            self.expect(b')')?;
            return Ok(inner);
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<FilterExpr, ConvertError> {
        let left = self.operand()?;
        self.skip_whitespace();

        let op = if self.eat_str("==") {
            CompareOp::Eq
        } else if self.eat_str("!=") {
            CompareOp::Ne
        } else if self.eat_str("<=") {
            CompareOp::Le
        } else if self.eat_str(">=") {
            CompareOp::Ge
        } else if self.eat(b'<') {
            CompareOp::Lt
        } else if self.eat(b'>') {
            CompareOp::Gt
        } else {
            return Ok(FilterExpr::Exists(left));
        };

        let right = self.operand()?;
        Ok(FilterExpr::Compare(left, op, right))
    }

    fn operand(&mut self) -> Result<Operand, ConvertError> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'@') => {
                self.position += 1;
                let mut segments = Vec::new();
                self.segments(&mut segments)?;
                Ok(Operand::Current(JsonPath::from_segments(segments)))
            }
            Some(b'$') => {
                self.position += 1;
                let mut segments = Vec::new();
                self.segments(&mut segments)?;
                Ok(Operand::Root(JsonPath::from_segments(segments)))
            }
            Some(b'\'' | b'"') => Ok(Operand::Literal(Value::String(self.quoted()?))),
            Some(b'0'..=b'9' | b'-') => self.number(),
            _ if self.eat_str("true") => Ok(Operand::Literal(Value::Bool(true))),
            _ if self.eat_str("false") => Ok(Operand::Literal(Value::Bool(false))),
            _ if self.eat_str("null") => Ok(Operand::Literal(Value::Null)),
            _ => Err(self.error("expected a filter operand")),
        }
    }

    fn number(&mut self) -> Result<Operand, ConvertError> {
        let start = self.position;
        self.eat(b'-');
        while matches!(self.peek(), Some(b'0'..=b'9' | b'.' | b'e' | b'E' | b'+' | b'-')) {
            self.position += 1;
        }
        let text = &self.source[start..self.position];
        if let Ok(int) = text.parse::<i64>() {
            return Ok(Operand::Literal(Value::from(int)));
        }
        text.parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(|n| Operand::Literal(Value::Number(n)))
            .ok_or_else(|| self.error("invalid number"))
    }
}
