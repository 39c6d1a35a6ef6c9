//! Lenient JSON reader
//!
//! Accepts everything strict JSON does, plus unquoted object keys,
//! single-quoted strings, `//` and `/* */` comments, `NaN`, `Infinity`
//! and a leading `+` on numbers. Objects keep their document order.
//!
//! Non-finite numbers have no JSON representation and read as `null`.

use logos::Logos;
use serde_json::{Map, Number, Value};

use crate::error::ConvertError;

/// Nesting limit for arrays and objects
const MAX_DEPTH: usize = 1000;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
enum Token {
    #[token("{")]
    LeftBrace,

    #[token("}")]
    RightBrace,

    #[token("[")]
    LeftBracket,

    #[token("]")]
    RightBracket,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token("true")]
    True,

    #[token("false")]
    False,

    #[token("null")]
    Null,

    #[token("NaN")]
    NaN,

    #[token("Infinity")]
    #[token("+Infinity")]
    Infinity,

    #[token("-Infinity")]
    NegativeInfinity,

    #[regex(r"[+-]?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,

    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r#"'([^'\\]|\\.)*'"#)]
    String,

    /// Unquoted key
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Identifier,
}

/// Parse lenient JSON text
///
/// # Examples
///
/// ```
/// use trellis_convert::lenient;
///
/// let value = lenient::parse("{a:[1,2,3], 'b': 'x' /* note */}").unwrap();
/// assert_eq!(value, serde_json::json!({"a": [1, 2, 3], "b": "x"}));
/// ```
pub fn parse(text: &str) -> Result<Value, ConvertError> {
    let mut parser = Parser::new(text)?;
    let value = parser.value(0)?;
    match parser.tokens.get(parser.position) {
        None => Ok(value),
        Some(&(_, offset)) => Err(json_error(offset, "unexpected trailing content")),
    }
}

fn json_error(offset: usize, message: impl Into<String>) -> ConvertError {
    ConvertError::Json {
        offset,
        message: message.into(),
    }
}

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<(Token, usize)>,
    spans: Vec<std::ops::Range<usize>>,
    position: usize,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str) -> Result<Self, ConvertError> {
        let mut tokens = Vec::new();
        let mut spans = Vec::new();
        let mut lexer = Token::lexer(source);
        while let Some(token) = lexer.next() {
            let span = lexer.span();
            match token {
                Ok(token) => {
                    tokens.push((token, span.start));
                    spans.push(span);
                }
                Err(()) => return Err(json_error(span.start, "unexpected character")),
            }
        }
        Ok(Self {
            source,
            tokens,
            spans,
            position: 0,
        })
    }

    fn end_offset(&self) -> usize {
        self.source.len()
    }

    fn next(&mut self) -> Result<(Token, usize), ConvertError> {
        let token = self
            .tokens
            .get(self.position)
            .copied()
            .ok_or_else(|| json_error(self.end_offset(), "unexpected end of input"))?;
        self.position += 1;
        Ok(token)
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.position).map(|&(token, _)| token)
    }

    fn slice(&self, index: usize) -> &'s str {
        &self.source[self.spans[index].clone()]
    }

    fn value(&mut self, depth: usize) -> Result<Value, ConvertError> {
        let index = self.position;
        let (token, offset) = self.next()?;
        match token {
            Token::LeftBrace => self.object(depth + 1, offset),
            Token::LeftBracket => self.array(depth + 1, offset),
            Token::String => Ok(Value::String(unescape(self.slice(index), offset)?)),
            Token::Number => Ok(number(self.slice(index))),
            Token::True => Ok(Value::Bool(true)),
            Token::False => Ok(Value::Bool(false)),
            Token::Null | Token::NaN | Token::Infinity | Token::NegativeInfinity => Ok(Value::Null),
            other => Err(json_error(offset, format!("unexpected {:?}", other))),
        }
    }

    fn object(&mut self, depth: usize, offset: usize) -> Result<Value, ConvertError> {
        if depth > MAX_DEPTH {
            return Err(json_error(offset, "nesting too deep"));
        }
        let mut map = Map::new();
        if self.peek() == Some(Token::RightBrace) {
            self.position += 1;
            return Ok(Value::Object(map));
        }
        loop {
            let key = self.key()?;
            let (colon, at) = self.next()?;
            if colon != Token::Colon {
                return Err(json_error(at, "expected ':' after object key"));
            }
            let value = self.value(depth)?;
            map.insert(key, value);

            match self.next()? {
                (Token::Comma, _) => continue,
                (Token::RightBrace, _) => return Ok(Value::Object(map)),
                (_, at) => return Err(json_error(at, "expected ',' or '}'")),
            }
        }
    }

    fn key(&mut self) -> Result<String, ConvertError> {
        let index = self.position;
        let (token, offset) = self.next()?;
        match token {
            Token::String => unescape(self.slice(index), offset),
            Token::Identifier | Token::True | Token::False | Token::Null | Token::NaN | Token::Infinity => {
                Ok(self.slice(index).to_string())
            }
            _ => Err(json_error(offset, "expected object key")),
        }
    }

    fn array(&mut self, depth: usize, offset: usize) -> Result<Value, ConvertError> {
        if depth > MAX_DEPTH {
            return Err(json_error(offset, "nesting too deep"));
        }
        let mut items = Vec::new();
        if self.peek() == Some(Token::RightBracket) {
            self.position += 1;
            return Ok(Value::Array(items));
        }
        loop {
            items.push(self.value(depth)?);
            match self.next()? {
                (Token::Comma, _) => continue,
                (Token::RightBracket, _) => return Ok(Value::Array(items)),
                (_, at) => return Err(json_error(at, "expected ',' or ']'")),
            }
        }
    }
}

/// Integers that fit `i64` stay integers
fn number(text: &str) -> Value {
    let digits = text.strip_prefix('+').unwrap_or(text);
    if !digits.contains(['.', 'e', 'E']) {
        if let Ok(int) = digits.parse::<i64>() {
            return Value::Number(int.into());
        }
    }
    digits
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map_or(Value::Null, Value::Number)
}

/// Strip the quotes of a string token and resolve escapes
fn unescape(quoted: &str, offset: usize) -> Result<String, ConvertError> {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.char_indices();

    while let Some((at, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escape_at = offset + 1 + at;
        let Some((_, escaped)) = chars.next() else {
            return Err(json_error(escape_at, "unterminated escape"));
        };
        match escaped {
            '"' | '\'' | '\\' | '/' => out.push(escaped),
            'b' => out.push('\u{0008}'),
            'f' => out.push('\u{000C}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'u' => {
                let high = hex4(&mut chars, escape_at)?;
                let code = if (0xD800..0xDC00).contains(&high) {
                    // surrogate pair
                    match (chars.next(), chars.next()) {
                        (Some((_, '\\')), Some((_, 'u'))) => {
                            let low = hex4(&mut chars, escape_at)?;
                            if !(0xDC00..0xE000).contains(&low) {
                                return Err(json_error(escape_at, "unpaired surrogate"));
                            }
                            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
                        }
                        _ => return Err(json_error(escape_at, "unpaired surrogate")),
                    }
                } else {
                    high
                };
                let c = char::from_u32(code)
                    .ok_or_else(|| json_error(escape_at, "invalid unicode escape"))?;
                out.push(c);
            }
            other => return Err(json_error(escape_at, format!("invalid escape '\\{}'", other))),
        }
    }
    Ok(out)
}

fn hex4(chars: &mut std::str::CharIndices<'_>, offset: usize) -> Result<u32, ConvertError> {
    let mut code = 0;
    for _ in 0..4 {
        let digit = chars
            .next()
            .and_then(|(_, c)| c.to_digit(16))
            .ok_or_else(|| json_error(offset, "invalid unicode escape"))?;
        code = code * 16 + digit;
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strict_json() {
        let value = parse(r#"{"a":42,"b":"foo","c":[1,2,3]}"#).unwrap();
        assert_eq!(value, json!({"a": 42, "b": "foo", "c": [1, 2, 3]}));
    }

    #[test]
    fn test_unquoted_keys() {
        assert_eq!(parse("{a:[1,2,3]}").unwrap(), json!({"a": [1, 2, 3]}));
        assert_eq!(parse("{ $ref : null }").unwrap(), json!({"$ref": null}));
    }

    #[test]
    fn test_document_order_kept() {
        let value = parse("{z:1, a:2, m:3}").unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_comments_and_single_quotes() {
        let text = "// header\n{'name': 'it\\'s', /* inline */ \"n\": +5}";
        assert_eq!(parse(text).unwrap(), json!({"name": "it's", "n": 5}));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse("9223372036854775807").unwrap(), json!(i64::MAX));
        assert_eq!(parse("1.5e2").unwrap(), json!(150.0));
        assert!(parse("18446744073709551616").unwrap().is_f64());
        assert_eq!(parse("[NaN, -Infinity]").unwrap(), json!([null, null]));
    }

    #[test]
    fn test_unicode_escapes() {
        assert_eq!(parse(r#""caf\u00e9""#).unwrap(), json!("caf\u{e9}"));
        assert_eq!(parse(r#""\ud83d\ude00""#).unwrap(), json!("\u{1F600}"));
    }

    #[test]
    fn test_errors_report_offsets() {
        match parse("{a:1,}").unwrap_err() {
            ConvertError::Json { offset, .. } => assert_eq!(offset, 5),
            other => panic!("unexpected error {:?}", other),
        }
        assert!(parse("[1 2]").is_err());
        assert!(parse("{a:1} x").is_err());
        assert!(parse("").is_err());
        assert!(parse("{a: b}").is_err());
    }
}
