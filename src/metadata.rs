//! Metadata extraction from report documents.
//!
//! Report documents are MDX modules that declare their catalog metadata as a
//! top-level `export const metadata = { ... }` assignment. This module
//! locates that declaration and parses the object literal with a restricted
//! data-literal grammar: objects, arrays, quoted strings, numbers, booleans,
//! and `null` only. Nothing is ever evaluated — a function call, identifier,
//! or template literal inside the block aborts the parse, and the document
//! degrades to empty metadata instead of executing uploaded code.
//!
//! Extraction never fails the caller: a missing or malformed declaration
//! yields [`ReportMetadata::default`] plus a logged warning.

use std::fmt;

use serde_json::{Map, Number, Value};

use crate::models::ReportMetadata;

const DECLARATION: &str = "export const metadata";

/// Extracts the metadata record from raw document text. Pure and infallible:
/// the worst input produces the empty default.
pub fn extract_metadata(content: &str) -> ReportMetadata {
    let Some(block) = locate_block(content) else {
        return ReportMetadata::default();
    };

    let value = match parse_object_literal(block) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(error = %err, "ignoring malformed metadata block");
            return ReportMetadata::default();
        }
    };

    match serde_json::from_value(value) {
        Ok(metadata) => metadata,
        Err(err) => {
            tracing::warn!(error = %err, "metadata block has unexpected field types");
            ReportMetadata::default()
        }
    }
}

/// Finds the single top-level metadata declaration and returns the document
/// tail starting at its opening brace. The declaration must begin at the
/// start of a line; occurrences inside prose or code spans are ignored.
fn locate_block(content: &str) -> Option<&str> {
    let mut search_from = 0;
    while let Some(rel) = content[search_from..].find(DECLARATION) {
        let idx = search_from + rel;
        search_from = idx + DECLARATION.len();

        let at_line_start = idx == 0 || content.as_bytes()[idx - 1] == b'\n';
        if !at_line_start {
            continue;
        }

        let rest = content[idx + DECLARATION.len()..].trim_start();
        if let Some(rest) = rest.strip_prefix('=') {
            let rest = rest.trim_start();
            if rest.starts_with('{') {
                return Some(rest);
            }
        }
    }
    None
}

/// Parses one object literal from the start of `src`, ignoring whatever
/// follows the matching close brace. Brace matching is string-aware: braces
/// inside quoted values cannot truncate the block.
fn parse_object_literal(src: &str) -> Result<Value, LiteralError> {
    let mut parser = LiteralParser::new(src);
    parser.skip_trivia();
    parser.parse_object()
}

#[derive(Debug)]
struct LiteralError {
    message: String,
    offset: usize,
}

impl fmt::Display for LiteralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.message, self.offset)
    }
}

impl std::error::Error for LiteralError {}

/// Recursive-descent parser for the restricted literal grammar. Accepts the
/// JavaScript surface the documents are authored in — unquoted identifier
/// keys, single- or double-quoted strings, trailing commas, `//` and
/// `/* */` comments — but no construct that would require evaluation.
struct LiteralParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> LiteralParser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError {
            message: message.into(),
            offset: self.pos,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> Result<(), LiteralError> {
        match self.bump() {
            Some(ch) if ch == expected => Ok(()),
            Some(ch) => Err(self.error(format!("expected '{expected}', found '{ch}'"))),
            None => Err(self.error(format!("expected '{expected}', found end of input"))),
        }
    }

    /// Skips whitespace and `//` / `/* */` comments.
    fn skip_trivia(&mut self) {
        loop {
            while matches!(self.peek(), Some(ch) if ch.is_whitespace()) {
                self.bump();
            }
            let rest = &self.src[self.pos..];
            if let Some(stripped) = rest.strip_prefix("//") {
                let line_len = stripped.find('\n').map(|i| i + 1).unwrap_or(stripped.len());
                self.pos += 2 + line_len;
            } else if let Some(stripped) = rest.strip_prefix("/*") {
                match stripped.find("*/") {
                    Some(end) => self.pos += 2 + end + 2,
                    None => {
                        self.pos = self.src.len();
                        return;
                    }
                }
            } else {
                return;
            }
        }
    }

    fn parse_value(&mut self) -> Result<Value, LiteralError> {
        self.skip_trivia();
        match self.peek() {
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some('"') | Some('\'') => self.parse_string().map(Value::String),
            Some(ch) if ch == '-' || ch.is_ascii_digit() => self.parse_number(),
            Some(ch) if is_identifier_start(ch) => self.parse_word(),
            Some(ch) => Err(self.error(format!("unexpected character '{ch}'"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_object(&mut self) -> Result<Value, LiteralError> {
        self.eat('{')?;
        let mut map = Map::new();
        loop {
            self.skip_trivia();
            if self.peek() == Some('}') {
                self.bump();
                break;
            }
            let key = self.parse_key()?;
            self.skip_trivia();
            self.eat(':')?;
            let value = self.parse_value()?;
            map.insert(key, value);

            self.skip_trivia();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {
                    self.bump();
                    break;
                }
                _ => return Err(self.error("expected ',' or '}' after object entry")),
            }
        }
        Ok(Value::Object(map))
    }

    fn parse_array(&mut self) -> Result<Value, LiteralError> {
        self.eat('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            if self.peek() == Some(']') {
                self.bump();
                break;
            }
            items.push(self.parse_value()?);

            self.skip_trivia();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(']') => {
                    self.bump();
                    break;
                }
                _ => return Err(self.error("expected ',' or ']' after array element")),
            }
        }
        Ok(Value::Array(items))
    }

    fn parse_key(&mut self) -> Result<String, LiteralError> {
        match self.peek() {
            Some('"') | Some('\'') => self.parse_string(),
            Some(ch) if is_identifier_start(ch) => Ok(self.take_identifier()),
            Some(ch) => Err(self.error(format!("invalid object key starting with '{ch}'"))),
            None => Err(self.error("unexpected end of input in object key")),
        }
    }

    fn take_identifier(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(ch) if is_identifier_continue(ch)) {
            self.bump();
        }
        self.src[start..self.pos].to_string()
    }

    /// Bare words: only the literal keywords are data. Anything else is an
    /// identifier reference, which the grammar forbids outright.
    fn parse_word(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        let word = self.take_identifier();
        match word.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" => Ok(Value::Null),
            other => {
                self.pos = start;
                Err(self.error(format!("bare identifier '{other}' is not allowed")))
            }
        }
    }

    fn parse_string(&mut self) -> Result<String, LiteralError> {
        let quote = self
            .bump()
            .ok_or_else(|| self.error("unexpected end of input"))?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some(ch) if ch == quote => return Ok(out),
                Some('\\') => out.push(self.parse_escape()?),
                Some('\n') => return Err(self.error("unterminated string")),
                Some(ch) => out.push(ch),
            }
        }
    }

    fn parse_escape(&mut self) -> Result<char, LiteralError> {
        match self.bump() {
            None => Err(self.error("unterminated escape sequence")),
            Some('n') => Ok('\n'),
            Some('t') => Ok('\t'),
            Some('r') => Ok('\r'),
            Some('0') => Ok('\0'),
            Some('u') => self.parse_unicode_escape(),
            // JavaScript passes unknown escapes through verbatim.
            Some(ch) => Ok(ch),
        }
    }

    /// `\uXXXX`, combining surrogate pairs so escaped emoji round-trip.
    fn parse_unicode_escape(&mut self) -> Result<char, LiteralError> {
        let high = self.parse_hex4()?;
        if (0xD800..=0xDBFF).contains(&high) {
            if self.src[self.pos..].starts_with("\\u") {
                self.pos += 2;
                let low = self.parse_hex4()?;
                if (0xDC00..=0xDFFF).contains(&low) {
                    let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(combined)
                        .ok_or_else(|| self.error("invalid surrogate pair"));
                }
            }
            return Err(self.error("lone surrogate in unicode escape"));
        }
        char::from_u32(high).ok_or_else(|| self.error("invalid unicode escape"))
    }

    fn parse_hex4(&mut self) -> Result<u32, LiteralError> {
        let mut value = 0u32;
        for _ in 0..4 {
            let ch = self
                .bump()
                .ok_or_else(|| self.error("truncated unicode escape"))?;
            let digit = ch
                .to_digit(16)
                .ok_or_else(|| self.error(format!("invalid hex digit '{ch}'")))?;
            value = value * 16 + digit;
        }
        Ok(value)
    }

    fn parse_number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        while matches!(self.peek(), Some(ch) if ch.is_ascii_digit() || matches!(ch, '.' | 'e' | 'E' | '+' | '-'))
        {
            self.bump();
        }
        let text = &self.src[start..self.pos];
        if let Ok(int) = text.parse::<i64>() {
            return Ok(Value::Number(Number::from(int)));
        }
        let float = text
            .parse::<f64>()
            .map_err(|_| self.error(format!("invalid number '{text}'")))?;
        Number::from_f64(float)
            .map(Value::Number)
            .ok_or_else(|| self.error(format!("non-finite number '{text}'")))
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_identifier_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}
