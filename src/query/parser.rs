use super::ast::Predicate;
use super::builder::{self, FieldKey};
use super::value::Value;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

pub struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

#[derive(Debug, Error)]
#[error("Parse error at position {pos}: {message}")]
pub struct ParseError {
    pub message: String,
    pub pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub fn parse(mut self) -> Result<Predicate, ParseError> {
        let predicate = self.parse_or()?;
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(self.error("Unexpected input after expression"));
        }
        Ok(predicate)
    }

    fn parse_or(&mut self) -> Result<Predicate, ParseError> {
        let mut left = self.parse_and()?;
        loop {
            self.skip_whitespace();
            if !self.match_keyword("OR") {
                break;
            }
            let right = self.parse_and()?;
            left = builder::or(left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Predicate, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            self.skip_whitespace();
            if !self.match_keyword("AND") {
                break;
            }
            let right = self.parse_unary()?;
            left = builder::and(left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Predicate, ParseError> {
        self.skip_whitespace();
        if self.match_keyword("NOT") {
            let inner = self.parse_unary()?;
            return Ok(builder::not(inner));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Predicate, ParseError> {
        self.skip_whitespace();

        if self.match_char('(') {
            let predicate = self.parse_or()?;
            self.skip_whitespace();
            if !self.match_char(')') {
                return Err(self.error("Expected ')'"));
            }
            return Ok(predicate);
        }

        if let Some(constant) = self.parse_constant() {
            return Ok(constant);
        }

        let key = FieldKey::new(self.parse_identifier()?);
        self.skip_whitespace();

        if self.match_keyword("contains") {
            return Ok(key.contains(self.parse_string_operand()?));
        }
        if self.match_keyword("not") {
            self.skip_whitespace();
            if !self.match_keyword("contains") {
                return Err(self.error("Expected 'contains' after 'not'"));
            }
            return Ok(key.not_contains(self.parse_string_operand()?));
        }
        if self.match_keyword("beginsWith") {
            return Ok(key.begins_with(self.parse_string_operand()?));
        }
        if self.match_keyword("between") {
            let start = self.parse_value()?;
            self.skip_whitespace();
            if !self.match_keyword("and") {
                return Err(self.error("Expected 'and' in between range"));
            }
            let end = self.parse_value()?;
            return Ok(key.between(start, end));
        }

        let op = self.parse_operator()?;
        let value = self.parse_value()?;

        Ok(match op {
            "=" => key.eq(value),
            "!=" => key.ne(value),
            "<" => key.lt(value),
            "<=" => key.le(value),
            ">" => key.gt(value),
            _ => key.ge(value),
        })
    }

    // `ALL` and `NONE` are constants only when nothing else follows them in
    // the current group, so fields may still be named `all` or `none`.
    fn parse_constant(&mut self) -> Option<Predicate> {
        let start = self.pos;
        let constant = if self.match_keyword("ALL") {
            builder::all()
        } else if self.match_keyword("NONE") {
            builder::none()
        } else {
            return None;
        };

        self.skip_whitespace();
        let after = self.pos;
        let at_boundary = self.pos >= self.input.len()
            || self.current_char() == ')'
            || self.match_keyword("AND")
            || self.match_keyword("OR");
        if at_boundary {
            self.pos = after;
            Some(constant)
        } else {
            self.pos = start;
            None
        }
    }

    fn parse_identifier(&mut self) -> Result<String, ParseError> {
        self.skip_whitespace();
        let start = self.pos;

        while self.pos < self.input.len() {
            let c = self.current_char();
            if c.is_alphanumeric() || c == '_' || c == '-' {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }

        if self.pos == start {
            return Err(self.error("Expected identifier"));
        }

        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_operator(&mut self) -> Result<&'static str, ParseError> {
        self.skip_whitespace();

        for op in [">=", "<=", "!=", "=", ">", "<"] {
            if self.match_str(op) {
                return Ok(op);
            }
        }

        Err(self.error("Expected operator (=, !=, >, <, >=, <=)"))
    }

    fn parse_string_operand(&mut self) -> Result<String, ParseError> {
        self.skip_whitespace();
        if !self.match_char('"') {
            return Err(self.error("Expected string"));
        }
        self.parse_string()
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        self.skip_whitespace();

        if self.match_char('"') {
            return self.parse_string().map(Value::String);
        }

        if self.match_keyword("true") {
            return Ok(Value::Bool(true));
        }
        if self.match_keyword("false") {
            return Ok(Value::Bool(false));
        }

        self.parse_scalar()
    }

    /// Reads up to the closing quote. `\"` and `\\` stand for `"` and `\`.
    fn parse_string(&mut self) -> Result<String, ParseError> {
        let mut s = String::new();
        while self.pos < self.input.len() {
            let c = self.current_char();
            self.pos += c.len_utf8();
            match c {
                '"' => return Ok(s),
                '\\' => {
                    let escaped = self.current_char();
                    if !matches!(escaped, '"' | '\\') {
                        return Err(self.error("Invalid escape in string"));
                    }
                    self.pos += 1;
                    s.push(escaped);
                }
                c => s.push(c),
            }
        }
        Err(self.error("Unterminated string"))
    }

    fn parse_scalar(&mut self) -> Result<Value, ParseError> {
        let start = self.pos;

        while self.pos < self.input.len() {
            let c = self.current_char();
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+' | ':') {
                self.pos += 1;
            } else {
                break;
            }
        }

        if self.pos == start {
            return Err(self.error("Expected value"));
        }

        let text = &self.input[start..self.pos];
        parse_literal(text).ok_or_else(|| ParseError {
            message: format!("Invalid value '{}'", text),
            pos: start,
        })
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() && self.current_char().is_whitespace() {
            self.pos += self.current_char().len_utf8();
        }
    }

    fn current_char(&self) -> char {
        self.input[self.pos..].chars().next().unwrap_or('\0')
    }

    fn match_char(&mut self, c: char) -> bool {
        if self.pos < self.input.len() && self.current_char() == c {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn match_str(&mut self, s: &str) -> bool {
        if self.input[self.pos..].starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn match_keyword(&mut self, kw: &str) -> bool {
        let remaining = &self.input[self.pos..];
        let Some(head) = remaining.get(..kw.len()) else {
            return false;
        };
        if !head.eq_ignore_ascii_case(kw) {
            return false;
        }
        let after = remaining[kw.len()..].chars().next();
        if after.map_or(true, |c| !c.is_alphanumeric() && c != '_') {
            self.pos += kw.len();
            true
        } else {
            false
        }
    }

    fn error(&self, message: &str) -> ParseError {
        ParseError {
            message: message.to_string(),
            pos: self.pos,
        }
    }
}

/// Types an unquoted literal: date, datetime, time, integer or double.
fn parse_literal(text: &str) -> Option<Value> {
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(Value::Date(date));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(Value::DateTime(dt.with_timezone(&Utc)));
    }
    if let Ok(time) = NaiveTime::parse_from_str(text, "%H:%M:%S%.f") {
        return Some(Value::Time(time));
    }
    if text.contains(['.', 'e', 'E']) {
        return text.parse::<f64>().ok().map(Value::Double);
    }
    // NaN, inf and -inf.
    match text.parse::<f64>() {
        Ok(d) if !d.is_finite() => Some(Value::Double(d)),
        _ => text.parse::<i64>().ok().map(Value::Int),
    }
}

pub fn parse(input: &str) -> Result<Predicate, ParseError> {
    Parser::new(input).parse()
}
