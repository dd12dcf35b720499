//! # Literal-expression evaluator
//!
//! A small recursive-descent parser over a literal-only grammar: JSON values
//! (with a few human-typed relaxations — single-quoted strings, trailing
//! commas, the `None`/`True`/`False` spellings) plus a fixed allow-list of
//! date/time/decimal constructors. There is no general evaluator and no
//! sandbox to escape; anything outside the grammar is rejected.
//!
//! Allowed constructors:
//!
//! - `datetime.date(y, m, d)`
//! - `datetime.time(h, m, s[, micro])` (arguments default to zero)
//! - `datetime.datetime(y, mo, d[, h, mi, s[, micro]])`
//! - `datetime.datetime.now()` / `datetime.datetime.utcnow()`
//! - `Decimal("1.24")` / `Decimal(1)`

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{ExprError, ExprResult};
use crate::value::Value;

/// Evaluate a literal expression into a value.
pub fn eval(text: &str) -> ExprResult<Value> {
    let mut p = Parser {
        src: text.as_bytes(),
        pos: 0,
    };
    p.skip_ws();
    let value = p.value()?;
    p.skip_ws();
    if p.pos < p.src.len() {
        return Err(p.err("unexpected trailing input"));
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek();
        if b.is_some() {
            self.pos += 1;
        }
        b
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    fn err(&self, msg: &str) -> ExprError {
        ExprError::Syntax {
            pos: self.pos,
            msg: msg.to_string(),
        }
    }

    fn expect(&mut self, b: u8) -> ExprResult<()> {
        if self.peek() == Some(b) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.err(&format!("expected '{}'", b as char)))
        }
    }

    fn value(&mut self) -> ExprResult<Value> {
        match self.peek() {
            Some(b'{') => self.map(),
            Some(b'[') => self.list(),
            Some(b'"') | Some(b'\'') => self.string().map(Value::Str),
            Some(b'-') => self.number(),
            Some(c) if c.is_ascii_digit() => self.number(),
            Some(c) if c == b'_' || c.is_ascii_alphabetic() => self.name(),
            Some(_) => Err(self.err("expected a value")),
            None => Err(self.err("unexpected end of input")),
        }
    }

    fn map(&mut self) -> ExprResult<Value> {
        self.expect(b'{')?;
        let mut entries = indexmap::IndexMap::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(b'}') {
                self.pos += 1;
                return Ok(Value::Map(entries));
            }
            let key = match self.peek() {
                Some(b'"') | Some(b'\'') => self.string()?,
                _ => return Err(self.err("expected a string key")),
            };
            self.skip_ws();
            self.expect(b':')?;
            self.skip_ws();
            let value = self.value()?;
            entries.insert(key, value);
            self.skip_ws();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                }
                Some(b'}') => {}
                _ => return Err(self.err("expected ',' or '}'")),
            }
        }
    }

    fn list(&mut self) -> ExprResult<Value> {
        self.expect(b'[')?;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(b']') {
                self.pos += 1;
                return Ok(Value::List(items));
            }
            items.push(self.value()?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                }
                Some(b']') => {}
                _ => return Err(self.err("expected ',' or ']'")),
            }
        }
    }

    fn string(&mut self) -> ExprResult<String> {
        let quote = self.bump().ok_or_else(|| self.err("expected a string"))?;
        let mut out = Vec::new();
        loop {
            match self.bump() {
                None => return Err(self.err("unterminated string")),
                Some(b) if b == quote => break,
                Some(b'\\') => match self.bump() {
                    Some(b'n') => out.push(b'\n'),
                    Some(b't') => out.push(b'\t'),
                    Some(b'r') => out.push(b'\r'),
                    Some(b'b') => out.push(0x08),
                    Some(b'f') => out.push(0x0c),
                    Some(b'/') => out.push(b'/'),
                    Some(b'\\') => out.push(b'\\'),
                    Some(b'"') => out.push(b'"'),
                    Some(b'\'') => out.push(b'\''),
                    Some(b'u') => {
                        let c = self.unicode_escape()?;
                        let mut buf = [0u8; 4];
                        out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                    }
                    _ => return Err(self.err("invalid escape")),
                },
                Some(b) => out.push(b),
            }
        }
        String::from_utf8(out).map_err(|_| self.err("invalid UTF-8 in string"))
    }

    fn hex4(&mut self) -> ExprResult<u16> {
        let mut n: u16 = 0;
        for _ in 0..4 {
            let d = self
                .bump()
                .and_then(|b| (b as char).to_digit(16))
                .ok_or_else(|| self.err("invalid \\u escape"))?;
            n = (n << 4) | d as u16;
        }
        Ok(n)
    }

    fn unicode_escape(&mut self) -> ExprResult<char> {
        let high = self.hex4()?;
        if (0xD800..=0xDBFF).contains(&high) {
            // surrogate pair
            if self.bump() != Some(b'\\') || self.bump() != Some(b'u') {
                return Err(self.err("unpaired surrogate"));
            }
            let low = self.hex4()?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(self.err("unpaired surrogate"));
            }
            let c = 0x10000 + (((high - 0xD800) as u32) << 10) + (low - 0xDC00) as u32;
            char::from_u32(c).ok_or_else(|| self.err("invalid \\u escape"))
        } else {
            char::from_u32(high as u32).ok_or_else(|| self.err("invalid \\u escape"))
        }
    }

    fn number(&mut self) -> ExprResult<Value> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        let mut integral = true;
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' => self.pos += 1,
                b'.' | b'e' | b'E' => {
                    integral = false;
                    self.pos += 1;
                }
                b'+' | b'-' if !integral => self.pos += 1,
                _ => break,
            }
        }
        let token = std::str::from_utf8(&self.src[start..self.pos])
            .map_err(|_| self.err("invalid number"))?;
        if integral {
            if let Ok(i) = token.parse::<i64>() {
                return Ok(Value::Int(i));
            }
        }
        token
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| self.err("invalid number"))
    }

    fn ident(&mut self) -> ExprResult<String> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == b'_' || b.is_ascii_alphanumeric() {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(self.err("expected an identifier"));
        }
        Ok(String::from_utf8_lossy(&self.src[start..self.pos]).into_owned())
    }

    fn name(&mut self) -> ExprResult<Value> {
        let mut path = vec![self.ident()?];
        while self.peek() == Some(b'.') {
            self.pos += 1;
            path.push(self.ident()?);
        }
        self.skip_ws();
        if self.peek() == Some(b'(') {
            let args = self.arguments()?;
            return construct(&path, args);
        }
        if path.len() == 1 {
            match path[0].as_str() {
                "null" | "None" => return Ok(Value::Null),
                "true" | "True" => return Ok(Value::Bool(true)),
                "false" | "False" => return Ok(Value::Bool(false)),
                _ => {}
            }
        }
        Err(ExprError::UnknownName(path[0].clone()))
    }

    fn arguments(&mut self) -> ExprResult<Vec<Value>> {
        self.expect(b'(')?;
        let mut args = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(b')') {
                self.pos += 1;
                return Ok(args);
            }
            args.push(self.value()?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                }
                Some(b')') => {}
                _ => return Err(self.err("expected ',' or ')'")),
            }
        }
    }
}

fn construct(path: &[String], args: Vec<Value>) -> ExprResult<Value> {
    let dotted = path.join(".");
    match dotted.as_str() {
        "datetime.date" => {
            if args.len() != 3 {
                return Err(ExprError::BadArguments(dotted));
            }
            let y = int_arg(&args, 0, &dotted)?;
            let m = uint_arg(&args, 1, &dotted)?;
            let d = uint_arg(&args, 2, &dotted)?;
            let y = i32::try_from(y).map_err(|_| ExprError::BadArguments(dotted.clone()))?;
            NaiveDate::from_ymd_opt(y, m, d)
                .map(Value::Date)
                .ok_or(ExprError::BadArguments(dotted))
        }
        "datetime.time" => {
            if args.len() > 4 {
                return Err(ExprError::BadArguments(dotted));
            }
            let h = opt_uint_arg(&args, 0, &dotted)?;
            let m = opt_uint_arg(&args, 1, &dotted)?;
            let s = opt_uint_arg(&args, 2, &dotted)?;
            let micro = opt_uint_arg(&args, 3, &dotted)?;
            chrono::NaiveTime::from_hms_micro_opt(h, m, s, micro)
                .map(Value::time)
                .ok_or(ExprError::BadArguments(dotted))
        }
        "datetime.datetime" => {
            if !(3..=7).contains(&args.len()) {
                return Err(ExprError::BadArguments(dotted));
            }
            let y = int_arg(&args, 0, &dotted)?;
            let y = i32::try_from(y).map_err(|_| ExprError::BadArguments(dotted.clone()))?;
            let mo = uint_arg(&args, 1, &dotted)?;
            let d = uint_arg(&args, 2, &dotted)?;
            let h = opt_uint_arg(&args, 3, &dotted)?;
            let mi = opt_uint_arg(&args, 4, &dotted)?;
            let s = opt_uint_arg(&args, 5, &dotted)?;
            let micro = opt_uint_arg(&args, 6, &dotted)?;
            NaiveDate::from_ymd_opt(y, mo, d)
                .and_then(|date| date.and_hms_micro_opt(h, mi, s, micro))
                .map(Value::datetime)
                .ok_or(ExprError::BadArguments(dotted))
        }
        "datetime.datetime.now" => {
            if !args.is_empty() {
                return Err(ExprError::BadArguments(dotted));
            }
            Ok(Value::datetime(chrono::Local::now().naive_local()))
        }
        "datetime.datetime.utcnow" => {
            if !args.is_empty() {
                return Err(ExprError::BadArguments(dotted));
            }
            Ok(Value::datetime(chrono::Utc::now().naive_utc()))
        }
        "Decimal" => {
            if args.len() != 1 {
                return Err(ExprError::BadArguments(dotted));
            }
            match &args[0] {
                Value::Str(s) => Decimal::from_str(s)
                    .or_else(|_| Decimal::from_scientific(s))
                    .map(Value::Decimal)
                    .map_err(|_| ExprError::BadArguments(dotted)),
                Value::Int(i) => Ok(Value::Decimal(Decimal::from(*i))),
                Value::Float(f) => Decimal::try_from(*f)
                    .map(Value::Decimal)
                    .map_err(|_| ExprError::BadArguments(dotted)),
                _ => Err(ExprError::BadArguments(dotted)),
            }
        }
        _ => Err(ExprError::UnknownName(path[0].clone())),
    }
}

fn int_arg(args: &[Value], i: usize, ctor: &str) -> ExprResult<i64> {
    match args.get(i) {
        Some(Value::Int(n)) => Ok(*n),
        _ => Err(ExprError::BadArguments(ctor.to_string())),
    }
}

fn uint_arg(args: &[Value], i: usize, ctor: &str) -> ExprResult<u32> {
    let n = int_arg(args, i, ctor)?;
    u32::try_from(n).map_err(|_| ExprError::BadArguments(ctor.to_string()))
}

fn opt_uint_arg(args: &[Value], i: usize, ctor: &str) -> ExprResult<u32> {
    if i < args.len() {
        uint_arg(args, i, ctor)
    } else {
        Ok(0)
    }
}
