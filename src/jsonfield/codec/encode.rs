use std::io;

use chrono::{FixedOffset, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;
use serde_json::ser::Formatter;

use crate::error::{CodecError, CodecResult};
use crate::value::Value;

pub(crate) fn encode(value: &Value) -> CodecResult<String> {
    let tree = to_json(value)?;
    let mut buf = Vec::with_capacity(128);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    tree.serialize(&mut ser)
        .map_err(|e| CodecError::NotSerializable(e.to_string()))?;
    String::from_utf8(buf).map_err(|e| CodecError::NotSerializable(e.to_string()))
}

/// Lower the extended tree to plain JSON, stringifying the types the base
/// grammar cannot express.
fn to_json(value: &Value) -> CodecResult<serde_json::Value> {
    use serde_json::Value as Json;

    Ok(match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(n) => Json::Number((*n).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Json::Number)
            .ok_or_else(|| CodecError::NotSerializable(format!("non-finite float {}", f)))?,
        Value::Decimal(d) => Json::String(d.to_string()),
        Value::Str(s) => Json::String(s.clone()),
        Value::Date(d) => Json::String(d.format("%Y-%m-%d").to_string()),
        Value::Time { time, offset } => {
            // An offset-aware time of day has no ISO rendering inside JSON.
            if offset.is_some() {
                return Err(CodecError::UnsupportedValue(
                    "timezone-aware times".to_string(),
                ));
            }
            Json::String(format_time(time))
        }
        Value::DateTime { stamp, offset } => Json::String(format_datetime(stamp, offset)),
        Value::List(items) => Json::Array(
            items
                .iter()
                .map(to_json)
                .collect::<CodecResult<Vec<_>>>()?,
        ),
        Value::Map(entries) => {
            let mut map = serde_json::Map::with_capacity(entries.len());
            for (key, val) in entries {
                map.insert(key.clone(), to_json(val)?);
            }
            Json::Object(map)
        }
    })
}

/// `HH:MM:SS`, with the fraction truncated to milliseconds and omitted
/// entirely when the microsecond component is zero.
fn format_time(t: &NaiveTime) -> String {
    let micros = t.nanosecond() / 1_000;
    let mut s = t.format("%H:%M:%S").to_string();
    if micros != 0 {
        s.push_str(&format!(".{:03}", micros / 1_000));
    }
    s
}

/// ISO-8601 timestamp. Same fraction rule as times; a zero offset renders as
/// `Z` rather than `+00:00`.
fn format_datetime(stamp: &NaiveDateTime, offset: &Option<FixedOffset>) -> String {
    let micros = stamp.nanosecond() / 1_000;
    let mut s = stamp.format("%Y-%m-%dT%H:%M:%S").to_string();
    if micros != 0 {
        s.push_str(&format!(".{:03}", micros / 1_000));
    }
    match offset {
        None => {}
        Some(off) if off.local_minus_utc() == 0 => s.push('Z'),
        Some(off) => s.push_str(&off.to_string()),
    }
    s
}

/// Reproduces the classic `", "` / `": "` separator defaults so stored text
/// stays byte-identical with historically persisted rows.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}
