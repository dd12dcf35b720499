use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use rust_decimal::Decimal;

/// A JSON value extended with the types a text column round-trip has to carry:
/// arbitrary-precision decimals, calendar dates, times of day, and timestamps.
///
/// Plain JSON scalars map onto `Null`/`Bool`/`Int`/`Float`/`Str`; the extended
/// scalars are produced either by the application or by the decoder's
/// heuristic upgrade pass (see `codec::decode`).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    /// Native binary float. Only produced on decode under
    /// [`FloatPolicy::Native`](crate::codec::FloatPolicy); the default number
    /// mode recovers non-integral numbers as `Decimal` instead.
    Float(f64),
    /// Arbitrary-precision base-10 decimal. Encodes as a JSON *string* so the
    /// digits never pass through binary floating point.
    Decimal(Decimal),
    Str(String),
    Date(NaiveDate),
    /// Time of day. An offset-carrying time cannot be encoded (JSON has no
    /// representation for it); the encoder rejects it.
    Time {
        time: NaiveTime,
        offset: Option<FixedOffset>,
    },
    /// Date + time of day with an optional UTC offset.
    DateTime {
        stamp: NaiveDateTime,
        offset: Option<FixedOffset>,
    },
    List(Vec<Value>),
    /// String-keyed mapping. Insertion order is preserved through a full
    /// encode/decode cycle.
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Naive time of day (the only kind the encoder accepts).
    pub fn time(time: NaiveTime) -> Self {
        Value::Time { time, offset: None }
    }

    /// Naive timestamp without a UTC offset.
    pub fn datetime(stamp: NaiveDateTime) -> Self {
        Value::DateTime {
            stamp,
            offset: None,
        }
    }

    /// Timestamp pinned to a UTC offset. A zero offset renders as `Z`.
    pub fn datetime_tz(stamp: NaiveDateTime, offset: FixedOffset) -> Self {
        Value::DateTime {
            stamp,
            offset: Some(offset),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveTime> for Value {
    fn from(t: NaiveTime) -> Self {
        Value::time(t)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::datetime(dt)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(entries: IndexMap<String, Value>) -> Self {
        Value::Map(entries)
    }
}

impl<V: Into<Value>> FromIterator<(String, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Value::Map(iter.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}
