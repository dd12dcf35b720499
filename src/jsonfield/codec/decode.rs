use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use super::{DecodeOptions, FloatPolicy};
use crate::error::CodecResult;
use crate::value::Value;

// Anchored prefix patterns for heuristic string upgrade. A match only means
// "worth attempting a full parse"; the parse itself decides.
static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}:\d{2}:\d{2}").expect("valid pattern"));
static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("valid pattern"));
static DATETIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T").expect("valid pattern"));

pub(crate) fn decode(text: &str, opts: &DecodeOptions) -> CodecResult<Value> {
    // The strict grammar parse is the only fallible step.
    let tree: serde_json::Value = serde_json::from_str(text)?;
    Ok(upgrade(tree, opts))
}

/// Recursive post-pass over the parsed tree. Containers recurse into their
/// children; scalar leaves get a best-effort upgrade to the richer types.
fn upgrade(node: serde_json::Value, opts: &DecodeOptions) -> Value {
    use serde_json::Value as Json;

    match node {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => upgrade_number(&n, opts),
        Json::String(s) => upgrade_string(s),
        Json::Array(items) => {
            Value::List(items.into_iter().map(|v| upgrade(v, opts)).collect())
        }
        Json::Object(map) => Value::Map(
            map.into_iter()
                .map(|(key, val)| (key, upgrade(val, opts)))
                .collect(),
        ),
    }
}

/// Numbers keep their source token (`arbitrary_precision`), so decimal
/// recovery sees the digits exactly as written.
fn upgrade_number(n: &serde_json::Number, opts: &DecodeOptions) -> Value {
    let token = n.to_string();

    let integral = !token.contains(|c| matches!(c, '.' | 'e' | 'E'));
    if integral {
        if let Ok(i) = token.parse::<i64>() {
            return Value::Int(i);
        }
        // Wider than i64; recover the digits as a decimal below.
    }

    match opts.float {
        FloatPolicy::Decimal => parse_decimal(&token)
            .map(Value::Decimal)
            .or_else(|| n.as_f64().map(Value::Float))
            .unwrap_or(Value::Str(token)),
        FloatPolicy::Native => n
            .as_f64()
            .map(Value::Float)
            .or_else(|| parse_decimal(&token).map(Value::Decimal))
            .unwrap_or(Value::Str(token)),
    }
}

fn parse_decimal(token: &str) -> Option<Decimal> {
    Decimal::from_str(token)
        .or_else(|_| Decimal::from_scientific(token))
        .ok()
}

/// Heuristic string upgrade: try the time shape, then the date shape (not
/// followed by `T`), then the datetime shape. A prefix match followed by a
/// failed full-string parse keeps the string verbatim — strings that merely
/// *start* like a timestamp are legitimate data.
fn upgrade_string(s: String) -> Value {
    if TIME_RE.is_match(&s) {
        if let Ok(time) = NaiveTime::from_str(&s) {
            return Value::Time { time, offset: None };
        }
    }
    // The date pattern must not be followed by `T` (that shape belongs to the
    // datetime branch). The regex crate has no lookahead, so check the byte.
    if DATE_RE.is_match(&s) && s.as_bytes().get(10) != Some(&b'T') {
        if let Ok(date) = NaiveDate::from_str(&s) {
            return Value::Date(date);
        }
    }
    if DATETIME_RE.is_match(&s) {
        if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(&s) {
            return Value::DateTime {
                stamp: dt.naive_local(),
                offset: Some(*dt.offset()),
            };
        }
        if let Ok(stamp) = NaiveDateTime::from_str(&s) {
            return Value::DateTime {
                stamp,
                offset: None,
            };
        }
    }
    Value::Str(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode;
    use crate::error::CodecError;
    use chrono::FixedOffset;

    fn dec(text: &str) -> Value {
        decode(text, &DecodeOptions::default()).unwrap()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(dec("null"), Value::Null);
        assert_eq!(dec("true"), Value::Bool(true));
        assert_eq!(dec("123"), Value::Int(123));
        assert_eq!(dec("\"a\""), Value::Str("a".to_string()));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = decode("{not json", &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, CodecError::MalformedJson(_)));
    }

    #[test]
    fn test_numbers_default_to_decimal() {
        assert_eq!(
            dec("1.24"),
            Value::Decimal(Decimal::from_str("1.24").unwrap())
        );
        // Digits survive that f64 would have mangled.
        assert_eq!(
            dec("123.98712634789162349781264"),
            Value::Decimal(Decimal::from_str("123.98712634789162349781264").unwrap())
        );
    }

    #[test]
    fn test_native_float_policy() {
        let opts = DecodeOptions {
            float: FloatPolicy::Native,
        };
        assert_eq!(decode("1.5", &opts).unwrap(), Value::Float(1.5));
        assert_eq!(decode("123", &opts).unwrap(), Value::Int(123));
    }

    #[test]
    fn test_integer_wider_than_i64_recovers_as_decimal() {
        assert_eq!(
            dec("98712634789162349781264"),
            Value::Decimal(Decimal::from_str("98712634789162349781264").unwrap())
        );
    }

    #[test]
    fn test_numerical_strings_stay_strings() {
        assert_eq!(dec("\"555\""), Value::Str("555".to_string()));
        assert_eq!(
            dec("\"123.98712634789162349781264\""),
            Value::Str("123.98712634789162349781264".to_string())
        );
    }

    #[test]
    fn test_time_recovery() {
        assert_eq!(
            dec("\"10:42:07\""),
            Value::time(NaiveTime::from_hms_opt(10, 42, 7).unwrap())
        );
        assert_eq!(
            dec("\"10:42:07.123\""),
            Value::time(NaiveTime::from_hms_milli_opt(10, 42, 7, 123).unwrap())
        );
    }

    #[test]
    fn test_date_recovery() {
        assert_eq!(
            dec("\"2014-01-27\""),
            Value::Date(NaiveDate::from_ymd_opt(2014, 1, 27).unwrap())
        );
    }

    #[test]
    fn test_datetime_recovery() {
        let stamp = NaiveDate::from_ymd_opt(2014, 5, 7)
            .unwrap()
            .and_hms_opt(12, 34, 56)
            .unwrap();
        assert_eq!(dec("\"2014-05-07T12:34:56\""), Value::datetime(stamp));
        assert_eq!(
            dec("\"2014-05-07T12:34:56Z\""),
            Value::datetime_tz(stamp, FixedOffset::east_opt(0).unwrap())
        );
        assert_eq!(
            dec("\"2014-05-07T12:34:56+05:00\""),
            Value::datetime_tz(stamp, FixedOffset::east_opt(5 * 3600).unwrap())
        );
    }

    #[test]
    fn test_datelike_prefixes_stay_strings() {
        // Prefix matches the pattern, full parse fails: keep the data as-is.
        for s in [
            "2014-01-27 | Title with date",
            "10:42:07 | Title with date",
            "10:42:07.123 | Title with date",
            "2014-05-07T12:34:56 | Title with date",
        ] {
            let text = format!("{{\"title\": {}}}", serde_json::to_string(s).unwrap());
            let map = dec(&text);
            assert_eq!(
                map.as_map().unwrap().get("title"),
                Some(&Value::Str(s.to_string())),
                "string {:?} must decode verbatim",
                s
            );
        }
    }

    #[test]
    fn test_invalid_calendar_date_stays_string() {
        assert_eq!(dec("\"2014-13-45\""), Value::Str("2014-13-45".to_string()));
    }

    #[test]
    fn test_containers_recurse() {
        let tree = dec("{\"time\": [\"10:42:07\"]}");
        let list = tree.as_map().unwrap().get("time").unwrap();
        assert_eq!(
            list.as_list().unwrap()[0],
            Value::time(NaiveTime::from_hms_opt(10, 42, 7).unwrap())
        );
    }

    #[test]
    fn test_roundtrip_without_decimals() {
        let v: Value = [
            ("title".to_string(), Value::Str("x".to_string())),
            (
                "when".to_string(),
                Value::Date(NaiveDate::from_ymd_opt(2014, 1, 27).unwrap()),
            ),
            ("n".to_string(), Value::Int(42)),
            ("flag".to_string(), Value::Bool(false)),
            ("none".to_string(), Value::Null),
        ]
        .into_iter()
        .collect();
        let text = encode(&v).unwrap();
        assert_eq!(dec(&text), v);
    }

    #[test]
    fn test_cycle_is_textually_stable() {
        for text in [
            "{\"test\": 123}",
            "[1, 2, 3]",
            "\"2014-05-07T12:34:56Z\"",
            "\"1.24\"",
            "1.24",
        ] {
            let once = encode(&dec(text)).unwrap();
            let twice = encode(&dec(&once)).unwrap();
            assert_eq!(once, twice, "cycling {:?} must stabilize", text);
        }
    }
}
