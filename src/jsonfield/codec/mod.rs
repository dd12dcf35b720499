//! # Extended-Value Codec
//!
//! Symmetric encode/decode between [`Value`](crate::value::Value) trees and
//! JSON text.
//!
//! The encode side is plain JSON serialization with special-case hooks for the
//! types the base grammar cannot express (dates, times, timestamps, decimals).
//! The decode side parses strict JSON and then runs a recursive post-pass that
//! heuristically upgrades scalars back to the richer types: numbers become
//! decimals (configurable) and strings with a date/time-shaped prefix are
//! re-parsed as dates and times.
//!
//! The pipeline is intentionally asymmetric for ambiguous inputs: a `Decimal`
//! encodes as a JSON string and comes back as a string, and sub-millisecond
//! precision is dropped at encode time. What *is* guaranteed is text-level
//! idempotence — `encode(decode(t))` is stable once `t` has been through one
//! full cycle.

mod decode;
mod encode;

use crate::error::CodecResult;
use crate::value::Value;

/// How decode treats non-integral JSON numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FloatPolicy {
    /// Parse as arbitrary-precision [`Decimal`](rust_decimal::Decimal),
    /// avoiding binary-float precision loss. The default.
    #[default]
    Decimal,
    /// Parse as native `f64`.
    Native,
}

/// Decode-side configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    pub float: FloatPolicy,
}

/// Serialize a value tree to JSON text.
///
/// Output spacing matches the classic encoder default: `", "` between items
/// and `": "` after keys. Map key order is preserved verbatim.
///
/// Fails with [`UnsupportedValue`](crate::error::CodecError::UnsupportedValue)
/// for an offset-carrying time of day and
/// [`NotSerializable`](crate::error::CodecError::NotSerializable) for a
/// non-finite float.
pub fn encode(value: &Value) -> CodecResult<String> {
    encode::encode(value)
}

/// Parse JSON text into a value tree, then upgrade scalars.
///
/// The only error is [`MalformedJson`](crate::error::CodecError::MalformedJson)
/// from the strict top-level parse; heuristic upgrade failures keep the
/// original scalar and are never surfaced.
pub fn decode(text: &str, opts: &DecodeOptions) -> CodecResult<Value> {
    decode::decode(text, opts)
}
