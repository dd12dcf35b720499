//! # Form-side validation
//!
//! [`JsonFormField`] validates free-text user input before it reaches the
//! storage path. Input must be strict JSON, or — with evaluate mode on — a
//! literal expression (see [`expr`](crate::expr)). Either way the result is
//! normalized through the codec, so whatever a form accepts is guaranteed to
//! encode and re-decode cleanly.

use crate::codec::{self, DecodeOptions};
use crate::error::ValidationError;
use crate::expr;
use crate::value::Value;

const DEFAULT_HELP_TEXT: &str = "Enter a valid JSON object";

/// Companion form field for a [`JsonField`](crate::field::JsonField).
#[derive(Debug, Clone)]
pub struct JsonFormField {
    required: bool,
    evaluate: bool,
    help_text: String,
    decode_opts: DecodeOptions,
}

impl JsonFormField {
    pub fn new(required: bool) -> Self {
        Self {
            required,
            evaluate: false,
            help_text: DEFAULT_HELP_TEXT.to_string(),
            decode_opts: DecodeOptions::default(),
        }
    }

    /// Accept literal expressions in addition to strict JSON.
    pub fn evaluate(mut self, on: bool) -> Self {
        self.evaluate = on;
        self
    }

    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = text.into();
        self
    }

    pub fn decode_options(mut self, opts: DecodeOptions) -> Self {
        self.decode_opts = opts;
        self
    }

    /// Validate raw user input into a value.
    ///
    /// Absent or blank input short-circuits: `Ok(None)` on an optional
    /// field, [`ValidationError::Required`] otherwise. Bare newlines are
    /// stripped before parsing; legally escaped newlines inside JSON string
    /// content are unaffected.
    pub fn clean(&self, raw: Option<&str>) -> Result<Option<Value>, ValidationError> {
        let raw = match raw {
            Some(r) if !r.trim().is_empty() => r,
            _ => {
                return if self.required {
                    Err(ValidationError::Required)
                } else {
                    Ok(None)
                };
            }
        };

        let cleaned: String = raw.chars().filter(|c| *c != '\r' && *c != '\n').collect();

        let text = if self.evaluate {
            let value = expr::eval(&cleaned).map_err(|e| self.invalid(e))?;
            codec::encode(&value).map_err(|e| self.invalid(e))?
        } else {
            cleaned
        };

        // Confirm the (possibly re-encoded) text parses cleanly; this is the
        // value the storage path will see.
        codec::decode(&text, &self.decode_opts)
            .map(Some)
            .map_err(|e| self.invalid(e))
    }

    fn invalid(&self, cause: impl std::fmt::Display) -> ValidationError {
        ValidationError::Invalid {
            help: self.help_text.clone(),
            cause: cause.to_string(),
        }
    }
}
