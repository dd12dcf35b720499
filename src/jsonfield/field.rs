//! # Field declaration & lazy materialization
//!
//! [`JsonField`] is the per-declaration configuration of one JSON text
//! column: nullability, default text, database type override, and the codec
//! options used on its values. [`FieldSlot`] is the per-instance cache entry
//! that defers the decode cost until the attribute is actually read.

use crate::codec::{self, DecodeOptions, FloatPolicy};
use crate::error::CodecResult;
use crate::forms::JsonFormField;
use crate::value::Value;

/// When a write through the slot pays the decode cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Materialize {
    /// Store writes verbatim; decode on first read. The default.
    #[default]
    Lazy,
    /// Decode raw text at write time.
    Eager,
}

/// What an empty string (`""`) stored under the field decodes to. Historical
/// behavior disagreed between revisions, so this is an explicit option
/// rather than a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyStringPolicy {
    /// Keep the empty string as a string value. The default, matching the
    /// newest historical behavior.
    #[default]
    Preserve,
    /// Treat it as no value.
    Null,
}

/// Declaration of a JSON-in-a-text-column field.
#[derive(Debug, Clone)]
pub struct JsonField {
    name: String,
    null: bool,
    default: String,
    db_type: Option<String>,
    materialize: Materialize,
    evaluate_formfield: bool,
    empty_strings: EmptyStringPolicy,
    decode_opts: DecodeOptions,
}

impl JsonField {
    /// A lazy, non-nullable field whose stored default is the literal text
    /// `null`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            null: false,
            default: "null".to_string(),
            db_type: None,
            materialize: Materialize::Lazy,
            evaluate_formfield: false,
            empty_strings: EmptyStringPolicy::default(),
            decode_opts: DecodeOptions::default(),
        }
    }

    /// Allow storage NULL; a missing value is then suppressed instead of
    /// being written as the literal text `null`.
    pub fn null(mut self, null: bool) -> Self {
        self.null = null;
        self
    }

    /// Default raw text stored when no value was ever written.
    pub fn default_text(mut self, text: impl Into<String>) -> Self {
        self.default = text.into();
        self
    }

    /// Override the declared database column type.
    pub fn db_type(mut self, ty: impl Into<String>) -> Self {
        self.db_type = Some(ty.into());
        self
    }

    pub fn materialize(mut self, policy: Materialize) -> Self {
        self.materialize = policy;
        self
    }

    /// Let the companion form field accept literal expressions, not just
    /// strict JSON.
    pub fn evaluate_formfield(mut self, on: bool) -> Self {
        self.evaluate_formfield = on;
        self
    }

    pub fn empty_strings(mut self, policy: EmptyStringPolicy) -> Self {
        self.empty_strings = policy;
        self
    }

    pub fn float_policy(mut self, policy: FloatPolicy) -> Self {
        self.decode_opts.float = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_null(&self) -> bool {
        self.null
    }

    pub fn default_value(&self) -> &str {
        &self.default
    }

    pub fn decode_options(&self) -> &DecodeOptions {
        &self.decode_opts
    }

    /// Declared column type: the override if one was given, else `text`.
    pub fn column_type(&self) -> &str {
        self.db_type.as_deref().unwrap_or("text")
    }

    /// Decode stored text into a native value. Empty text follows the
    /// field's [`EmptyStringPolicy`]; malformed JSON is surfaced, never
    /// silently passed through.
    pub fn to_value(&self, text: &str) -> CodecResult<Option<Value>> {
        if text.is_empty() {
            return Ok(match self.empty_strings {
                EmptyStringPolicy::Preserve => Some(Value::Str(String::new())),
                EmptyStringPolicy::Null => None,
            });
        }
        codec::decode(text, &self.decode_opts).map(Some)
    }

    /// Encode a native value to the text the storage layer persists.
    ///
    /// A missing value on a nullable field becomes storage NULL unless
    /// `force` is set (the re-encoding accessors always force).
    pub fn db_prep(&self, value: Option<&Value>, force: bool) -> CodecResult<Option<String>> {
        match value {
            None if self.null && !force => Ok(None),
            None => codec::encode(&Value::Null).map(Some),
            Some(v) => codec::encode(v).map(Some),
        }
    }

    /// Build the companion form field from this declaration.
    pub fn formfield(&self, required: bool) -> JsonFormField {
        JsonFormField::new(required)
            .evaluate(self.evaluate_formfield)
            .decode_options(self.decode_opts)
    }

    /// Non-default constructor parameters as inspectable key/value pairs,
    /// for external schema-migration tooling.
    pub fn describe(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ty) = &self.db_type {
            pairs.push(("db_type", ty.clone()));
        }
        if self.null {
            pairs.push(("null", "true".to_string()));
        }
        if self.default != "null" {
            pairs.push(("default", self.default.clone()));
        }
        if self.materialize == Materialize::Eager {
            pairs.push(("materialize", "eager".to_string()));
        }
        if self.evaluate_formfield {
            pairs.push(("evaluate_formfield", "true".to_string()));
        }
        if self.empty_strings == EmptyStringPolicy::Null {
            pairs.push(("empty_strings", "null".to_string()));
        }
        pairs
    }
}

/// Input accepted by a slot write: raw stored text or an already-native
/// value. `None` in either shape means storage NULL / no value.
#[derive(Debug, Clone)]
pub enum FieldInput {
    Text(Option<String>),
    Native(Option<Value>),
}

impl From<&str> for FieldInput {
    fn from(text: &str) -> Self {
        FieldInput::Text(Some(text.to_string()))
    }
}

impl From<String> for FieldInput {
    fn from(text: String) -> Self {
        FieldInput::Text(Some(text))
    }
}

impl From<Value> for FieldInput {
    fn from(value: Value) -> Self {
        FieldInput::Native(Some(value))
    }
}

impl From<Option<Value>> for FieldInput {
    fn from(value: Option<Value>) -> Self {
        FieldInput::Native(value)
    }
}

#[derive(Debug, Clone)]
enum SlotState {
    Raw(Option<String>),
    Native(Option<Value>),
}

/// Per-instance cache entry: raw storage text until first read, the decoded
/// native value afterwards. Once materialized the raw text is gone, so a
/// second decode is structurally impossible.
#[derive(Debug, Clone)]
pub struct FieldSlot {
    state: SlotState,
    materialized: bool,
}

impl FieldSlot {
    /// Slot holding the field's stored default, not yet materialized.
    pub fn with_default(field: &JsonField) -> Self {
        Self {
            state: SlotState::Raw(Some(field.default_value().to_string())),
            materialized: false,
        }
    }

    /// Slot filled from storage (text or NULL), not yet materialized.
    pub fn from_stored(text: Option<String>) -> Self {
        Self {
            state: SlotState::Raw(text),
            materialized: false,
        }
    }

    pub fn materialized(&self) -> bool {
        self.materialized
    }

    /// Write through the field's materialization policy: lazy stores the
    /// input verbatim and defers any decode to the next read; eager decodes
    /// raw text right away.
    pub fn write(&mut self, input: FieldInput, field: &JsonField) -> CodecResult<()> {
        match field.materialize {
            Materialize::Lazy => {
                self.state = match input {
                    FieldInput::Text(text) => SlotState::Raw(text),
                    FieldInput::Native(value) => SlotState::Native(value),
                };
                self.materialized = false;
            }
            Materialize::Eager => {
                let native = match input {
                    FieldInput::Text(Some(text)) => field.to_value(&text)?,
                    FieldInput::Text(None) => None,
                    FieldInput::Native(value) => value,
                };
                self.state = SlotState::Native(native);
                self.materialized = true;
            }
        }
        Ok(())
    }

    /// Read the native value, decoding raw text on the first call and
    /// returning the cached value on every call after that.
    pub fn read(&mut self, field: &JsonField) -> CodecResult<Option<&Value>> {
        if !self.materialized {
            if let SlotState::Raw(raw) = &self.state {
                let native = match raw.as_deref() {
                    Some(text) => field.to_value(text)?,
                    None => None,
                };
                self.state = SlotState::Native(native);
            }
            self.materialized = true;
        }
        match &self.state {
            SlotState::Native(value) => Ok(value.as_ref()),
            // unreachable once materialized; kept total rather than panicking
            SlotState::Raw(_) => Ok(None),
        }
    }
}
