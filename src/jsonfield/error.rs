use thiserror::Error;
use uuid::Uuid;

/// Errors from the encode/decode pipeline.
///
/// Heuristic upgrade failures (a string that looks like a date but does not
/// fully parse as one) are deliberately *not* errors; the decoder keeps the
/// original scalar in that case.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The top-level text failed the strict JSON grammar.
    #[error("malformed JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    /// The value exists in the model but has no JSON representation
    /// (an offset-carrying time of day).
    #[error("JSON can't represent {0}")]
    UnsupportedValue(String),

    /// No serializer hook matched (a non-finite float).
    #[error("not JSON serializable: {0}")]
    NotSerializable(String),
}

pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Errors from the storage layer and the model binding built on it.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Row not found: {0}")]
    RowNotFound(Uuid),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors from the literal-expression evaluator.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExprError {
    #[error("syntax error at offset {pos}: {msg}")]
    Syntax { pos: usize, msg: String },

    #[error("name '{0}' is not defined")]
    UnknownName(String),

    #[error("invalid arguments to {0}()")]
    BadArguments(String),
}

pub type ExprResult<T> = std::result::Result<T, ExprError>;

/// Form-side validation failure. Never raised from the storage-path codec;
/// underlying codec and expression errors surface here with their message
/// attached to the field's help text.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("This field is required.")]
    Required,

    #[error("{help} (Caught \"{cause}\")")]
    Invalid { help: String, cause: String },
}
