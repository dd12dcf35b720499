//! # jsonfield Architecture
//!
//! jsonfield stores arbitrary structured values as JSON text inside a
//! relational text column, and gets them back out again. The storage layer
//! only ever sees opaque text; everything interesting happens in the codec
//! and in the lazy materialization around it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Forms (forms.rs + expr.rs)                                 │
//! │  - Validates user-typed JSON or literal expressions         │
//! │  - Normalizes through the codec before anything is stored   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Model Binding (model.rs)                                   │
//! │  - Per-instance slot table, one lazy entry per field        │
//! │  - get_json / set_json accessors, save/load plumbing        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Field + Codec (field.rs, codec/)                           │
//! │  - Encode: extended values → JSON text (dates, decimals)    │
//! │  - Decode: JSON text → extended values, heuristic upgrade   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Abstract ColumnStore trait over "text column of a row"   │
//! │  - FileStore (persistent), MemoryStore (testing)            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: Decode Late, Decode Once
//!
//! Loading a row costs nothing per field: slots hold raw text until the
//! attribute is actually read, decode exactly once, and serve the cached
//! value from then on. Writes follow the field's policy — lazy by default,
//! eager when configured.
//!
//! ## Known Asymmetries (by design)
//!
//! - Decimals encode as JSON *strings* (no binary-float corruption) and
//!   decode back as strings; only bare JSON numbers are recovered as
//!   decimals.
//! - Sub-millisecond precision is dropped at encode time.
//! - A string that merely *starts* like a date stays a string — the
//!   heuristic upgrade requires the whole string to parse.
//!
//! The guarantee that holds everywhere: once text has been through one full
//! encode/decode cycle, further cycles are byte-identical.
//!
//! ## Module Overview
//!
//! - [`value`]: The extended value model (`Value`)
//! - [`codec`]: Encode/decode between values and JSON text
//! - [`field`]: Field declarations and the lazy cache slot
//! - [`model`]: Model/instance binding over a column store
//! - [`store`]: Storage abstraction and implementations
//! - [`forms`]: Form-side validation
//! - [`expr`]: Literal-expression evaluator for evaluate-mode forms
//! - [`error`]: Error types

pub mod codec;
pub mod error;
pub mod expr;
pub mod field;
pub mod forms;
pub mod model;
pub mod store;
pub mod value;

pub use codec::{decode, encode, DecodeOptions, FloatPolicy};
pub use error::{CodecError, ExprError, StoreError, ValidationError};
pub use field::{EmptyStringPolicy, FieldInput, FieldSlot, JsonField, Materialize};
pub use forms::JsonFormField;
pub use model::{Instance, Model};
pub use store::ColumnStore;
pub use value::Value;
