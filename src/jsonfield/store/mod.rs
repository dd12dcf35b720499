//! # Storage Layer
//!
//! The relational collaborator behind the field is reduced to the only
//! contract the core needs: read and write a named text column of a row.
//! The codec never inspects row or table structure, and the store never
//! inspects the text it carries.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: rows persisted as a single JSON document in a
//!   directory (`rows.json`)
//! - [`memory::MemoryStore`]: in-memory rows for testing
//!
//! A column holds `Option<String>`: `None` is storage NULL, distinct from
//! the literal text `null` that a non-nullable field stores for a missing
//! value.

use crate::error::StoreResult;
use uuid::Uuid;

pub mod fs;
pub mod memory;

/// Abstract interface to the text columns of a row store.
pub trait ColumnStore {
    /// Write one column of a row, creating the row if needed. `None` writes
    /// storage NULL.
    fn write_column(&mut self, row: Uuid, column: &str, text: Option<&str>) -> StoreResult<()>;

    /// Read one column of a row. `Ok(None)` means storage NULL (or a column
    /// never written); a missing row is an error.
    fn read_column(&self, row: Uuid, column: &str) -> StoreResult<Option<String>>;

    /// Delete a row permanently.
    fn delete_row(&mut self, row: Uuid) -> StoreResult<()>;

    /// All row ids currently present.
    fn rows(&self) -> StoreResult<Vec<Uuid>>;
}
