use super::ColumnStore;
use crate::error::{StoreError, StoreResult};
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory row store for testing. No persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: HashMap<Uuid, HashMap<String, Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ColumnStore for MemoryStore {
    fn write_column(&mut self, row: Uuid, column: &str, text: Option<&str>) -> StoreResult<()> {
        self.rows
            .entry(row)
            .or_default()
            .insert(column.to_string(), text.map(str::to_string));
        Ok(())
    }

    fn read_column(&self, row: Uuid, column: &str) -> StoreResult<Option<String>> {
        let columns = self.rows.get(&row).ok_or(StoreError::RowNotFound(row))?;
        Ok(columns.get(column).cloned().flatten())
    }

    fn delete_row(&mut self, row: Uuid) -> StoreResult<()> {
        self.rows
            .remove(&row)
            .map(|_| ())
            .ok_or(StoreError::RowNotFound(row))
    }

    fn rows(&self) -> StoreResult<Vec<Uuid>> {
        Ok(self.rows.keys().copied().collect())
    }
}
