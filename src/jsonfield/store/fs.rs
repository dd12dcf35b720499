use super::ColumnStore;
use crate::error::{StoreError, StoreResult};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const ROWS_FILENAME: &str = "rows.json";

type Rows = HashMap<Uuid, HashMap<String, Option<String>>>;

/// File-backed row store: all rows live in a single `rows.json` document
/// under the store's root directory. Reads parse the document fresh, writes
/// rewrite it whole — fine for the row counts this store is meant for.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn rows_path(&self) -> PathBuf {
        self.root.join(ROWS_FILENAME)
    }

    fn load_rows(&self) -> StoreResult<Rows> {
        let path = self.rows_path();
        if !path.exists() {
            return Ok(Rows::new());
        }
        let content = fs::read_to_string(&path).map_err(StoreError::Io)?;
        serde_json::from_str(&content).map_err(StoreError::Serialization)
    }

    fn save_rows(&self, rows: &Rows) -> StoreResult<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(StoreError::Io)?;
        }
        let content = serde_json::to_string_pretty(rows).map_err(StoreError::Serialization)?;
        fs::write(self.rows_path(), content).map_err(StoreError::Io)?;
        Ok(())
    }
}

impl ColumnStore for FileStore {
    fn write_column(&mut self, row: Uuid, column: &str, text: Option<&str>) -> StoreResult<()> {
        let mut rows = self.load_rows()?;
        rows.entry(row)
            .or_default()
            .insert(column.to_string(), text.map(str::to_string));
        self.save_rows(&rows)
    }

    fn read_column(&self, row: Uuid, column: &str) -> StoreResult<Option<String>> {
        let rows = self.load_rows()?;
        let columns = rows.get(&row).ok_or(StoreError::RowNotFound(row))?;
        Ok(columns.get(column).cloned().flatten())
    }

    fn delete_row(&mut self, row: Uuid) -> StoreResult<()> {
        let mut rows = self.load_rows()?;
        rows.remove(&row).ok_or(StoreError::RowNotFound(row))?;
        self.save_rows(&rows)
    }

    fn rows(&self) -> StoreResult<Vec<Uuid>> {
        Ok(self.load_rows()?.keys().copied().collect())
    }
}
