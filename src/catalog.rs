//! In-memory table catalog.
//!
//! Maps table ids to their names and backing files. Populated by whoever
//! opens the database; the page layer only ever asks it for schemas.

use crate::access::schema::Schema;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::heap_file::DbFile;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableId(pub u32);

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone)]
pub struct TableInfo {
    pub table_id: TableId,
    pub table_name: String,
    pub file: Arc<dyn DbFile>,
}

#[derive(Default)]
pub struct Catalog {
    tables: DashMap<TableId, TableInfo>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table. A table with the same id or name is replaced.
    pub fn add_table(&self, table_name: impl Into<String>, file: Arc<dyn DbFile>) {
        let table_name = table_name.into();
        let table_id = file.table_id();
        self.tables
            .retain(|id, info| *id == table_id || info.table_name != table_name);
        self.tables.insert(
            table_id,
            TableInfo {
                table_id,
                table_name,
                file,
            },
        );
    }

    pub fn table(&self, table_id: TableId) -> StorageResult<TableInfo> {
        self.tables
            .get(&table_id)
            .map(|entry| entry.value().clone())
            .ok_or(StorageError::TableNotFound(table_id))
    }

    pub fn schema(&self, table_id: TableId) -> StorageResult<Arc<Schema>> {
        Ok(self.table(table_id)?.file.schema())
    }

    pub fn table_name(&self, table_id: TableId) -> StorageResult<String> {
        Ok(self.table(table_id)?.table_name)
    }

    pub fn file(&self, table_id: TableId) -> StorageResult<Arc<dyn DbFile>> {
        Ok(self.table(table_id)?.file)
    }

    pub fn table_id(&self, table_name: &str) -> Option<TableId> {
        self.tables
            .iter()
            .find(|entry| entry.value().table_name == table_name)
            .map(|entry| *entry.key())
    }

    pub fn list_tables(&self) -> Vec<TableInfo> {
        let mut tables: Vec<TableInfo> = self.tables.iter().map(|e| e.value().clone()).collect();
        tables.sort_by_key(|t| t.table_id);
        tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::value::FieldType;
    use crate::config::StorageConfig;
    use crate::storage::heap_file::HeapFile;
    use anyhow::Result;
    use tempfile::tempdir;

    fn table(dir: &std::path::Path, id: u32) -> Result<Arc<dyn DbFile>> {
        let schema = Arc::new(Schema::with_names(&[FieldType::Int], &["id"])?);
        let file = HeapFile::create(
            &dir.join(format!("{}.dat", id)),
            TableId(id),
            schema,
            StorageConfig::default(),
        )?;
        Ok(Arc::new(file))
    }

    #[test]
    fn test_add_and_lookup() -> Result<()> {
        let dir = tempdir()?;
        let catalog = Catalog::new();
        catalog.add_table("users", table(dir.path(), 1)?);
        catalog.add_table("orders", table(dir.path(), 2)?);

        assert_eq!(catalog.table_name(TableId(1))?, "users");
        assert_eq!(catalog.table_id("orders"), Some(TableId(2)));
        assert_eq!(catalog.schema(TableId(2))?.field_name(0)?, Some("id"));
        assert_eq!(catalog.list_tables().len(), 2);
        Ok(())
    }

    #[test]
    fn test_unknown_table() {
        let catalog = Catalog::new();
        assert!(matches!(
            catalog.schema(TableId(9)),
            Err(StorageError::TableNotFound(TableId(9)))
        ));
        assert_eq!(catalog.table_id("missing"), None);
    }

    #[test]
    fn test_name_conflict_replaces_older_table() -> Result<()> {
        let dir = tempdir()?;
        let catalog = Catalog::new();
        catalog.add_table("t", table(dir.path(), 1)?);
        catalog.add_table("t", table(dir.path(), 2)?);

        assert_eq!(catalog.table_id("t"), Some(TableId(2)));
        assert!(catalog.table(TableId(1)).is_err());
        Ok(())
    }
}
