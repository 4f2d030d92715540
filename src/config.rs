//! Storage configuration and persisted table metadata.

use crate::access::error::AccessResult;
use crate::access::schema::{Schema, SchemaField};
use crate::catalog::TableId;
use crate::storage::error::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// Settings fixed for the lifetime of a database instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Size in bytes of every page on disk and in memory.
    pub page_size: usize,
}

impl StorageConfig {
    pub fn new(page_size: usize) -> StorageResult<Self> {
        let config = Self { page_size };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> StorageResult<()> {
        if self.page_size == 0 {
            return Err(StorageError::InvalidPageSize(self.page_size));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Everything needed to reopen a heap file, stored in a `.meta` file beside
/// it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMeta {
    pub table_id: TableId,
    pub fields: Vec<SchemaField>,
    pub storage: StorageConfig,
}

impl TableMeta {
    pub fn new(table_id: TableId, schema: &Schema, storage: StorageConfig) -> Self {
        Self {
            table_id,
            fields: schema.iter().cloned().collect(),
            storage,
        }
    }

    pub fn schema(&self) -> AccessResult<Schema> {
        Schema::new(self.fields.clone())
    }

    /// Metadata path for the heap file at `data_path`.
    pub fn path_for(data_path: &Path) -> PathBuf {
        let mut name = data_path.as_os_str().to_owned();
        name.push(".meta");
        PathBuf::from(name)
    }

    pub fn save(&self, path: &Path) -> StorageResult<()> {
        let bytes = bincode::serialize(self)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    pub fn load(path: &Path) -> StorageResult<Self> {
        let bytes = fs::read(path)?;
        let meta: Self = bincode::deserialize(&bytes)?;
        meta.storage.validate()?;
        Ok(meta)
    }
}
