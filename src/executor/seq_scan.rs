//! Sequential scan executor implementation.

use crate::access::scan::DbFileIterator;
use crate::access::schema::Schema;
use crate::access::tuple::Tuple;
use crate::catalog::{Catalog, TableId};
use crate::executor::Executor;
use crate::storage::error::StorageResult;
use crate::transaction::TransactionId;
use std::sync::Arc;

/// Reads every row of a table in storage order.
pub struct SeqScan {
    table_id: TableId,
    table_name: String,
    alias: String,
    schema: Schema,
    iter: Box<dyn DbFileIterator>,
}

impl SeqScan {
    /// Create a scan of `table_id` running as part of `txn`. Field names of
    /// the output schema are prefixed with `alias`, which defaults to the
    /// table name.
    pub fn new(
        catalog: &Catalog,
        txn: TransactionId,
        table_id: TableId,
        alias: Option<&str>,
    ) -> StorageResult<Self> {
        let table = catalog.table(table_id)?;
        let alias = alias.map_or_else(|| table.table_name.clone(), str::to_string);
        let schema = aliased_schema(&table.file.schema(), &alias);
        let iter = Arc::clone(&table.file).iterator(txn);

        Ok(Self {
            table_id,
            table_name: table.table_name,
            alias,
            schema,
            iter,
        })
    }

    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }
}

fn aliased_schema(schema: &Schema, alias: &str) -> Schema {
    schema.rename_fields(|name| Some(format!("{}.{}", alias, name.unwrap_or("null"))))
}

impl Executor for SeqScan {
    fn open(&mut self) -> StorageResult<()> {
        self.iter.open()
    }

    fn has_next(&mut self) -> StorageResult<bool> {
        self.iter.has_next()
    }

    fn next(&mut self) -> StorageResult<Tuple> {
        self.iter.next()
    }

    fn rewind(&mut self) -> StorageResult<()> {
        self.iter.rewind()
    }

    fn close(&mut self) {
        self.iter.close()
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }
}
