//! One file of fixed-size heap pages per table.
//!
//! Page `n` lives at byte offset `n * page_size`. There is no buffering here:
//! every call reads or writes the file directly, and callers serialize
//! concurrent mutation of the same table.

use crate::access::scan::{DbFileIterator, HeapFileIterator};
use crate::access::schema::Schema;
use crate::access::tuple::{Tuple, TupleId};
use crate::catalog::TableId;
use crate::config::StorageConfig;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::page::heap_page::empty_page_data;
use crate::storage::page::{HeapPage, Page, PageId};
use crate::transaction::TransactionId;
use log::{debug, warn};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Arc;

/// A table's storage as seen by the catalog and by scans.
pub trait DbFile: Send + Sync {
    fn table_id(&self) -> TableId;

    fn schema(&self) -> Arc<Schema>;

    /// Iterator over every row of the table on behalf of `txn`.
    fn iterator(self: Arc<Self>, txn: TransactionId) -> Box<dyn DbFileIterator>;
}

pub struct HeapFile {
    file: Mutex<File>,
    table_id: TableId,
    schema: Arc<Schema>,
    config: StorageConfig,
}

impl HeapFile {
    /// Create an empty heap file, truncating any existing file at `path`.
    pub fn create(
        path: &Path,
        table_id: TableId,
        schema: Arc<Schema>,
        config: StorageConfig,
    ) -> StorageResult<Self> {
        config.validate()?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            file: Mutex::new(file),
            table_id,
            schema,
            config,
        })
    }

    pub fn open(
        path: &Path,
        table_id: TableId,
        schema: Arc<Schema>,
        config: StorageConfig,
    ) -> StorageResult<Self> {
        config.validate()?;
        let file = OpenOptions::new().read(true).write(true).open(path)?;

        Ok(Self {
            file: Mutex::new(file),
            table_id,
            schema,
            config,
        })
    }

    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    pub fn num_pages(&self) -> StorageResult<u32> {
        let file_size = self.file.lock().metadata()?.len();
        let page_size = self.page_size() as u64;
        if file_size % page_size != 0 {
            warn!(
                "Table {} file has {} trailing bytes past the last full page",
                self.table_id,
                file_size % page_size
            );
        }
        Ok((file_size / page_size) as u32)
    }

    pub fn read_page(&self, page_no: u32) -> StorageResult<HeapPage> {
        let page_id = PageId::new(self.table_id, page_no);
        let page_size = self.page_size();
        let offset = Self::page_offset(page_no, page_size);

        let mut buf = vec![0u8; page_size];
        {
            let mut file = self.file.lock();
            if offset + page_size as u64 > file.metadata()?.len() {
                return Err(StorageError::PageNotFound(page_id));
            }
            file.seek(SeekFrom::Start(offset))?;
            file.read_exact(&mut buf)?;
        }

        HeapPage::from_bytes(page_id, self.schema.clone(), &buf, page_size)
    }

    pub fn write_page(&self, page: &HeapPage) -> StorageResult<()> {
        let page_id = page.page_id();
        if page_id.table_id != self.table_id {
            return Err(StorageError::PageNotFound(page_id));
        }
        if page.page_size() != self.page_size() {
            return Err(StorageError::PageSizeMismatch {
                expected: self.page_size(),
                actual: page.page_size(),
            });
        }

        let data = page.to_bytes()?;
        let offset = Self::page_offset(page_id.page_no, self.page_size());

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&data)?;
        file.sync_all()?;
        debug!("Wrote page {}", page_id);
        Ok(())
    }

    /// Append an empty page to the end of the file.
    pub fn allocate_page(&self) -> StorageResult<HeapPage> {
        let page_no = self.num_pages()?;
        let page_id = PageId::new(self.table_id, page_no);
        let page_size = self.page_size();
        let data = empty_page_data(page_size);

        {
            let mut file = self.file.lock();
            file.seek(SeekFrom::Start(Self::page_offset(page_no, page_size)))?;
            file.write_all(&data)?;
            file.sync_all()?;
        }
        debug!("Allocated page {}", page_id);

        HeapPage::from_bytes(page_id, self.schema.clone(), &data, page_size)
    }

    /// Insert `tuple` into the first page with a free slot, growing the file
    /// when every page is full.
    pub fn insert_tuple(&self, txn: TransactionId, tuple: &mut Tuple) -> StorageResult<TupleId> {
        // A rejected row must never grow the file.
        if **tuple.schema() != *self.schema {
            return Err(StorageError::SchemaMismatch {
                table_id: self.table_id,
            });
        }

        for page_no in 0..self.num_pages()? {
            let mut page = self.read_page(page_no)?;
            match page.insert_tuple(tuple) {
                Ok(tuple_id) => {
                    self.flush(&mut page, txn)?;
                    return Ok(tuple_id);
                }
                Err(StorageError::PageFull { .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        let mut page = self.allocate_page()?;
        debug!(
            "Table {} full, spilling to new page {}",
            self.table_id,
            page.page_id()
        );
        let tuple_id = page.insert_tuple(tuple)?;
        self.flush(&mut page, txn)?;
        Ok(tuple_id)
    }

    /// Delete `tuple` from the page its locator names.
    pub fn delete_tuple(&self, txn: TransactionId, tuple: &mut Tuple) -> StorageResult<()> {
        let tuple_id = tuple.tuple_id().ok_or(StorageError::TupleNotFound)?;
        if tuple_id.page_id.table_id != self.table_id {
            return Err(StorageError::TupleNotFound);
        }

        let mut page = self.read_page(tuple_id.page_id.page_no)?;
        page.delete_tuple(tuple)?;
        self.flush(&mut page, txn)
    }

    fn flush(&self, page: &mut HeapPage, txn: TransactionId) -> StorageResult<()> {
        page.mark_dirty(true, txn);
        self.write_page(page)?;
        page.mark_dirty(false, txn);
        Ok(())
    }

    fn page_offset(page_no: u32, page_size: usize) -> u64 {
        page_no as u64 * page_size as u64
    }
}

impl DbFile for HeapFile {
    fn table_id(&self) -> TableId {
        self.table_id
    }

    fn schema(&self) -> Arc<Schema> {
        self.schema.clone()
    }

    fn iterator(self: Arc<Self>, txn: TransactionId) -> Box<dyn DbFileIterator> {
        Box::new(HeapFileIterator::new(self, txn))
    }
}
