//! Table scanning functionality for sequential access.

use crate::access::tuple::Tuple;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::heap_file::{DbFile, HeapFile};
use crate::transaction::TransactionId;
use log::debug;
use std::collections::VecDeque;
use std::sync::Arc;

/// Cursor over all rows of one table file.
///
/// Every method other than `open` and `close` fails with
/// [`StorageError::IteratorNotOpen`] until `open` has been called.
pub trait DbFileIterator: Send {
    fn open(&mut self) -> StorageResult<()>;

    fn has_next(&mut self) -> StorageResult<bool>;

    /// Next row. Fails with [`StorageError::NoSuchElement`] when exhausted.
    fn next(&mut self) -> StorageResult<Tuple>;

    /// Restart from the first row.
    fn rewind(&mut self) -> StorageResult<()>;

    fn close(&mut self);
}

struct ScanState {
    next_page: u32,
    buffered: VecDeque<Tuple>,
}

impl ScanState {
    fn start() -> Self {
        Self {
            next_page: 0,
            buffered: VecDeque::new(),
        }
    }
}

/// Iterates a heap file page by page, in slot order within each page.
pub struct HeapFileIterator {
    file: Arc<HeapFile>,
    txn: TransactionId,
    state: Option<ScanState>,
}

impl HeapFileIterator {
    pub fn new(file: Arc<HeapFile>, txn: TransactionId) -> Self {
        Self {
            file,
            txn,
            state: None,
        }
    }
}

impl DbFileIterator for HeapFileIterator {
    fn open(&mut self) -> StorageResult<()> {
        debug!("{} scanning table {}", self.txn, self.file.table_id());
        self.state = Some(ScanState::start());
        Ok(())
    }

    fn has_next(&mut self) -> StorageResult<bool> {
        let state = self.state.as_mut().ok_or(StorageError::IteratorNotOpen)?;
        // Skip over pages with no rows.
        while state.buffered.is_empty() {
            if state.next_page >= self.file.num_pages()? {
                return Ok(false);
            }
            let page = self.file.read_page(state.next_page)?;
            state.buffered.extend(page.iter().cloned());
            state.next_page += 1;
        }
        Ok(true)
    }

    fn next(&mut self) -> StorageResult<Tuple> {
        if !self.has_next()? {
            return Err(StorageError::NoSuchElement);
        }
        self.state
            .as_mut()
            .and_then(|state| state.buffered.pop_front())
            .ok_or(StorageError::NoSuchElement)
    }

    fn rewind(&mut self) -> StorageResult<()> {
        if self.state.is_none() {
            return Err(StorageError::IteratorNotOpen);
        }
        self.state = Some(ScanState::start());
        Ok(())
    }

    fn close(&mut self) {
        self.state = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::schema::Schema;
    use crate::access::value::{FieldType, Value};
    use crate::catalog::TableId;
    use crate::config::StorageConfig;
    use crate::storage::page::Page;
    use anyhow::Result;
    use tempfile::{tempdir, TempDir};

    const TXN: TransactionId = TransactionId(1);

    fn populated_file(rows: i32) -> Result<(TempDir, Arc<HeapFile>)> {
        let dir = tempdir()?;
        let schema = Arc::new(Schema::from_types(&[FieldType::Int])?);
        let file = HeapFile::create(
            &dir.path().join("t.dat"),
            TableId(1),
            schema.clone(),
            StorageConfig::new(100)?,
        )?;
        for i in 0..rows {
            let mut tuple = Tuple::new(schema.clone(), vec![Value::Int(i)])?;
            file.insert_tuple(TXN, &mut tuple)?;
        }
        Ok((dir, Arc::new(file)))
    }

    fn drain(iter: &mut HeapFileIterator) -> Result<Vec<i32>> {
        let mut out = Vec::new();
        while iter.has_next()? {
            match iter.next()?.value(0)? {
                Value::Int(v) => out.push(*v),
                other => panic!("unexpected value {:?}", other),
            }
        }
        Ok(out)
    }

    #[test]
    fn test_requires_open() -> Result<()> {
        let (_dir, file) = populated_file(3)?;
        let mut iter = HeapFileIterator::new(file, TXN);

        assert!(matches!(iter.has_next(), Err(StorageError::IteratorNotOpen)));
        assert!(matches!(iter.next(), Err(StorageError::IteratorNotOpen)));
        assert!(matches!(iter.rewind(), Err(StorageError::IteratorNotOpen)));
        Ok(())
    }

    #[test]
    fn test_scans_across_pages() -> Result<()> {
        let (_dir, file) = populated_file(50)?;
        let mut iter = HeapFileIterator::new(file, TXN);
        iter.open()?;

        assert_eq!(drain(&mut iter)?, (0..50).collect::<Vec<_>>());
        assert!(matches!(iter.next(), Err(StorageError::NoSuchElement)));
        Ok(())
    }

    #[test]
    fn test_skips_empty_pages() -> Result<()> {
        let (_dir, file) = populated_file(30)?;
        for page_no in 0..2 {
            let page = file.allocate_page()?;
            assert_eq!(page.page_id().page_no, 2 + page_no);
        }
        let mut tail = Tuple::new(file.read_page(0)?.schema().clone(), vec![Value::Int(7)])?;
        let mut page = file.read_page(3)?;
        page.insert_tuple(&mut tail)?;
        file.write_page(&page)?;

        let mut iter = HeapFileIterator::new(file, TXN);
        iter.open()?;
        let seen = drain(&mut iter)?;
        assert_eq!(seen.len(), 31);
        assert_eq!(seen.last(), Some(&7));
        Ok(())
    }

    #[test]
    fn test_rewind_and_close() -> Result<()> {
        let (_dir, file) = populated_file(5)?;
        let mut iter = HeapFileIterator::new(file, TXN);
        iter.open()?;

        iter.next()?;
        iter.next()?;
        iter.rewind()?;
        assert_eq!(drain(&mut iter)?, vec![0, 1, 2, 3, 4]);

        iter.close();
        assert!(matches!(iter.has_next(), Err(StorageError::IteratorNotOpen)));
        Ok(())
    }

    #[test]
    fn test_empty_file() -> Result<()> {
        let (_dir, file) = populated_file(0)?;
        let mut iter = HeapFileIterator::new(file, TXN);
        iter.open()?;
        assert!(!iter.has_next()?);
        Ok(())
    }
}
