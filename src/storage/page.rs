pub mod heap_page;

use crate::catalog::TableId;
use crate::storage::error::StorageResult;
use crate::transaction::TransactionId;
use bytes::Bytes;
use std::fmt;

/// Identifies a page: the table it belongs to and its position in that
/// table's file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId {
    pub table_id: TableId,
    pub page_no: u32,
}

impl PageId {
    pub fn new(table_id: TableId, page_no: u32) -> Self {
        Self { table_id, page_no }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.table_id.0, self.page_no)
    }
}

/// Operations a buffer manager needs from any cached page.
pub trait Page: Sized {
    fn page_id(&self) -> PageId;

    /// Serialize the page to exactly the declared page size.
    fn to_bytes(&self) -> StorageResult<Bytes>;

    /// Record (or clear) the transaction that dirtied this page.
    fn mark_dirty(&mut self, dirty: bool, txn: TransactionId);

    /// The transaction that last dirtied the page, `None` when clean.
    fn dirty_owner(&self) -> Option<TransactionId>;

    /// The page as it was at the last before-image capture.
    fn before_image(&self) -> StorageResult<Self>;

    /// Make the current contents the new before-image baseline.
    fn capture_before_image(&self) -> StorageResult<()>;
}

pub use heap_page::HeapPage;
