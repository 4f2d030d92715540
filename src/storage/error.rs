//! Storage layer error types.

use crate::access::error::AccessError;
use crate::catalog::TableId;
use crate::storage::page::PageId;
use thiserror::Error;

/// Errors that can occur in the storage layer.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Malformed data in slot {slot}: {source}")]
    MalformedData {
        slot: usize,
        #[source]
        source: AccessError,
    },

    #[error("Failed to serialize slot {slot}: {source}")]
    Serialization {
        slot: usize,
        #[source]
        source: AccessError,
    },

    #[error("Tuple schema does not match schema of table {table_id}")]
    SchemaMismatch { table_id: TableId },

    #[error("Page {page_id} is full")]
    PageFull { page_id: PageId },

    #[error("Tuple not found on page")]
    TupleNotFound,

    #[error("Slot {slot} is already empty")]
    SlotAlreadyEmpty { slot: usize },

    #[error("Invalid slot ID: {slot} (capacity: {capacity})")]
    SlotOutOfRange { slot: usize, capacity: usize },

    #[error("Page data must be {expected} bytes, got {actual}")]
    PageSizeMismatch { expected: usize, actual: usize },

    #[error("Invalid page size: {0}")]
    InvalidPageSize(usize),

    #[error("Page not found: {0}")]
    PageNotFound(PageId),

    #[error("Table not found: {0}")]
    TableNotFound(TableId),

    #[error("No more tuples")]
    NoSuchElement,

    #[error("Iterator has not been opened")]
    IteratorNotOpen,

    #[error("Invalid table metadata: {0}")]
    Metadata(#[from] bincode::Error),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
