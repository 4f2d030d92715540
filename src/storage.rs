//! Storage layer implementation for slotdb.
//!
//! Tables are stored as files of fixed-size pages:
//!
//! - **HeapPage**: Slotted page of fixed-width tuples with an occupancy bitmap
//! - **HeapFile**: Maps a table's page numbers to offsets in a single file
//! - **Page**: The seam a buffer manager uses for dirty tracking and recovery
//!
//! Page caching, locking and logging are left to the layers above.

pub mod error;
pub mod heap_file;
pub mod page;

pub use error::{StorageError, StorageResult};
pub use heap_file::{DbFile, HeapFile};
pub use page::{HeapPage, Page, PageId};
