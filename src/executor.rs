//! Executor layer for query execution.
//!
//! Executors follow the iterator model: `open`, then repeated
//! `has_next`/`next`, with `rewind` to restart and `close` to release the
//! underlying cursor. Only the sequential scan lives in this crate.

use crate::access::schema::Schema;
use crate::access::tuple::Tuple;
use crate::storage::error::StorageResult;

pub mod seq_scan;

pub use seq_scan::SeqScan;

/// Trait for all query executors
pub trait Executor {
    fn open(&mut self) -> StorageResult<()>;

    fn has_next(&mut self) -> StorageResult<bool>;

    fn next(&mut self) -> StorageResult<Tuple>;

    fn rewind(&mut self) -> StorageResult<()>;

    fn close(&mut self);

    /// Shape of the rows this executor produces.
    fn schema(&self) -> &Schema;
}
