//! Transaction identity.
//!
//! Transaction lifecycle and locking live above this crate; pages only record
//! which transaction dirtied them.

pub mod id;

pub use id::TransactionId;
