//! Access layer for tuple-oriented operations.
//!
//! - **Schema**: Ordered, typed and optionally named fields of a row
//! - **Tuple**: Individual records with their last known TupleId
//! - **FieldType / Value**: Fixed-width column types and their codec
//! - **DbFileIterator**: Cursor contract for scanning a table file

pub mod error;
pub mod scan;
pub mod schema;
pub mod tuple;
pub mod value;

pub use error::{AccessError, AccessResult};
pub use scan::{DbFileIterator, HeapFileIterator};
pub use schema::{Schema, SchemaField};
pub use tuple::{Tuple, TupleId};
pub use value::{FieldCodec, FieldType, Value, STRING_LEN};
