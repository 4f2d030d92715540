//! Access layer error types.

use crate::access::value::FieldType;
use thiserror::Error;

/// Errors raised by schema lookups and field value encoding.
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Field index {index} out of range (field count: {count})")]
    FieldIndexOutOfRange { index: usize, count: usize },

    #[error("No field named '{0}'")]
    FieldNameNotFound(String),

    #[error("Schema must contain at least one field")]
    EmptySchema,

    #[error("Expected {expected} values but got {actual}")]
    ValueCountMismatch { expected: usize, actual: usize },

    #[error("Value at field {index} is not of type {expected}")]
    TypeMismatch { index: usize, expected: FieldType },

    #[error("Cannot encode {actual} value as {expected}")]
    CodecTypeMismatch {
        expected: FieldType,
        actual: FieldType,
    },

    #[error("String of {len} bytes exceeds maximum of {max}")]
    StringTooLong { len: usize, max: usize },

    #[error("Invalid UTF-8 in string field")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("Field codec error: {0}")]
    Codec(#[from] std::io::Error),
}

/// Result type for access layer operations.
pub type AccessResult<T> = Result<T, AccessError>;
