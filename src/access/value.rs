use crate::access::error::{AccessError, AccessResult};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Cursor, Read};

/// Maximum number of payload bytes in a `String` field.
pub const STRING_LEN: usize = 128;

/// Column types with a fixed on-page width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Int,
    String,
}

/// Capability every column type provides to the page codec.
pub trait FieldCodec {
    /// Serialized width in bytes, identical for every value of the type.
    fn fixed_width(&self) -> usize;

    /// Decode one value, advancing the cursor by exactly `fixed_width()` bytes.
    fn decode(&self, cursor: &mut Cursor<&[u8]>) -> AccessResult<Value>;

    /// Append the encoding of `value` to `out`.
    fn encode(&self, value: &Value, out: &mut Vec<u8>) -> AccessResult<()>;
}

impl FieldType {
    /// Parse a type name as used on the command line (`int`, `string`).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => Some(FieldType::Int),
            "string" | "str" | "text" => Some(FieldType::String),
            _ => None,
        }
    }
}

impl FieldCodec for FieldType {
    fn fixed_width(&self) -> usize {
        match self {
            FieldType::Int => 4,
            FieldType::String => 4 + STRING_LEN,
        }
    }

    fn decode(&self, cursor: &mut Cursor<&[u8]>) -> AccessResult<Value> {
        match self {
            FieldType::Int => Ok(Value::Int(cursor.read_i32::<BigEndian>()?)),
            FieldType::String => {
                let len = cursor.read_u32::<BigEndian>()? as usize;
                if len > STRING_LEN {
                    return Err(AccessError::StringTooLong {
                        len,
                        max: STRING_LEN,
                    });
                }
                let mut payload = [0u8; STRING_LEN];
                cursor.read_exact(&mut payload)?;
                let s = String::from_utf8(payload[..len].to_vec())?;
                Ok(Value::String(s))
            }
        }
    }

    fn encode(&self, value: &Value, out: &mut Vec<u8>) -> AccessResult<()> {
        match (self, value) {
            (FieldType::Int, Value::Int(i)) => {
                out.write_i32::<BigEndian>(*i)?;
            }
            (FieldType::String, Value::String(s)) => {
                let bytes = s.as_bytes();
                if bytes.len() > STRING_LEN {
                    return Err(AccessError::StringTooLong {
                        len: bytes.len(),
                        max: STRING_LEN,
                    });
                }
                out.write_u32::<BigEndian>(bytes.len() as u32)?;
                out.extend_from_slice(bytes);
                out.resize(out.len() + STRING_LEN - bytes.len(), 0);
            }
            _ => {
                return Err(AccessError::CodecTypeMismatch {
                    expected: *self,
                    actual: value.field_type(),
                })
            }
        }
        Ok(())
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Int => write!(f, "INT_TYPE"),
            FieldType::String => write!(f, "STRING_TYPE"),
        }
    }
}

/// A single column value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Int(i32),
    String(String),
}

impl Value {
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::Int(_) => FieldType::Int,
            Value::String(_) => FieldType::String,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}
