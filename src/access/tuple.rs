use crate::access::error::{AccessError, AccessResult};
use crate::access::schema::Schema;
use crate::access::value::{FieldType, Value, STRING_LEN};
use crate::storage::page::PageId;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Last known storage location of a tuple. A plain lookup key: resolving it
/// to a row always goes back through the owning page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TupleId {
    pub page_id: PageId,
    pub slot_id: usize,
}

impl TupleId {
    pub fn new(page_id: PageId, slot_id: usize) -> Self {
        Self { page_id, slot_id }
    }
}

impl PartialOrd for TupleId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TupleId {
    fn cmp(&self, other: &Self) -> Ordering {
        // First compare by page_id, then by slot_id
        match self.page_id.cmp(&other.page_id) {
            Ordering::Equal => self.slot_id.cmp(&other.slot_id),
            other => other,
        }
    }
}

/// Represents a row in the database
#[derive(Debug, Clone)]
pub struct Tuple {
    schema: Arc<Schema>,
    values: Vec<Value>,
    tuple_id: Option<TupleId>,
}

impl Tuple {
    /// Build a tuple, checking value count and types against `schema`.
    pub fn new(schema: Arc<Schema>, values: Vec<Value>) -> AccessResult<Self> {
        if values.len() != schema.field_count() {
            return Err(AccessError::ValueCountMismatch {
                expected: schema.field_count(),
                actual: values.len(),
            });
        }
        for (index, (value, field)) in values.iter().zip(schema.iter()).enumerate() {
            check_value(index, value, field.field_type)?;
        }
        Ok(Self {
            schema,
            values,
            tuple_id: None,
        })
    }

    pub(crate) fn from_parts(schema: Arc<Schema>, values: Vec<Value>, tuple_id: TupleId) -> Self {
        Self {
            schema,
            values,
            tuple_id: Some(tuple_id),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn value(&self, index: usize) -> AccessResult<&Value> {
        self.values
            .get(index)
            .ok_or(AccessError::FieldIndexOutOfRange {
                index,
                count: self.values.len(),
            })
    }

    pub fn set_value(&mut self, index: usize, value: Value) -> AccessResult<()> {
        check_value(index, &value, self.schema.field_type(index)?)?;
        self.values[index] = value;
        Ok(())
    }

    pub fn tuple_id(&self) -> Option<TupleId> {
        self.tuple_id
    }

    pub fn set_tuple_id(&mut self, tuple_id: Option<TupleId>) {
        self.tuple_id = tuple_id;
    }
}

// Every stored value must fit its fixed-width slot.
fn check_value(index: usize, value: &Value, expected: FieldType) -> AccessResult<()> {
    if value.field_type() != expected {
        return Err(AccessError::TypeMismatch { index, expected });
    }
    match value {
        Value::String(s) if s.len() > STRING_LEN => Err(AccessError::StringTooLong {
            len: s.len(),
            max: STRING_LEN,
        }),
        _ => Ok(()),
    }
}

// Value equality: the locator is not part of a tuple's identity.
impl PartialEq for Tuple {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema && self.values == other.values
    }
}

impl Eq for Tuple {}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, "\t")?;
            }
            write!(f, "{}", value)?;
        }
        Ok(())
    }
}
