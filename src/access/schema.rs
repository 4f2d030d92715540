//! Row shape descriptors.
//!
//! A [`Schema`] is an ordered list of typed, optionally named fields. Field
//! order defines both the on-page byte layout of a row and index-based lookup.

use crate::access::error::{AccessError, AccessResult};
use crate::access::value::{FieldCodec, FieldType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// One column of a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub field_type: FieldType,
    pub name: Option<String>,
}

impl SchemaField {
    pub fn new(field_type: FieldType, name: Option<String>) -> Self {
        Self { field_type, name }
    }
}

impl fmt::Display for SchemaField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}({})", name, self.field_type),
            None => write!(f, "null({})", self.field_type),
        }
    }
}

/// Describes the shape of a row. Immutable once built.
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<SchemaField>,
}

impl Schema {
    pub fn new(fields: Vec<SchemaField>) -> AccessResult<Self> {
        if fields.is_empty() {
            return Err(AccessError::EmptySchema);
        }
        Ok(Self { fields })
    }

    /// Build a schema of anonymous fields.
    pub fn from_types(types: &[FieldType]) -> AccessResult<Self> {
        Self::new(types.iter().map(|t| SchemaField::new(*t, None)).collect())
    }

    /// Build a schema from parallel type and name lists.
    pub fn with_names(types: &[FieldType], names: &[&str]) -> AccessResult<Self> {
        if types.len() != names.len() {
            return Err(AccessError::ValueCountMismatch {
                expected: types.len(),
                actual: names.len(),
            });
        }
        Self::new(
            types
                .iter()
                .zip(names)
                .map(|(t, n)| SchemaField::new(*t, Some(n.to_string())))
                .collect(),
        )
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field_type(&self, index: usize) -> AccessResult<FieldType> {
        self.field(index).map(|f| f.field_type)
    }

    /// Name of the field at `index`; `None` when the field is anonymous.
    pub fn field_name(&self, index: usize) -> AccessResult<Option<&str>> {
        self.field(index).map(|f| f.name.as_deref())
    }

    /// Index of the first field named `name`. Anonymous fields never match.
    pub fn index_of(&self, name: &str) -> AccessResult<usize> {
        self.fields
            .iter()
            .position(|f| f.name.as_deref() == Some(name))
            .ok_or_else(|| AccessError::FieldNameNotFound(name.to_string()))
    }

    /// Serialized width of one row in bytes.
    pub fn byte_width(&self) -> usize {
        self.fields.iter().map(|f| f.field_type.fixed_width()).sum()
    }

    /// Fields of `a` followed by the fields of `b`.
    pub fn concat(a: &Schema, b: &Schema) -> Schema {
        let mut fields = Vec::with_capacity(a.field_count() + b.field_count());
        fields.extend(a.fields.iter().cloned());
        fields.extend(b.fields.iter().cloned());
        Schema { fields }
    }

    /// Same types, with each field name replaced by `rename(old_name)`.
    pub fn rename_fields<F>(&self, rename: F) -> Schema
    where
        F: Fn(Option<&str>) -> Option<String>,
    {
        let fields = self
            .fields
            .iter()
            .map(|f| SchemaField::new(f.field_type, rename(f.name.as_deref())))
            .collect();
        Schema { fields }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaField> {
        self.fields.iter()
    }

    fn field(&self, index: usize) -> AccessResult<&SchemaField> {
        self.fields
            .get(index)
            .ok_or(AccessError::FieldIndexOutOfRange {
                index,
                count: self.fields.len(),
            })
    }
}

// Names do not take part in equality.
impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.byte_width() == other.byte_width()
            && self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(&other.fields)
                .all(|(a, b)| a.field_type == b.field_type)
    }
}

impl Eq for Schema {}

impl Hash for Schema {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.byte_width().hash(state);
        for field in &self.fields {
            field.field_type.hash(state);
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", field)?;
        }
        Ok(())
    }
}
