//! Slotted heap page for fixed-width tuples.
//!
//! Layout of a page of `page_size` bytes holding rows of `w` bytes:
//!
//! ```text
//! [header: ceil(capacity / 8) bytes][slot 0: w bytes]...[slot capacity-1: w bytes][zero padding]
//! ```
//!
//! where `capacity = floor(page_size * 8 / (w * 8 + 1))`. Bit `i` of the header
//! (byte `i / 8`, bit `i % 8`, least significant first) is set iff slot `i`
//! holds a row. Empty slot regions are written as zeros but never validated on
//! read.

use crate::access::error::AccessResult;
use crate::access::schema::Schema;
use crate::access::tuple::{Tuple, TupleId};
use crate::access::value::{FieldCodec, Value};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::page::{Page, PageId};
use crate::transaction::TransactionId;
use bytes::Bytes;
use log::debug;
use parking_lot::Mutex;
use std::io::Cursor;
use std::sync::Arc;

/// Number of tuple slots on a page of `page_size` bytes.
pub fn slot_capacity(page_size: usize, tuple_width: usize) -> usize {
    (page_size * 8) / (tuple_width * 8 + 1)
}

/// Number of header bytes needed to hold one bit per slot.
pub fn header_size(capacity: usize) -> usize {
    capacity.div_ceil(8)
}

/// Bytes of a freshly allocated page. Decodes to a page with no rows.
pub fn empty_page_data(page_size: usize) -> Vec<u8> {
    vec![0u8; page_size]
}

pub struct HeapPage {
    page_id: PageId,
    schema: Arc<Schema>,
    page_size: usize,
    header: Vec<u8>,
    slots: Vec<Option<Tuple>>,
    dirty_owner: Option<TransactionId>,
    // Recovery may read this while the page is being mutated.
    before_image: Mutex<Bytes>,
}

impl HeapPage {
    /// Decode a page from its on-disk image.
    ///
    /// Fails with [`StorageError::MalformedData`] if any slot marked used in
    /// the header cannot be decoded with `schema`.
    pub fn from_bytes(
        page_id: PageId,
        schema: Arc<Schema>,
        data: &[u8],
        page_size: usize,
    ) -> StorageResult<Self> {
        if data.len() != page_size {
            return Err(StorageError::PageSizeMismatch {
                expected: page_size,
                actual: data.len(),
            });
        }

        let width = schema.byte_width();
        let capacity = slot_capacity(page_size, width);
        let header_len = header_size(capacity);
        let header = data[..header_len].to_vec();

        let mut slots = Vec::with_capacity(capacity);
        let mut cursor = Cursor::new(data);
        for slot in 0..capacity {
            if !bit_set(&header, slot) {
                slots.push(None);
                continue;
            }
            cursor.set_position((header_len + slot * width) as u64);
            let values = read_values(&schema, &mut cursor)
                .map_err(|source| StorageError::MalformedData { slot, source })?;
            slots.push(Some(Tuple::from_parts(
                schema.clone(),
                values,
                TupleId::new(page_id, slot),
            )));
        }

        let mut page = Self {
            page_id,
            schema,
            page_size,
            header,
            slots,
            dirty_owner: None,
            before_image: Mutex::new(Bytes::new()),
        };
        let image = page.to_bytes()?;
        *page.before_image.get_mut() = image;
        Ok(page)
    }

    /// A page with every slot empty.
    pub fn empty(page_id: PageId, schema: Arc<Schema>, page_size: usize) -> StorageResult<Self> {
        Self::from_bytes(page_id, schema, &empty_page_data(page_size), page_size)
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn header_size(&self) -> usize {
        self.header.len()
    }

    /// Store `tuple` in the lowest-numbered free slot and stamp it with its
    /// new location.
    ///
    /// The page is not marked dirty; callers do that once the enclosing
    /// operation succeeds.
    pub fn insert_tuple(&mut self, tuple: &mut Tuple) -> StorageResult<TupleId> {
        if **tuple.schema() != *self.schema {
            return Err(StorageError::SchemaMismatch {
                table_id: self.page_id.table_id,
            });
        }

        let slot = (0..self.capacity())
            .find(|&i| !bit_set(&self.header, i))
            .ok_or(StorageError::PageFull {
                page_id: self.page_id,
            })?;

        let tuple_id = TupleId::new(self.page_id, slot);
        tuple.set_tuple_id(Some(tuple_id));
        self.set_slot(slot, Some(tuple.clone()));
        Ok(tuple_id)
    }

    /// Remove `tuple` from the page and clear its location.
    ///
    /// A tuple whose locator points into this page is matched at that slot;
    /// otherwise the first row with equal values is removed.
    pub fn delete_tuple(&mut self, tuple: &mut Tuple) -> StorageResult<()> {
        let slot = match tuple.tuple_id() {
            Some(id) if id.page_id == self.page_id && id.slot_id < self.capacity() => {
                match &self.slots[id.slot_id] {
                    None => return Err(StorageError::SlotAlreadyEmpty { slot: id.slot_id }),
                    Some(stored) if stored == tuple => id.slot_id,
                    Some(_) => self.find_slot(tuple)?,
                }
            }
            _ => self.find_slot(tuple)?,
        };

        self.set_slot(slot, None);
        tuple.set_tuple_id(None);
        Ok(())
    }

    /// Row stored at the location named by `tuple_id`, if any.
    pub fn get_tuple(&self, tuple_id: TupleId) -> StorageResult<Option<&Tuple>> {
        if tuple_id.page_id != self.page_id {
            return Err(StorageError::TupleNotFound);
        }
        self.check_slot(tuple_id.slot_id)?;
        Ok(self.slots[tuple_id.slot_id].as_ref())
    }

    pub fn num_empty_slots(&self) -> usize {
        (0..self.capacity())
            .filter(|&i| !bit_set(&self.header, i))
            .count()
    }

    pub fn is_slot_used(&self, slot: usize) -> StorageResult<bool> {
        self.check_slot(slot)?;
        Ok(bit_set(&self.header, slot))
    }

    /// Occupied rows in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Tuple> + '_ {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_owner.is_some()
    }

    fn check_slot(&self, slot: usize) -> StorageResult<()> {
        if slot >= self.capacity() {
            return Err(StorageError::SlotOutOfRange {
                slot,
                capacity: self.capacity(),
            });
        }
        Ok(())
    }

    fn find_slot(&self, tuple: &Tuple) -> StorageResult<usize> {
        self.slots
            .iter()
            .position(|stored| stored.as_ref() == Some(tuple))
            .ok_or(StorageError::TupleNotFound)
    }

    // The header bit and the slot entry change together, nowhere else.
    fn set_slot(&mut self, slot: usize, tuple: Option<Tuple>) {
        let mask = 1u8 << (slot % 8);
        if tuple.is_some() {
            self.header[slot / 8] |= mask;
        } else {
            self.header[slot / 8] &= !mask;
        }
        self.slots[slot] = tuple;
    }
}

impl Page for HeapPage {
    fn page_id(&self) -> PageId {
        self.page_id
    }

    fn to_bytes(&self) -> StorageResult<Bytes> {
        let width = self.schema.byte_width();
        let mut data = Vec::with_capacity(self.page_size);
        data.extend_from_slice(&self.header);

        for (slot, entry) in self.slots.iter().enumerate() {
            match entry {
                Some(tuple) if bit_set(&self.header, slot) => {
                    write_values(&self.schema, tuple.values(), &mut data)
                        .map_err(|source| StorageError::Serialization { slot, source })?;
                }
                _ => data.resize(data.len() + width, 0),
            }
        }

        data.resize(self.page_size, 0);
        Ok(Bytes::from(data))
    }

    fn mark_dirty(&mut self, dirty: bool, txn: TransactionId) {
        self.dirty_owner = if dirty { Some(txn) } else { None };
    }

    fn dirty_owner(&self) -> Option<TransactionId> {
        self.dirty_owner
    }

    fn before_image(&self) -> StorageResult<Self> {
        let data = self.before_image.lock().clone();
        Self::from_bytes(self.page_id, self.schema.clone(), &data, self.page_size)
    }

    fn capture_before_image(&self) -> StorageResult<()> {
        let data = self.to_bytes()?;
        *self.before_image.lock() = data;
        debug!("Captured before-image of page {}", self.page_id);
        Ok(())
    }
}

fn bit_set(header: &[u8], slot: usize) -> bool {
    header[slot / 8] & (1u8 << (slot % 8)) != 0
}

fn read_values(schema: &Schema, cursor: &mut Cursor<&[u8]>) -> AccessResult<Vec<Value>> {
    schema
        .iter()
        .map(|field| field.field_type.decode(cursor))
        .collect()
}

fn write_values(schema: &Schema, values: &[Value], out: &mut Vec<u8>) -> AccessResult<()> {
    for (field, value) in schema.iter().zip(values) {
        field.field_type.encode(value, out)?;
    }
    Ok(())
}
