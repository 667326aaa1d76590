use std::iter::FusedIterator;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use heapdb_catalog::{schema::SchemaRef, tuple::Tuple};
use heapdb_error::{errinput, Error};

use crate::page::PageId;
use crate::Result;

/// Returns how many tuples of `tuple_size` bytes fit in a page of `page_size` bytes. Each slot
/// costs its tuple bytes plus one header bit.
pub fn slots_per_page(page_size: usize, tuple_size: usize) -> usize {
    (page_size * 8) / (tuple_size * 8 + 1)
}

/// Returns the byte length of the slot bitmap for `num_slots` slots.
pub fn header_size(num_slots: usize) -> usize {
    num_slots.div_ceil(8)
}

/// A page of fixed-size tuple slots.
///
/// Layout of the page image:
///
/// ```text
///     ---------------------------------------------------------------
///     | SLOT BITMAP (ceil(slots / 8) bytes) | SLOT 0 | SLOT 1 | ... |  (zero padding)
///     ---------------------------------------------------------------
/// ```
///
/// Bit `i` of the bitmap (least significant bit first within each byte) is set iff slot `i`
/// holds a tuple. An all-zero image is therefore a valid, empty page.
#[derive(Debug)]
pub struct HeapPage {
    id: PageId,
    schema: SchemaRef,
    data: Bytes,
    num_slots: usize,
}

impl HeapPage {
    /// Wraps a raw page image read from page `id` of a heap file with the given schema.
    pub fn new(id: PageId, data: Bytes, schema: SchemaRef) -> Result<Self> {
        let num_slots = checked_slots(data.len(), &schema)?;
        Ok(Self {
            id,
            schema,
            data,
            num_slots,
        })
    }

    /// Returns a zeroed image, i.e. an empty page, of `page_size` bytes.
    pub fn empty_page_data(page_size: usize) -> Bytes {
        BytesMut::zeroed(page_size).freeze()
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Returns the page's full byte image. Cheap, the bytes are reference counted.
    pub fn page_data(&self) -> Bytes {
        self.data.clone()
    }

    pub fn page_size(&self) -> usize {
        self.data.len()
    }

    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    pub fn is_slot_used(&self, slot: usize) -> bool {
        slot < self.num_slots && self.data[slot / 8] & (1 << (slot % 8)) != 0
    }

    /// Returns the number of occupied slots.
    pub fn used_slots(&self) -> usize {
        (0..self.num_slots)
            .filter(|slot| self.is_slot_used(*slot))
            .count()
    }

    /// Returns the tuple in `slot`, or `None` if the slot is empty.
    pub fn tuple_at(&self, slot: usize) -> Result<Option<Tuple>> {
        if slot >= self.num_slots {
            return Err(Error::OutOfBounds);
        }
        if !self.is_slot_used(slot) {
            return Ok(None);
        }
        let tuple_size = self.schema.size();
        let start = header_size(self.num_slots) + slot * tuple_size;
        Ok(Some(Tuple::new(self.data.slice(start..start + tuple_size))))
    }

    /// Consumes a shared handle to the page and returns an iterator over its tuples, in slot
    /// order. The iterator keeps the page alive on its own.
    pub fn into_tuples(self: Arc<Self>) -> HeapPageIter {
        HeapPageIter {
            page: self,
            next_slot: 0,
        }
    }
}

pub(crate) fn checked_slots(page_size: usize, schema: &SchemaRef) -> Result<usize> {
    let num_slots = slots_per_page(page_size, schema.size());
    if num_slots == 0 {
        return errinput!(
            "tuples of {} bytes do not fit in a {} byte page",
            schema.size(),
            page_size
        );
    }
    Ok(num_slots)
}

/// Iterates over the occupied slots of a [`HeapPage`].
#[derive(Debug)]
pub struct HeapPageIter {
    page: Arc<HeapPage>,
    next_slot: usize,
}

impl Iterator for HeapPageIter {
    type Item = Tuple;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_slot < self.page.num_slots {
            let slot = self.next_slot;
            self.next_slot += 1;
            // The slot is in range, so only an empty slot yields `None` here.
            if let Ok(Some(tuple)) = self.page.tuple_at(slot) {
                return Some(tuple);
            }
        }
        None
    }
}

impl FusedIterator for HeapPageIter {}

/// Assembles a page image slot by slot.
pub struct HeapPageBuilder {
    id: PageId,
    schema: SchemaRef,
    data: BytesMut,
    num_slots: usize,
}

impl HeapPageBuilder {
    pub fn new(id: PageId, schema: SchemaRef, page_size: usize) -> Result<Self> {
        let num_slots = checked_slots(page_size, &schema)?;
        Ok(Self {
            id,
            schema,
            data: BytesMut::zeroed(page_size),
            num_slots,
        })
    }

    /// Places `tuple` in the first free slot and returns the slot index. Fails with
    /// [`Error::OutOfBounds`] once the page is full.
    pub fn push(&mut self, tuple: &Tuple) -> Result<usize> {
        let tuple_size = self.schema.size();
        if tuple.tuple_size() != tuple_size {
            return errinput!(
                "tuple of {} bytes does not match the schema's {} bytes",
                tuple.tuple_size(),
                tuple_size
            );
        }
        let slot = (0..self.num_slots)
            .find(|slot| self.data[slot / 8] & (1 << (slot % 8)) == 0)
            .ok_or(Error::OutOfBounds)?;

        let start = header_size(self.num_slots) + slot * tuple_size;
        self.data[start..start + tuple_size].copy_from_slice(&tuple.data());
        self.data[slot / 8] |= 1 << (slot % 8);
        Ok(slot)
    }

    pub fn build(self) -> HeapPage {
        HeapPage {
            id: self.id,
            schema: self.schema,
            data: self.data.freeze(),
            num_slots: self.num_slots,
        }
    }
}
