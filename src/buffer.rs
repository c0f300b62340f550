//! A contiguous, byte-addressable, append-only buffer parametric in a fixed record
//! stride.
//!
//! [`ColumnBuffer`] never casts its backing bytes through an aligned pointer — every
//! field of every record is read and written at an explicit byte offset via
//! `byteorder`, since the strides used by this format (14, 20, 22 bytes) are
//! deliberately not multiples of 4 or 8.

use crate::error::{Error, Result};
use crate::record::Record;
use std::marker::PhantomData;

/// A columnar, append-only buffer of fixed-width records.
///
/// `len` and `capacity` are both counted in records, not bytes.
#[derive(Clone)]
pub struct ColumnBuffer<R: Record> {
    bytes: Vec<u8>,
    len: usize,
    capacity: usize,
    _marker: PhantomData<R>,
}

impl<R: Record> ColumnBuffer<R> {
    /// Creates an empty buffer with no reserved capacity.
    pub fn new() -> Self {
        ColumnBuffer {
            bytes: Vec::new(),
            len: 0,
            capacity: 0,
            _marker: PhantomData,
        }
    }

    /// The number of records currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer holds no records.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of records the buffer can hold before it must grow again.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Decodes and returns the record at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `index >= len()`.
    pub fn get(&self, index: usize) -> Result<R> {
        self.check_index(index)?;
        let start = index * R::STRIDE;
        Ok(R::decode(&self.bytes[start..start + R::STRIDE]))
    }

    /// Zero-copy view of `count` records starting at `start`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `start + count > len()`.
    pub fn export_bytes(&self, start: usize, count: usize) -> Result<&[u8]> {
        let end = start.checked_add(count).unwrap_or(usize::MAX);
        if end > self.len {
            return Err(Error::OutOfRange { index: end, len: self.len });
        }
        let byte_start = start * R::STRIDE;
        let byte_end = end * R::STRIDE;
        Ok(&self.bytes[byte_start..byte_end])
    }

    /// Appends `record`, growing the backing allocation if needed.
    pub fn push(&mut self, record: &R) {
        self.push_many(std::iter::once(record), 0);
    }

    /// Appends every record yielded by `records`.
    ///
    /// `hint` is a minimum capacity increment to reserve up front, overriding the
    /// growth-step table when it asks for more than the table would have given.
    pub fn push_many<'a, I>(&mut self, records: I, hint: usize)
    where
        I: IntoIterator<Item = &'a R>,
        R: 'a,
    {
        for record in records {
            self.ensure_capacity_for_one(hint);
            let start = self.len * R::STRIDE;
            self.bytes.resize(start + R::STRIDE, 0);
            record.encode(&mut self.bytes[start..start + R::STRIDE]);
            self.len += 1;
        }
    }

    /// Appends raw, already-encoded bytes. `bytes.len()` must be a whole multiple
    /// of the record stride.
    ///
    /// Used by the persister to append whole chunks without per-record decode/encode.
    pub fn push_raw(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() % R::STRIDE != 0 {
            return Err(Error::InvalidValue {
                field: "bytes",
                reason: format!(
                    "length {} is not a multiple of the record stride {}",
                    bytes.len(),
                    R::STRIDE
                ),
            });
        }
        let additional_records = bytes.len() / R::STRIDE;
        self.reserve(additional_records);
        self.bytes.extend_from_slice(bytes);
        self.len += additional_records;
        Ok(())
    }

    /// Removes the last `count` records, shrinking `len` but never `capacity`.
    ///
    /// Used by the sorting wrapper to roll back a rejected append.
    pub(crate) fn truncate(&mut self, count: usize) {
        let new_len = self.len.saturating_sub(count);
        self.bytes.truncate(new_len * R::STRIDE);
        self.len = new_len;
    }

    /// Reallocates so that `capacity()` is at least `records`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if `records < len()`: capacity may never
    /// shrink below the current length.
    pub fn set_capacity(&mut self, records: usize) -> Result<()> {
        if records < self.len {
            return Err(Error::InvalidValue {
                field: "capacity",
                reason: format!("{records} is less than current length {}", self.len),
            });
        }
        if records > self.capacity {
            self.bytes.reserve_exact(records * R::STRIDE - self.bytes.capacity());
            self.capacity = records;
        }
        Ok(())
    }

    fn ensure_capacity_for_one(&mut self, hint: usize) {
        if self.len < self.capacity {
            return;
        }
        let step = growth_step(self.capacity).max(hint.max(1));
        let _ = self.set_capacity(self.capacity + step);
    }

    fn reserve(&mut self, additional: usize) {
        let needed = self.len + additional;
        if needed > self.capacity {
            let _ = self.set_capacity(needed);
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.len {
            Err(Error::OutOfRange { index, len: self.len })
        } else {
            Ok(())
        }
    }
}

impl<R: Record> Default for ColumnBuffer<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Chooses the absolute step by which capacity grows next, given the current
/// capacity (in records).
///
/// Large buffers grow by fixed-size chunks rather than by doubling, so that
/// collections holding tens of millions of points don't waste half their
/// allocation on overshoot.
fn growth_step(capacity: usize) -> usize {
    if capacity >= 1 << 18 {
        1 << 17
    } else if capacity >= 1 << 16 {
        capacity / 4
    } else if capacity >= 1 << 13 {
        capacity / 2
    } else if capacity >= 1 << 7 {
        capacity
    } else {
        32
    }
}
