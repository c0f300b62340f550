//! The sorting-discipline wrapper around a [`ColumnBuffer`]: enforces (or doesn't)
//! the monotonic-time invariant on append.

use crate::buffer::ColumnBuffer;
use crate::config::CollectionSettings;
use crate::error::{Error, Result};
use crate::record::{compare_spans, BoundingBox, GeoPoint, Record, TimeOrdering, TimeSpan};
use byteorder::{ByteOrder, LittleEndian};

/// The policy a [`Collection`] uses when an append would violate the
/// monotonic-time invariant.
///
/// Default is [`Enforcement::ThrowIfWrong`]: the strictest policy, since silent
/// drops ([`Enforcement::SkipWrongItems`]) are an opt-in, not a default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Enforcement {
    /// Out-of-order appends are accepted; `sorted_by_time` is cleared.
    NotRequired,
    /// Out-of-order appends are dropped; the append reports `Ok(false)`.
    SkipWrongItems,
    /// Out-of-order appends fail with [`Error::SortingViolation`].
    #[default]
    ThrowIfWrong,
}

/// An append-only, optionally time-sorted collection of fixed-width records.
#[derive(Clone)]
pub struct Collection<R: Record + TimeSpan> {
    buffer: ColumnBuffer<R>,
    sorted_by_time: bool,
    enforcement: Enforcement,
}

impl<R: Record + TimeSpan> Collection<R> {
    /// Creates an empty collection with the default enforcement
    /// ([`Enforcement::ThrowIfWrong`]).
    pub fn new() -> Self {
        Collection { buffer: ColumnBuffer::new(), sorted_by_time: true, enforcement: Enforcement::default() }
    }

    /// Creates an empty collection with the given enforcement policy.
    pub fn with_enforcement(enforcement: Enforcement) -> Self {
        Collection { buffer: ColumnBuffer::new(), sorted_by_time: true, enforcement }
    }

    /// Creates an empty collection per the given settings: initial capacity
    /// reservation and enforcement policy.
    pub fn with_settings(settings: &CollectionSettings) -> Result<Self> {
        let mut collection = Collection::with_enforcement(settings.configured_enforcement());
        collection.buffer.set_capacity(settings.configured_initial_capacity())?;
        Ok(collection)
    }

    /// The number of records stored.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the collection holds no records.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The number of records the collection can hold before it must grow again.
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Whether every consecutive pair of records currently satisfies `Before`.
    ///
    /// Sticky-false: once this becomes `false`, only
    /// [`Collection::check_contents_sorted_by_time`] covering the whole collection
    /// can set it back to `true`.
    pub fn sorted_by_time(&self) -> bool {
        self.sorted_by_time
    }

    /// The current enforcement policy.
    pub fn enforcement(&self) -> Enforcement {
        self.enforcement
    }

    /// Changes the enforcement policy.
    ///
    /// # Errors
    ///
    /// While the collection is currently unsorted, only [`Enforcement::NotRequired`]
    /// may be set; attempting to tighten enforcement on unsorted data fails with
    /// [`Error::InvalidValue`].
    pub fn set_enforcement(&mut self, enforcement: Enforcement) -> Result<()> {
        if !self.sorted_by_time && enforcement != Enforcement::NotRequired {
            return Err(Error::InvalidValue {
                field: "sorting_enforcement",
                reason: "cannot tighten enforcement while the collection is unsorted".to_string(),
            });
        }
        self.enforcement = enforcement;
        Ok(())
    }

    /// Decodes and returns the record at `index`.
    pub fn get(&self, index: usize) -> Result<R> {
        self.buffer.get(index)
    }

    /// Zero-copy view of `count` records starting at `start`.
    pub fn export_bytes(&self, start: usize, count: usize) -> Result<&[u8]> {
        self.buffer.export_bytes(start, count)
    }

    /// Reallocates so that `capacity()` is at least `records`, without appending.
    pub fn reserve_capacity(&mut self, records: usize) -> Result<()> {
        self.buffer.set_capacity(records)
    }

    /// Appends already-encoded bytes verbatim, bypassing the sorting check.
    ///
    /// Used by the persister when loading a stream that was written by a
    /// previously-sorted collection; the caller is responsible for calling
    /// [`Collection::check_contents_sorted_by_time`] once loading completes to
    /// restore an accurate `sorted_by_time`.
    pub fn load_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.buffer.push_raw(bytes)
    }

    /// Appends `record`.
    ///
    /// Returns `Ok(true)` if the record was appended, `Ok(false)` if it was dropped
    /// under [`Enforcement::SkipWrongItems`], or `Err` under
    /// [`Enforcement::ThrowIfWrong`].
    pub fn push(&mut self, record: R) -> Result<bool> {
        self.buffer.push(&record);
        let len = self.buffer.len();
        if len <= 1 {
            return Ok(true);
        }
        let previous = self.buffer.get(len - 2)?;
        let ordering = compare_spans(&previous, &record);
        if ordering == TimeOrdering::Before {
            return Ok(true);
        }
        match self.enforcement {
            Enforcement::NotRequired => {
                self.sorted_by_time = false;
                Ok(true)
            }
            Enforcement::SkipWrongItems => {
                self.buffer.truncate(1);
                Ok(false)
            }
            Enforcement::ThrowIfWrong => {
                self.buffer.truncate(1);
                Err(Error::SortingViolation { index: len - 1, ordering })
            }
        }
    }

    /// Appends `source[skip..skip+take]` from another same-typed collection.
    ///
    /// Returns the number of records actually appended.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `skip + take > source.len()`. Under
    /// [`Enforcement::ThrowIfWrong`], returns [`Error::SortingViolation`] (without
    /// appending anything) if `source`'s selected range is itself out of order.
    pub fn push_all(&mut self, source: &Collection<R>, skip: usize, take: usize) -> Result<usize> {
        let end = skip.checked_add(take).ok_or(Error::OutOfRange { index: usize::MAX, len: source.len() })?;
        if end > source.len() {
            return Err(Error::OutOfRange { index: end, len: source.len() });
        }
        if take == 0 {
            return Ok(0);
        }

        if self.enforcement == Enforcement::NotRequired || !self.sorted_by_time {
            let bytes = source.export_bytes(skip, take)?;
            self.buffer.push_raw(bytes)?;
            self.rescan_tail(take);
            return Ok(take);
        }

        match self.first_violation(source, skip, end)? {
            None => {
                let start = self.first_extending_index(source, skip, end)?;
                if start >= end {
                    return Ok(0);
                }
                let bytes = source.export_bytes(start, end - start)?;
                self.buffer.push_raw(bytes)?;
                Ok(end - start)
            }
            Some((index, ordering)) => match self.enforcement {
                Enforcement::SkipWrongItems => {
                    let mut appended = 0;
                    for i in skip..end {
                        if self.push(source.get(i)?)? {
                            appended += 1;
                        }
                    }
                    Ok(appended)
                }
                Enforcement::ThrowIfWrong => Err(Error::SortingViolation { index, ordering }),
                Enforcement::NotRequired => unreachable!("handled above"),
            },
        }
    }

    /// Appends every record yielded by `source`, anchoring the ordering check on
    /// this collection's current last record (if any), matching the spec's
    /// recursive "materialize through a temporary same-typed collection, using the
    /// same enforcement policy" contract for general iterable sources.
    ///
    /// # Errors
    ///
    /// Under [`Enforcement::ThrowIfWrong`], returns [`Error::SortingViolation`]
    /// (without appending anything to `self`) as soon as an out-of-order record is
    /// seen, just as pushing the records one at a time would.
    pub fn push_all_iter<I: IntoIterator<Item = R>>(&mut self, source: I) -> Result<usize> {
        let mut staging = Collection::with_enforcement(self.enforcement);
        let anchored = if let Some(last_index) = self.len().checked_sub(1) {
            staging.push(self.get(last_index)?)?;
            1
        } else {
            0
        };
        for record in source {
            staging.push(record)?;
        }
        self.push_all(&staging, anchored, staging.len() - anchored)
    }

    /// Linear scan of `[skip, skip+count)`; if that range covers the whole
    /// collection and is found sorted, promotes `sorted_by_time` to `true`.
    pub fn check_contents_sorted_by_time(&mut self, skip: usize, count: usize) -> Result<bool> {
        let end = skip.checked_add(count).ok_or(Error::OutOfRange { index: usize::MAX, len: self.len() })?;
        if end > self.len() {
            return Err(Error::OutOfRange { index: end, len: self.len() });
        }
        let mut sorted = true;
        for i in skip..end.saturating_sub(1) {
            if self.compare_element_time(i, i + 1)? != TimeOrdering::Before {
                sorted = false;
                break;
            }
        }
        if skip == 0 && end == self.len() {
            self.sorted_by_time = sorted;
        }
        Ok(sorted)
    }

    /// Compares the time spans of records `i` and `j`.
    pub fn compare_element_time(&self, i: usize, j: usize) -> Result<TimeOrdering> {
        Ok(compare_spans(&self.get(i)?, &self.get(j)?))
    }

    /// Compares record `i`'s time span against the instant `time`.
    pub fn compare_element_to_time(&self, i: usize, time: u32) -> Result<TimeOrdering> {
        self.compare_element_to_span(i, time, time)
    }

    /// Compares record `i`'s time span against `[start, end)`.
    pub fn compare_element_to_span(&self, i: usize, start: u32, end: u32) -> Result<TimeOrdering> {
        struct Span(u32, u32);
        impl TimeSpan for Span {
            fn start_time(&self) -> u32 {
                self.0
            }
            fn end_time(&self) -> u32 {
                self.1
            }
        }
        Ok(compare_spans(&self.get(i)?, &Span(start, end)))
    }

    /// Signed second difference between record `i`'s start time and `time`.
    pub fn diff_element_to_time(&self, i: usize, time: u32) -> Result<i64> {
        Ok(self.get(i)?.start_time() as i64 - time as i64)
    }

    /// Whether record `i`'s location falls inside `bb`.
    pub fn element_in_bounding_box(&self, i: usize, bb: &BoundingBox) -> Result<bool>
    where
        R: GeoPoint,
    {
        Ok(bb.contains_point(&self.get(i)?))
    }

    /// Iterates `[start, start+count)`, calling `f` with each record's latitude and
    /// longitude as raw E7 integers, skipping the float decode entirely.
    ///
    /// Every record variant in this crate embeds a `Point`'s 14-byte layout as its
    /// first 14 bytes (time, latitude E7, longitude E7, altitude), so this reads
    /// those two fields directly out of the exported byte slice.
    ///
    /// `count` defaults to `len() - start` when `None`.
    pub fn for_each_latlon_e7<F: FnMut(u32, u32)>(&self, start: usize, count: Option<usize>, mut f: F) -> Result<()> {
        let count = count.unwrap_or(self.len().saturating_sub(start));
        let bytes = self.export_bytes(start, count)?;
        for record in bytes.chunks_exact(R::STRIDE) {
            let lat = LittleEndian::read_u32(&record[4..8]);
            let lon = LittleEndian::read_u32(&record[8..12]);
            f(lat, lon);
        }
        Ok(())
    }

    fn rescan_tail(&mut self, appended: usize) {
        if !self.sorted_by_time {
            return;
        }
        let total = self.buffer.len();
        let first_new = total - appended;
        let start_check = first_new.saturating_sub(1);
        let mut still_sorted = true;
        for i in start_check..total.saturating_sub(1) {
            let a = self.buffer.get(i).expect("index within bounds");
            let b = self.buffer.get(i + 1).expect("index within bounds");
            if compare_spans(&a, &b) != TimeOrdering::Before {
                still_sorted = false;
                break;
            }
        }
        if !still_sorted {
            self.sorted_by_time = false;
        }
    }

    fn first_violation(&self, source: &Collection<R>, skip: usize, end: usize) -> Result<Option<(usize, TimeOrdering)>> {
        for i in skip..end.saturating_sub(1) {
            let ordering = source.compare_element_time(i, i + 1)?;
            if ordering != TimeOrdering::Before {
                return Ok(Some((i + 1, ordering)));
            }
        }
        Ok(None)
    }

    fn first_extending_index(&self, source: &Collection<R>, skip: usize, end: usize) -> Result<usize> {
        if self.is_empty() {
            return Ok(skip);
        }
        let last = self.get(self.len() - 1)?;
        for i in skip..end {
            let candidate = source.get(i)?;
            if compare_spans(&last, &candidate) == TimeOrdering::Before {
                return Ok(i);
            }
        }
        Ok(end)
    }
}

impl<R: Record + TimeSpan> Default for Collection<R> {
    fn default() -> Self {
        Self::new()
    }
}
