//! Read-only query primitives layered on top of [`Collection`]: summary info,
//! item extraction, a time-indexed location lookup, and interval-bucketed
//! availability reporting.

use crate::collection::{Collection, Enforcement};
use crate::error::Result;
use crate::record::{BoundingBox, GeoPoint, Record, TimeSpan};
use crate::search;

/// A summary of a collection's extent and sorting state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollectionInfo {
    /// The start time of the first record, if any.
    pub first_start_time: Option<u32>,
    /// The end time of the last record, if any.
    pub last_end_time: Option<u32>,
    /// The number of records stored.
    pub length: usize,
    /// Whether the collection is currently known to be sorted by time.
    pub sorted_by_time: bool,
    /// The collection's configured sort-enforcement policy.
    pub enforcement: Enforcement,
}

/// Summarizes `collection`'s extent and sorting state.
///
/// # Errors
///
/// Returns an error only if the underlying record access fails, which does not
/// happen for a well-formed collection.
pub fn collection_info<R: Record + TimeSpan>(collection: &Collection<R>) -> Result<CollectionInfo> {
    let length = collection.len();
    let (first_start_time, last_end_time) = if length == 0 {
        (None, None)
    } else {
        (Some(collection.get(0)?.start_time()), Some(collection.get(length - 1)?.end_time()))
    };
    Ok(CollectionInfo {
        first_start_time,
        last_end_time,
        length,
        sorted_by_time: collection.sorted_by_time(),
        enforcement: collection.enforcement(),
    })
}

/// Extracts `[start, start + count)` (or `[start, len)` if `count` is `None`) as a
/// standalone collection copy, preserving `collection`'s enforcement policy.
///
/// # Errors
///
/// Returns [`crate::Error::OutOfRange`] if the requested range exceeds the
/// collection's length.
pub fn collection_items<R: Record + TimeSpan>(
    collection: &Collection<R>,
    start: usize,
    count: Option<usize>,
) -> Result<Collection<R>> {
    let take = count.unwrap_or(collection.len().saturating_sub(start));
    let mut out = Collection::with_enforcement(Enforcement::NotRequired);
    out.push_all(collection, start, take)?;
    out.set_enforcement(collection.enforcement())?;
    Ok(out)
}

fn time_ordering_to_sign(ordering: crate::record::TimeOrdering) -> i32 {
    use crate::record::TimeOrdering::*;
    match ordering {
        Before => -1,
        After => 1,
        // A target instant or span that overlaps a record's span counts as a match,
        // per the location-by-time contract: a record's span need not equal the
        // query exactly to satisfy it.
        Same | Overlapping => 0,
    }
}

/// Finds the index of the record whose time span contains `time`, or, if none
/// matches exactly and `tolerance_seconds` is given, the nearest record within
/// that many seconds.
///
/// Uses a binary search when `collection` is known to be sorted by time, and a
/// linear scan otherwise.
///
/// # Errors
///
/// Returns an error only if comparing against an index fails, which does not
/// happen for indices within `[0, collection.len())`.
pub fn location_by_time<R: Record + TimeSpan>(
    collection: &Collection<R>,
    time: u32,
    tolerance_seconds: Option<u32>,
) -> Result<Option<usize>> {
    if collection.is_empty() {
        return Ok(None);
    }
    let cmp = |i: usize| time_ordering_to_sign(collection.compare_element_to_time(i, time).expect("index in range"));
    // Distance from `time` to the record's span, treating `time` inside the
    // (half-open) span as a zero distance — not just the distance to its start —
    // so a record's whole duration counts toward the nearest match under a
    // tolerance, not only its first instant.
    let diff = |i: usize| -> i64 {
        let record = collection.get(i).expect("index in range");
        let (start, end) = (record.start_time() as i64, record.end_time() as i64);
        let time = time as i64;
        if time < start {
            start - time
        } else if time >= end {
            time - end
        } else {
            0
        }
    };
    let tolerance = tolerance_seconds.map(|t| t as i64);
    let diff_dyn: search::Diff<'_, i64> = &diff;
    let diff_ref: Option<search::Diff<'_, i64>> = tolerance.map(|_| diff_dyn);
    Ok(search::find(collection.sorted_by_time(), 0, collection.len(), &cmp, tolerance, diff_ref))
}

/// The availability classification of one interval in a
/// [`data_availability`] report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Availability {
    /// No record's time span overlaps this interval.
    NotAvailable,
    /// A record overlaps this interval, but none of the overlapping records fall
    /// within the given bounding box (or no bounding box was given and the interval
    /// is, contradictorily, still reported this way — in practice this variant is
    /// only produced when a bounding box is supplied).
    AvailableOutsideBoundingBox,
    /// A record overlapping this interval falls within the given bounding box.
    AvailableWithinBoundingBox,
}

/// Classifies `[start_time, end_time)` into `interval_count` equal-width buckets,
/// reporting whether each bucket has data at all and, if a `bounding_box` is
/// given, whether that data falls within it.
///
/// Each interval is classified by scanning the collection for any record whose
/// time span overlaps it; [`Availability::AvailableWithinBoundingBox`] is
/// preferred over [`Availability::AvailableOutsideBoundingBox`] and a match stops
/// the scan early. Uses [`search::find`]'s binary variant when `collection` is
/// sorted by time, otherwise a linear scan per interval.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidValue`] if `interval_count` is zero or
/// `end_time <= start_time`, or an error if a record access fails.
pub fn data_availability<R: Record + TimeSpan + GeoPoint>(
    collection: &Collection<R>,
    start_time: u32,
    end_time: u32,
    interval_count: usize,
    bounding_box: Option<BoundingBox>,
) -> Result<Vec<Availability>> {
    if interval_count == 0 {
        return Err(crate::Error::InvalidValue { field: "interval_count", reason: "must be at least 1".into() });
    }
    if end_time <= start_time {
        return Err(crate::Error::InvalidValue { field: "end_time", reason: "must be greater than start_time".into() });
    }

    let span = (end_time - start_time) as u64;
    let mut results = Vec::with_capacity(interval_count);
    for bucket in 0..interval_count {
        let bucket_start = start_time as u64 + span * bucket as u64 / interval_count as u64;
        let bucket_end = start_time as u64 + span * (bucket as u64 + 1) / interval_count as u64;
        results.push(classify_interval(collection, bucket_start as u32, bucket_end as u32, bounding_box.as_ref())?);
    }
    Ok(results)
}

fn classify_interval<R: Record + TimeSpan + GeoPoint>(
    collection: &Collection<R>,
    bucket_start: u32,
    bucket_end: u32,
    bounding_box: Option<&BoundingBox>,
) -> Result<Availability> {
    if collection.is_empty() {
        return Ok(Availability::NotAvailable);
    }
    let cmp = |i: usize| time_ordering_to_sign(collection.compare_element_to_span(i, bucket_start, bucket_end).expect("index in range"));
    let sorted = collection.sorted_by_time();
    let seed = search::find::<i64>(sorted, 0, collection.len(), &cmp, None, None);
    let Some(seed) = seed else {
        return Ok(Availability::NotAvailable);
    };

    // Sorted, non-overlapping records can't have more than one overlapping run, so
    // expanding outward from the seed index finds every match. An unsorted
    // collection has no such locality, so fall back to a full linear scan.
    let overlapping: Vec<usize> = if sorted {
        let mut lowest = seed;
        while lowest > 0 && cmp(lowest - 1) == 0 {
            lowest -= 1;
        }
        let mut highest = seed;
        while highest + 1 < collection.len() && cmp(highest + 1) == 0 {
            highest += 1;
        }
        (lowest..=highest).collect()
    } else {
        (0..collection.len()).filter(|&i| cmp(i) == 0).collect()
    };

    let mut found_outside = false;
    for i in overlapping {
        match bounding_box {
            Some(bb) if collection.element_in_bounding_box(i, bb)? => {
                return Ok(Availability::AvailableWithinBoundingBox);
            }
            Some(_) => found_outside = true,
            None => return Ok(Availability::AvailableWithinBoundingBox),
        }
    }
    Ok(if found_outside { Availability::AvailableOutsideBoundingBox } else { Availability::NotAvailable })
}
