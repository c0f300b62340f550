//! The three point-record variants and the capability traits shared between them.
//!
//! The original design presents `Point`/`Measurement`/`Stay` as a class hierarchy;
//! here that's expressed as three independent structs sharing a common 14-byte wire
//! prefix plus a pair of capability traits ([`TimeSpan`], [`GeoPoint`]) that give
//! generic code (the sorting wrapper, search, queries) uniform access to the fields
//! it needs without caring which concrete variant it's holding.

mod measurement;
mod point;
mod stay;

pub use measurement::Measurement;
pub use point::Point;
pub use stay::Stay;

/// A fixed-width binary record that can be stored in a [`crate::buffer::ColumnBuffer`].
pub trait Record: Clone {
    /// The number of bytes one record occupies on the wire.
    const STRIDE: usize;

    /// The name this variant's persister is registered and signed under.
    const TYPE_NAME: &'static str;

    /// The on-disk element layout version. Bump whenever `encode`/`decode` changes
    /// in a way that isn't backward-readable.
    const PERSISTER_VERSION: u16 = 1;

    /// Encodes `self` into `out`, which is guaranteed to be exactly `STRIDE` bytes.
    fn encode(&self, out: &mut [u8]);

    /// Decodes a record from `bytes`, which is guaranteed to be exactly `STRIDE`
    /// bytes.
    fn decode(bytes: &[u8]) -> Self;
}

/// How two time spans relate to one another under the half-open `[start, end)`
/// comparator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeOrdering {
    /// `a` entirely precedes `b`.
    Before,
    /// `a` entirely follows `b`.
    After,
    /// `a` and `b` have identical `(start, end)`.
    Same,
    /// `a` and `b` share some but not all of the same span, or have the same start
    /// but different ends.
    Overlapping,
}

/// A record's position in time.
///
/// For `Point` and `Measurement`, `end_time() == start_time()`: they have no
/// duration. `Stay` overrides `end_time()`. `time` itself is a required field on
/// every variant, so these are plain `u32`s, not `Option<u32>`.
pub trait TimeSpan {
    /// The (inclusive) start of this record's time span, in epoch seconds.
    fn start_time(&self) -> u32;

    /// The (exclusive, for spans with actual duration) end of this record's time
    /// span, in epoch seconds. Defaults to [`TimeSpan::start_time`].
    fn end_time(&self) -> u32 {
        self.start_time()
    }
}

/// Compares two time spans under the four-rule half-open-interval comparator.
///
/// Rules, in order:
/// 1. `end_a <= start_b && start_a != start_b` => `Before`
/// 2. `end_b <= start_a && start_a != start_b` => `After`
/// 3. `start_a == start_b && end_a == end_b` => `Same`
/// 4. otherwise => `Overlapping`
///
/// Point/Measurement's `end == start`, so for them this reduces to a plain integer
/// compare on `start`.
pub fn compare_spans<A: TimeSpan, B: TimeSpan>(a: &A, b: &B) -> TimeOrdering {
    let (start_a, end_a, start_b, end_b) =
        (a.start_time(), a.end_time(), b.start_time(), b.end_time());
    if end_a <= start_b && start_a != start_b {
        TimeOrdering::Before
    } else if end_b <= start_a && start_a != start_b {
        TimeOrdering::After
    } else if start_a == start_b && end_a == end_b {
        TimeOrdering::Same
    } else {
        TimeOrdering::Overlapping
    }
}

/// Latitude/longitude/altitude access shared by all three record variants, used by
/// the codec-avoiding bounding-box and E7 hot paths in [`crate::search`] and
/// [`crate::query`].
pub trait GeoPoint {
    /// Latitude in degrees.
    fn latitude(&self) -> f64;
    /// Longitude in degrees.
    fn longitude(&self) -> f64;
    /// Altitude in meters, if known.
    fn altitude(&self) -> Option<f64>;
}

/// A closed geographic bounding box, inclusive on all four edges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Southern edge, in degrees.
    pub min_lat: f64,
    /// Western edge, in degrees.
    pub min_lon: f64,
    /// Northern edge, in degrees.
    pub max_lat: f64,
    /// Eastern edge, in degrees.
    pub max_lon: f64,
}

impl BoundingBox {
    /// Whether `(lat, lon)` falls within this box, inclusive.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }

    /// Whether the given record's location falls within this box.
    pub fn contains_point<P: GeoPoint>(&self, point: &P) -> bool {
        self.contains(point.latitude(), point.longitude())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Span(u32, u32);

    impl TimeSpan for Span {
        fn start_time(&self) -> u32 {
            self.0
        }
        fn end_time(&self) -> u32 {
            self.1
        }
    }

    #[test]
    fn before_rule() {
        let a = Span(10, 12);
        let b = Span(20, 22);
        assert_eq!(TimeOrdering::Before, compare_spans(&a, &b));
        assert_eq!(TimeOrdering::After, compare_spans(&b, &a));
    }

    #[test]
    fn same_rule() {
        let a = Span(10, 12);
        let b = Span(10, 12);
        assert_eq!(TimeOrdering::Same, compare_spans(&a, &b));
    }

    #[test]
    fn overlapping_rule() {
        let a = Span(10, 15);
        let b = Span(12, 20);
        assert_eq!(TimeOrdering::Overlapping, compare_spans(&a, &b));
    }

    #[test]
    fn same_start_different_end_is_overlapping() {
        let a = Span(10, 12);
        let b = Span(10, 15);
        assert_eq!(TimeOrdering::Overlapping, compare_spans(&a, &b));
    }

    #[test]
    fn adjacent_spans_are_before_not_overlapping() {
        let a = Span(10, 20);
        let b = Span(20, 30);
        assert_eq!(TimeOrdering::Before, compare_spans(&a, &b));
    }

    #[test]
    fn bounding_box_contains() {
        let bb = BoundingBox { min_lat: 0.0, min_lon: 0.0, max_lat: 10.0, max_lon: 10.0 };
        assert!(bb.contains(5.0, 5.0));
        assert!(bb.contains(0.0, 0.0));
        assert!(bb.contains(10.0, 10.0));
        assert!(!bb.contains(-1.0, 5.0));
        assert!(!bb.contains(5.0, 11.0));
    }
}
