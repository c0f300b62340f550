//! `Stay`: a `Point` extended with a duration (`time` to `endTime`).

use crate::codec;
use crate::error::{Error, Result};
use crate::record::{GeoPoint, Point, Record, TimeSpan};
use byteorder::{ByteOrder, LittleEndian};

/// A GPS "stay": dwelling at roughly one location for `[time, end_time]`.
///
/// `end_time` is `None` when left unspecified at construction, in which case it
/// resolves to `time` (see [`Stay::resolved_end_time`]) — but the wire format still
/// distinguishes "explicitly zero-duration" from "unspecified," round-tripping the
/// distinction via a reserved delta sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Stay {
    /// The base point; `point.time` is the stay's start.
    pub point: Point,
    /// Horizontal accuracy estimate, meters, non-negative.
    pub accuracy: Option<f64>,
    /// The explicit end time, if one was given. `None` means "same as `time`."
    pub end_time: Option<u32>,
}

impl Stay {
    /// Builds a new stay, validating `time <= end_time` when `end_time` is given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if `end_time < point.time`.
    pub fn new(point: Point, accuracy: Option<f64>, end_time: Option<u32>) -> Result<Stay> {
        if let Some(end) = end_time {
            if end < point.time {
                return Err(Error::InvalidValue {
                    field: "end_time",
                    reason: format!("end_time {end} is before time {}", point.time),
                });
            }
        }
        Ok(Stay { point, accuracy, end_time })
    }

    /// The stay's end time: `end_time` if set, otherwise `point.time`.
    pub fn resolved_end_time(&self) -> u32 {
        self.end_time.unwrap_or(self.point.time)
    }
}

impl Record for Stay {
    const STRIDE: usize = 20;
    const TYPE_NAME: &'static str = "Stay";

    fn encode(&self, out: &mut [u8]) {
        self.point.encode(&mut out[0..14]);
        LittleEndian::write_u16(&mut out[14..16], codec::encode_small_double(self.accuracy));
        let delta = self.end_time.map(|end| end - self.point.time);
        LittleEndian::write_u32(&mut out[16..20], codec::encode_time(delta));
    }

    fn decode(bytes: &[u8]) -> Self {
        let point = Point::decode(&bytes[0..14]);
        let accuracy = codec::decode_small_double(LittleEndian::read_u16(&bytes[14..16]));
        let delta = codec::decode_time(LittleEndian::read_u32(&bytes[16..20]));
        let end_time = delta.map(|d| point.time + d);
        Stay { point, accuracy, end_time }
    }
}

impl TimeSpan for Stay {
    fn start_time(&self) -> u32 {
        self.point.time
    }

    fn end_time(&self) -> u32 {
        self.resolved_end_time()
    }
}

impl GeoPoint for Stay {
    fn latitude(&self) -> f64 {
        self.point.latitude()
    }
    fn longitude(&self) -> f64 {
        self.point.longitude()
    }
    fn altitude(&self) -> Option<f64> {
        self.point.altitude()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_end_before_start() {
        let point = Point { time: 10, ..Default::default() };
        assert!(Stay::new(point, None, Some(5)).is_err());
    }

    #[test]
    fn omitted_end_time_resolves_to_start() {
        let point = Point { time: 10, ..Default::default() };
        let stay = Stay::new(point, None, None).unwrap();
        assert_eq!(10, stay.resolved_end_time());
        assert_eq!(10, TimeSpan::end_time(&stay));
    }

    #[test]
    fn encode_decode_round_trip_with_explicit_end() {
        let point = Point { time: 10, latitude: 1.0, longitude: 2.0, altitude: None };
        let stay = Stay::new(point, Some(3.5), Some(25)).unwrap();
        let mut bytes = [0u8; Stay::STRIDE];
        stay.encode(&mut bytes);
        let decoded = Stay::decode(&bytes);
        assert_eq!(Some(25), decoded.end_time);
        assert_eq!(stay.accuracy, decoded.accuracy);
    }

    #[test]
    fn encode_decode_round_trip_with_omitted_end() {
        let point = Point { time: 10, ..Default::default() };
        let stay = Stay::new(point, None, None).unwrap();
        let mut bytes = [0u8; Stay::STRIDE];
        stay.encode(&mut bytes);
        let decoded = Stay::decode(&bytes);
        assert_eq!(None, decoded.end_time);
        assert_eq!(10, decoded.resolved_end_time());
    }

    #[test]
    fn explicit_zero_duration_round_trips_distinctly_from_omitted() {
        let point = Point { time: 10, ..Default::default() };
        let explicit = Stay::new(point, None, Some(10)).unwrap();
        let omitted = Stay::new(point, None, None).unwrap();
        let mut explicit_bytes = [0u8; Stay::STRIDE];
        let mut omitted_bytes = [0u8; Stay::STRIDE];
        explicit.encode(&mut explicit_bytes);
        omitted.encode(&mut omitted_bytes);
        assert_ne!(explicit_bytes, omitted_bytes);
        assert_eq!(Some(10), Stay::decode(&explicit_bytes).end_time);
        assert_eq!(None, Stay::decode(&omitted_bytes).end_time);
    }

    #[test]
    fn stride_is_twenty() {
        assert_eq!(20, Stay::STRIDE);
    }
}
