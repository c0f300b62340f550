//! The base `Point` record: time, latitude, longitude, optional altitude.

use crate::codec;
use crate::record::{GeoPoint, Record, TimeSpan};
use byteorder::{ByteOrder, LittleEndian};

/// A single GPS observation: where, and when.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    /// Whole seconds since the epoch.
    pub time: u32,
    /// Degrees, clamped to `[-90, 90]` on encode.
    pub latitude: f64,
    /// Degrees, clamped to `[-180, 180]` on encode.
    pub longitude: f64,
    /// Meters, clamped to `[-16383.5, 16383.5]` on encode; `None` permitted.
    pub altitude: Option<f64>,
}

impl Default for Point {
    fn default() -> Self {
        Point { time: 0, latitude: 0.0, longitude: 0.0, altitude: None }
    }
}

impl Record for Point {
    const STRIDE: usize = 14;
    const TYPE_NAME: &'static str = "Point";

    fn encode(&self, out: &mut [u8]) {
        LittleEndian::write_u32(&mut out[0..4], self.time);
        LittleEndian::write_u32(&mut out[4..8], codec::encode_latitude(self.latitude));
        LittleEndian::write_u32(&mut out[8..12], codec::encode_longitude(self.longitude));
        LittleEndian::write_i16(&mut out[12..14], codec::encode_altitude(self.altitude));
    }

    fn decode(bytes: &[u8]) -> Self {
        Point {
            time: LittleEndian::read_u32(&bytes[0..4]),
            latitude: codec::decode_latitude(LittleEndian::read_u32(&bytes[4..8])),
            longitude: codec::decode_longitude(LittleEndian::read_u32(&bytes[8..12])),
            altitude: codec::decode_altitude(LittleEndian::read_i16(&bytes[12..14])),
        }
    }
}

impl TimeSpan for Point {
    fn start_time(&self) -> u32 {
        self.time
    }
}

impl GeoPoint for Point {
    fn latitude(&self) -> f64 {
        self.latitude
    }
    fn longitude(&self) -> f64 {
        self.longitude
    }
    fn altitude(&self) -> Option<f64> {
        self.altitude
    }
}
