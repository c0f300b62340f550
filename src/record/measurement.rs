//! `Measurement`: a `Point` with accuracy/heading/speed/speed-accuracy attached.

use crate::codec;
use crate::record::{GeoPoint, Point, Record, TimeSpan};
use byteorder::{ByteOrder, LittleEndian};

/// A GPS observation augmented with the sensor's own quality/motion estimates.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Measurement {
    /// The base point.
    pub point: Point,
    /// Horizontal accuracy estimate, meters, non-negative.
    pub accuracy: Option<f64>,
    /// Heading in degrees, normalized modulo 360 on encode.
    pub heading: Option<f64>,
    /// Speed, meters/second, non-negative.
    pub speed: Option<f64>,
    /// Speed accuracy estimate, meters/second, non-negative.
    pub speed_accuracy: Option<f64>,
}

impl Record for Measurement {
    const STRIDE: usize = 22;
    const TYPE_NAME: &'static str = "Measurement";

    fn encode(&self, out: &mut [u8]) {
        self.point.encode(&mut out[0..14]);
        LittleEndian::write_u16(&mut out[14..16], codec::encode_small_double(self.accuracy));
        LittleEndian::write_u16(&mut out[16..18], codec::encode_heading(self.heading));
        LittleEndian::write_u16(&mut out[18..20], codec::encode_small_double(self.speed));
        LittleEndian::write_u16(&mut out[20..22], codec::encode_small_double(self.speed_accuracy));
    }

    fn decode(bytes: &[u8]) -> Self {
        Measurement {
            point: Point::decode(&bytes[0..14]),
            accuracy: codec::decode_small_double(LittleEndian::read_u16(&bytes[14..16])),
            heading: codec::decode_heading(LittleEndian::read_u16(&bytes[16..18])),
            speed: codec::decode_small_double(LittleEndian::read_u16(&bytes[18..20])),
            speed_accuracy: codec::decode_small_double(LittleEndian::read_u16(&bytes[20..22])),
        }
    }
}

impl TimeSpan for Measurement {
    fn start_time(&self) -> u32 {
        self.point.start_time()
    }
}

impl GeoPoint for Measurement {
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
    fn encode_decode_round_trip() {
        let measurement = Measurement {
            point: Point { time: 5, latitude: 1.0, longitude: 2.0, altitude: Some(3.0) },
            accuracy: Some(5.5),
            heading: Some(190.0),
            speed: Some(12.3),
            speed_accuracy: Some(0.5),
        };
        let mut bytes = [0u8; Measurement::STRIDE];
        measurement.encode(&mut bytes);
        let decoded = Measurement::decode(&bytes);
        assert_eq!(measurement.point.time, decoded.point.time);
        assert_eq!(measurement.accuracy, decoded.accuracy);
        assert_eq!(measurement.heading, decoded.heading);
        assert_eq!(measurement.speed, decoded.speed);
        assert_eq!(measurement.speed_accuracy, decoded.speed_accuracy);
    }

    #[test]
    fn heading_normalizes_on_encode() {
        let a = Measurement { heading: Some(-10.0), ..Default::default() };
        let b = Measurement { heading: Some(350.0), ..Default::default() };
        let mut bytes_a = [0u8; Measurement::STRIDE];
        let mut bytes_b = [0u8; Measurement::STRIDE];
        a.encode(&mut bytes_a);
        b.encode(&mut bytes_b);
        assert_eq!(bytes_a, bytes_b);
    }

    #[test]
    fn stride_is_twenty_two() {
        assert_eq!(22, Measurement::STRIDE);
    }
}
