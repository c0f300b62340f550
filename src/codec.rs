//! Bit-exact conversions between domain values and their fixed-width wire
//! representations.
//!
//! Every function here is total: out-of-range inputs are clamped rather than
//! rejected, and every encoding has exactly one reserved sentinel value standing in
//! for `None`. All widths and resolutions are as specified in the format's codec
//! table; see the module-level constants for the exact numbers.

/// The `u32` value reserved to mean "no time" on the wire.
pub const TIME_NULL: u32 = u32::MAX;

/// The largest second count a non-null time value may take.
pub const TIME_MAX: u32 = u32::MAX - 1;

/// `round((90 + deg) * 1e7)`'s representable upper bound.
const LATITUDE_MAX_E7: u32 = 1_800_000_000;

/// `round((180 + deg) * 1e7)`'s representable upper bound.
const LONGITUDE_MAX_E7: u32 = 3_600_000_000;

/// `floor(i16::MAX / 2)`, used to derive the altitude null sentinel.
const ALTITUDE_EXTREME: i32 = (i16::MAX as i32) / 2;

/// The `i16` value reserved to mean "no altitude" on the wire.
pub const ALTITUDE_NULL: i16 = (2 * ALTITUDE_EXTREME + 1) as i16;

/// The largest magnitude a non-null altitude may round to without colliding with
/// [`ALTITUDE_NULL`].
const ALTITUDE_MAX_ENCODED: i32 = (ALTITUDE_NULL - 1) as i32;

/// The `u16` value reserved to mean "no value" for small doubles (accuracy, speed,
/// heading, ...).
pub const SMALL_DOUBLE_NULL: u16 = u16::MAX;

/// Encodes an optional time (whole seconds since the epoch) into its wire form.
///
/// `None` encodes to [`TIME_NULL`]. Any `Some(seconds)` with `seconds >= TIME_NULL`
/// is clamped to [`TIME_MAX`], since `TIME_NULL` itself is reserved.
pub fn encode_time(time: Option<u32>) -> u32 {
    match time {
        None => TIME_NULL,
        Some(seconds) => seconds.min(TIME_MAX),
    }
}

/// Decodes a wire time value, returning `None` for the sentinel.
pub fn decode_time(encoded: u32) -> Option<u32> {
    if encoded == TIME_NULL {
        None
    } else {
        Some(encoded)
    }
}

/// Encodes latitude degrees into the E7 integer representation, clamping to
/// `[-90, 90]` first.
pub fn encode_latitude(degrees: f64) -> u32 {
    let clamped = degrees.clamp(-90.0, 90.0);
    let scaled = ((90.0 + clamped) * 1e7).round();
    clamp_to_u32(scaled, LATITUDE_MAX_E7)
}

/// Decodes an E7 latitude integer back into degrees.
pub fn decode_latitude(encoded: u32) -> f64 {
    (encoded as f64) / 1e7 - 90.0
}

/// Encodes longitude degrees into the E7 integer representation, clamping to
/// `[-180, 180]` first.
pub fn encode_longitude(degrees: f64) -> u32 {
    let clamped = degrees.clamp(-180.0, 180.0);
    let scaled = ((180.0 + clamped) * 1e7).round();
    clamp_to_u32(scaled, LONGITUDE_MAX_E7)
}

/// Decodes an E7 longitude integer back into degrees.
pub fn decode_longitude(encoded: u32) -> f64 {
    (encoded as f64) / 1e7 - 180.0
}

fn clamp_to_u32(scaled: f64, max: u32) -> u32 {
    if scaled <= 0.0 {
        0
    } else if scaled >= max as f64 {
        max
    } else {
        scaled as u32
    }
}

/// Encodes an optional altitude in meters, at 0.5 m resolution.
///
/// `None` encodes to [`ALTITUDE_NULL`]. Finite values are clamped to
/// `[-16383.5, 16383.5]`; the clamped encoding is then pinned one step below
/// [`ALTITUDE_NULL`] if rounding would otherwise land exactly on the sentinel (see
/// `DESIGN.md` for why the declared range's upper bound collides with the sentinel).
pub fn encode_altitude(altitude: Option<f64>) -> i16 {
    match altitude {
        None => ALTITUDE_NULL,
        Some(meters) => {
            let clamped = meters.clamp(-16383.5, 16383.5);
            let scaled = (2.0 * clamped).round() as i32;
            scaled.clamp(i16::MIN as i32, ALTITUDE_MAX_ENCODED) as i16
        }
    }
}

/// Decodes a wire altitude value, returning `None` for the sentinel.
pub fn decode_altitude(encoded: i16) -> Option<f64> {
    if encoded == ALTITUDE_NULL {
        None
    } else {
        Some(encoded as f64 / 2.0)
    }
}

/// Encodes an optional non-negative small double (accuracy, speed, speed accuracy)
/// at 0.1 resolution.
///
/// `None` encodes to [`SMALL_DOUBLE_NULL`]. Negative values clamp to zero; values
/// large enough to round to the sentinel clamp one step below it.
pub fn encode_small_double(value: Option<f64>) -> u16 {
    match value {
        None => SMALL_DOUBLE_NULL,
        Some(v) => {
            let clamped = v.max(0.0);
            let scaled = (10.0 * clamped).round();
            if scaled >= SMALL_DOUBLE_NULL as f64 {
                SMALL_DOUBLE_NULL - 1
            } else {
                scaled as u16
            }
        }
    }
}

/// Decodes a wire small-double value, returning `None` for the sentinel.
pub fn decode_small_double(encoded: u16) -> Option<f64> {
    if encoded == SMALL_DOUBLE_NULL {
        None
    } else {
        Some(encoded as f64 / 10.0)
    }
}

/// Encodes an optional heading in degrees, normalizing modulo 360 before encoding
/// as a small double. `None` propagates to the sentinel.
pub fn encode_heading(heading: Option<f64>) -> u16 {
    encode_small_double(heading.map(|h| h.rem_euclid(360.0)))
}

/// Decodes a wire heading value, returning `None` for the sentinel.
pub fn decode_heading(encoded: u16) -> Option<f64> {
    decode_small_double(encoded)
}
