//! Fixed-point quantisation between floating point values and the signed
//! integers carried on the wire. (C1, Appendix §4.1)

use crate::error::CyfaceError;

/// A numeric column that is quantised to a fixed number of decimal places
/// before being delta-encoded. Bundles the decimal-places constant with the
/// declared range so the two can never be mismatched at a call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate")
)]
pub enum Stream {
    Latitude,
    Longitude,
    Accuracy,
    Speed,
    Acceleration,
    Rotation,
    Direction,
}

impl Stream {
    const fn decimal_places(self) -> i32 {
        match self {
            Stream::Latitude | Stream::Longitude => 6,
            Stream::Accuracy | Stream::Speed => 2,
            Stream::Acceleration | Stream::Rotation => 3,
            Stream::Direction => 2,
        }
    }

    /// The maximum admissible absolute value for this stream, per the
    /// declared physical range (Appendix §4.1).
    fn max_abs(self) -> f64 {
        match self {
            Stream::Latitude => 90.0,
            Stream::Longitude => 180.0,
            Stream::Accuracy => 1.0e5,
            Stream::Speed => 1000.0,
            Stream::Acceleration => 16.0,
            Stream::Rotation => 2.0 * 34.906_585,
            Stream::Direction => 4911.994,
        }
    }

    fn scale(self) -> f64 {
        10f64.powi(self.decimal_places())
    }
}

/// Converts values between their floating-point representation and the
/// `round(v * 10^d)` signed integer carried on the wire.
pub struct Quantiser;

impl Quantiser {
    /// Quantise `value` for `stream`. Rounding is half-away-from-zero.
    pub fn encode(stream: Stream, value: f64) -> i64 {
        round_half_away_from_zero(value * stream.scale()) as i64
    }

    /// Dequantise `raw` for `stream`, rejecting values outside the stream's
    /// declared range instead of clamping them.
    pub fn decode(stream: Stream, raw: i64) -> Result<f64, CyfaceError> {
        let value = raw as f64 / stream.scale();
        if value.abs() > stream.max_abs() {
            return Err(CyfaceError::OutOfRangeValue {
                stream,
                value,
            });
        }
        Ok(value)
    }
}

fn round_half_away_from_zero(v: f64) -> f64 {
    if v >= 0.0 {
        (v + 0.5).floor()
    } else {
        (v - 0.5).ceil()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_within_range() {
        let cases = [
            (Stream::Latitude, 51.1),
            (Stream::Longitude, 13.1),
            (Stream::Accuracy, 10.0),
            (Stream::Speed, 0.1),
            (Stream::Acceleration, -2.0),
            (Stream::Rotation, 1.234),
            (Stream::Direction, -3.0),
        ];

        for (stream, value) in cases {
            let raw = Quantiser::encode(stream, value);
            let back = Quantiser::decode(stream, raw).unwrap();
            assert!((back - value).abs() < 10f64.powi(-stream.decimal_places()));
        }
    }

    #[test]
    fn rejects_out_of_range() {
        let raw = Quantiser::encode(Stream::Latitude, 91.0);
        assert!(matches!(
            Quantiser::decode(Stream::Latitude, raw),
            Err(CyfaceError::OutOfRangeValue { stream: Stream::Latitude, .. })
        ));
    }

    #[test]
    fn half_away_from_zero_rounding() {
        assert_eq!(Quantiser::encode(Stream::Accuracy, 0.125), 13); // 12.5 -> 13
        assert_eq!(Quantiser::encode(Stream::Accuracy, -0.125), -13);
    }
}
