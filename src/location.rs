//! Location records as parallel delta-encoded columns. (C4, Appendix §4.4)

use prost::Message;

use crate::error::CyfaceError;
use crate::offset::{deoffset_column, offset_column, DeOffsetter};
use crate::proto::LocationBatchProto;
use crate::quantize::{Quantiser, Stream};

/// The sentinel modality annotation used when no `MODALITY_TYPE_CHANGE`
/// has been seen yet for a location. Never a null annotation (Appendix
/// §3, invariant 3).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Modality(String);

impl Modality {
    pub const UNKNOWN: &'static str = "UNKNOWN";

    pub fn unknown() -> Self {
        Modality(Self::UNKNOWN.to_string())
    }

    pub fn new(value: impl Into<String>) -> Self {
        Modality(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Modality {
    fn default() -> Self {
        Modality::unknown()
    }
}

/// A location sample as it exists on the wire, before track
/// reconstruction annotates it with a modality and a measurement
/// back-reference.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate")
)]
pub struct LocationSample {
    pub timestamp: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
    pub speed: f64,
}

pub struct LocationCodec;

impl LocationCodec {
    /// Encode one column batch. The caller decides how many samples go
    /// into a batch; this crate always emits a single batch per call to
    /// [`crate::encode_measurement`].
    pub fn encode(samples: &[LocationSample]) -> LocationBatchProto {
        let mut timestamp = Vec::with_capacity(samples.len());
        let mut latitude = Vec::with_capacity(samples.len());
        let mut longitude = Vec::with_capacity(samples.len());
        let mut accuracy = Vec::with_capacity(samples.len());
        let mut speed = Vec::with_capacity(samples.len());

        for s in samples {
            timestamp.push(s.timestamp);
            latitude.push(Quantiser::encode(Stream::Latitude, s.latitude));
            longitude.push(Quantiser::encode(Stream::Longitude, s.longitude));
            accuracy.push(Quantiser::encode(Stream::Accuracy, s.accuracy));
            speed.push(Quantiser::encode(Stream::Speed, s.speed));
        }

        LocationBatchProto {
            timestamp: offset_column(&timestamp),
            latitude: offset_column(&latitude),
            longitude: offset_column(&longitude),
            accuracy: offset_column(&accuracy)
                .into_iter()
                .map(|v| v as i32)
                .collect(),
            speed: offset_column(&speed).into_iter().map(|v| v as i32).collect(),
        }
    }

    pub fn decode(batch: &LocationBatchProto) -> Result<Vec<LocationSample>, CyfaceError> {
        let n = batch.timestamp.len();
        if batch.latitude.len() != n
            || batch.longitude.len() != n
            || batch.accuracy.len() != n
            || batch.speed.len() != n
        {
            return Err(CyfaceError::MalformedStream(
                "location batch columns have mismatched lengths".into(),
            ));
        }

        let timestamps = deoffset_nondecreasing(&batch.timestamp)?;
        let latitudes = deoffset_column(&batch.latitude);
        let longitudes = deoffset_column(&batch.longitude);
        let accuracies = deoffset_column(&to_i64(&batch.accuracy));
        let speeds = deoffset_column(&to_i64(&batch.speed));

        (0..n)
            .map(|i| {
                Ok(LocationSample {
                    timestamp: timestamps[i],
                    latitude: Quantiser::decode(Stream::Latitude, latitudes[i])?,
                    longitude: Quantiser::decode(Stream::Longitude, longitudes[i])?,
                    accuracy: Quantiser::decode(Stream::Accuracy, accuracies[i])?,
                    speed: Quantiser::decode(Stream::Speed, speeds[i])?,
                })
            })
            .collect()
    }

    /// Decode and concatenate, in arrival order, every opaque batch in
    /// `raw_batches`. Each batch is self-contained: its own
    /// [`DeOffsetter`] state never crosses a batch boundary.
    pub fn decode_batches(raw_batches: &[Vec<u8>]) -> Result<Vec<LocationSample>, CyfaceError> {
        let mut out = Vec::new();
        for raw in raw_batches {
            let batch = LocationBatchProto::decode(raw.as_slice())
                .map_err(|e| CyfaceError::MalformedStream(e.to_string()))?;
            out.extend(Self::decode(&batch)?);
        }
        Ok(out)
    }
}

fn to_i64(values: &[i32]) -> Vec<i64> {
    values.iter().map(|&v| v as i64).collect()
}

fn deoffset_nondecreasing(deltas: &[i64]) -> Result<Vec<i64>, CyfaceError> {
    let mut deoffsetter = DeOffsetter::new();
    let mut out = Vec::with_capacity(deltas.len());
    for (i, &delta) in deltas.iter().enumerate() {
        if i > 0 && delta < 0 {
            return Err(CyfaceError::MalformedStream(format!(
                "timestamp delta must be non-negative, got {delta}"
            )));
        }
        out.push(deoffsetter.push(delta));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ts: i64, lat: f64, lon: f64, acc: f64, speed: f64) -> LocationSample {
        LocationSample {
            timestamp: ts,
            latitude: lat,
            longitude: lon,
            accuracy: acc,
            speed,
        }
    }

    #[test]
    fn round_trips() {
        let samples = vec![
            sample(1000, 51.1, 13.1, 10.0, 0.1),
            sample(1500, 51.105, 13.102, 11.2, 1.5),
            sample(3000, 51.11, 13.09, 9.8, 2.0),
        ];
        let batch = LocationCodec::encode(&samples);
        let decoded = LocationCodec::decode(&batch).unwrap();
        assert_eq!(decoded.len(), samples.len());
        for (d, s) in decoded.iter().zip(&samples) {
            assert_eq!(d.timestamp, s.timestamp);
            assert!((d.latitude - s.latitude).abs() <= 5e-7);
            assert!((d.longitude - s.longitude).abs() <= 5e-7);
        }
    }

    #[test]
    fn mismatched_column_lengths_are_malformed() {
        let mut batch = LocationCodec::encode(&[sample(1000, 51.1, 13.1, 10.0, 0.1)]);
        batch.latitude.push(0);
        assert!(matches!(
            LocationCodec::decode(&batch),
            Err(CyfaceError::MalformedStream(_))
        ));
    }

    #[test]
    fn negative_timestamp_delta_is_malformed() {
        let mut batch = LocationCodec::encode(&[
            sample(1000, 51.1, 13.1, 10.0, 0.1),
            sample(1500, 51.1, 13.1, 10.0, 0.1),
        ]);
        batch.timestamp[1] = -1;
        assert!(matches!(
            LocationCodec::decode(&batch),
            Err(CyfaceError::MalformedStream(_))
        ));
    }

    #[test]
    fn multiple_batches_concatenate_in_arrival_order() {
        let first = LocationCodec::encode(&[sample(1000, 51.1, 13.1, 10.0, 0.1)]);
        let second = LocationCodec::encode(&[sample(2000, 51.2, 13.2, 10.0, 0.1)]);
        let raw = vec![first.encode_to_vec(), second.encode_to_vec()];
        let decoded = LocationCodec::decode_batches(&raw).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].timestamp, 1000);
        assert_eq!(decoded[1].timestamp, 2000);
    }
}
