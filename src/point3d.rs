//! 3-axis sensor samples (acceleration, rotation, direction) as parallel
//! delta-encoded columns. (C5, Appendix §4.5)

use prost::Message;

use crate::error::CyfaceError;
use crate::offset::{deoffset_column, offset_column, DeOffsetter};
use crate::proto::Point3DBatchProto;
use crate::quantize::{Quantiser, Stream};

/// Which of the three parallel sensor streams a batch belongs to. Only
/// the quantisation stream (decimal places, range) differs between them;
/// the column layout is identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate")
)]
pub enum SensorKind {
    Acceleration,
    Rotation,
    Direction,
}

impl SensorKind {
    fn stream(self) -> Stream {
        match self {
            SensorKind::Acceleration => Stream::Acceleration,
            SensorKind::Rotation => Stream::Rotation,
            SensorKind::Direction => Stream::Direction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Point3D {
    pub timestamp: i64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

pub struct Point3DCodec;

impl Point3DCodec {
    pub fn encode(kind: SensorKind, samples: &[Point3D]) -> Point3DBatchProto {
        let stream = kind.stream();
        let mut timestamp = Vec::with_capacity(samples.len());
        let mut x = Vec::with_capacity(samples.len());
        let mut y = Vec::with_capacity(samples.len());
        let mut z = Vec::with_capacity(samples.len());

        for s in samples {
            timestamp.push(s.timestamp);
            x.push(Quantiser::encode(stream, s.x));
            y.push(Quantiser::encode(stream, s.y));
            z.push(Quantiser::encode(stream, s.z));
        }

        Point3DBatchProto {
            timestamp: offset_column(&timestamp),
            x: offset_column(&x).into_iter().map(|v| v as i32).collect(),
            y: offset_column(&y).into_iter().map(|v| v as i32).collect(),
            z: offset_column(&z).into_iter().map(|v| v as i32).collect(),
        }
    }

    pub fn decode(kind: SensorKind, batch: &Point3DBatchProto) -> Result<Vec<Point3D>, CyfaceError> {
        let stream = kind.stream();
        let n = batch.timestamp.len();
        if batch.x.len() != n || batch.y.len() != n || batch.z.len() != n {
            return Err(CyfaceError::MalformedStream(
                "point3D batch columns have mismatched lengths".into(),
            ));
        }

        let timestamps = deoffset_nondecreasing(&batch.timestamp)?;
        let xs = deoffset_column(&to_i64(&batch.x));
        let ys = deoffset_column(&to_i64(&batch.y));
        let zs = deoffset_column(&to_i64(&batch.z));

        (0..n)
            .map(|i| {
                Ok(Point3D {
                    timestamp: timestamps[i],
                    x: Quantiser::decode(stream, xs[i])?,
                    y: Quantiser::decode(stream, ys[i])?,
                    z: Quantiser::decode(stream, zs[i])?,
                })
            })
            .collect()
    }

    /// Decode and concatenate, in arrival order, every batch in
    /// `raw_batches`, resetting the [`DeOffsetter`] state at each batch
    /// boundary (Appendix §4.5).
    pub fn decode_batches(
        kind: SensorKind,
        raw_batches: &[Vec<u8>],
    ) -> Result<Vec<Point3D>, CyfaceError> {
        let mut out = Vec::new();
        for raw in raw_batches {
            let batch = Point3DBatchProto::decode(raw.as_slice())
                .map_err(|e| CyfaceError::MalformedStream(e.to_string()))?;
            out.extend(Self::decode(kind, &batch)?);
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
