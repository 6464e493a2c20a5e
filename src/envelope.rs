//! The outer envelope: a 2-byte format-version header followed by a
//! length-delimited Protobuf body. (C6, Appendix §4.6/§6)
//!
//! This module owns only the header and the mapping of decoded/encoded
//! values into the wire message's fields; the length-delimited framing
//! itself is `prost`'s job, standing in for the external schema library
//! this core delegates byte-level encoding to.

use prost::Message;

use crate::error::CyfaceError;
use crate::event::{Event, EventCodec};
use crate::location::LocationCodec;
use crate::measurement::CaptureDevice;
use crate::point3d::{Point3D, Point3DCodec, SensorKind};
use crate::proto::{CaptureDeviceProto, MeasurementEnvelopeProto};
use crate::sink::DiagnosticsSink;

/// The only format version this crate knows how to produce or consume.
pub const CURRENT_FORMAT_VERSION: u16 = 3;

/// The result of decoding an envelope's header and body, before
/// [`crate::track::TrackBuilder`] reconstructs tracks from the flat
/// sample streams.
pub struct DecodedEnvelope {
    pub format_version: u16,
    pub capture_device: Option<CaptureDevice>,
    pub events: Vec<Event>,
    pub locations: Vec<crate::location::LocationSample>,
    pub accelerations: Vec<Point3D>,
    pub rotations: Vec<Point3D>,
    pub directions: Vec<Point3D>,
}

/// Produce envelope bytes for one measurement. The caller is responsible
/// for the outer deflate wrapping (Appendix §6) -- these bytes are the
/// wire format's inner payload.
#[allow(clippy::too_many_arguments)]
pub fn encode_envelope(
    capture_device: Option<&CaptureDevice>,
    events: &[Event],
    locations: &[crate::location::LocationSample],
    accelerations: &[Point3D],
    rotations: &[Point3D],
    directions: &[Point3D],
) -> Vec<u8> {
    let body = MeasurementEnvelopeProto {
        format_version: CURRENT_FORMAT_VERSION as u32,
        events: EventCodec::encode(events),
        location_records: batch_bytes(locations.is_empty(), || LocationCodec::encode(locations)),
        accelerations: batch_bytes(accelerations.is_empty(), || {
            Point3DCodec::encode(SensorKind::Acceleration, accelerations)
        }),
        rotations: batch_bytes(rotations.is_empty(), || {
            Point3DCodec::encode(SensorKind::Rotation, rotations)
        }),
        directions: batch_bytes(directions.is_empty(), || {
            Point3DCodec::encode(SensorKind::Direction, directions)
        }),
        capture_device: capture_device.map(|cd| CaptureDeviceProto {
            device_type: cd.device_type.clone(),
            os_version: cd.os_version.clone(),
            app_version: cd.app_version.clone(),
        }),
    };

    let mut out = Vec::with_capacity(2 + body.encoded_len());
    out.extend_from_slice(&CURRENT_FORMAT_VERSION.to_be_bytes());
    body.encode(&mut out)
        .expect("encoding into a growable Vec<u8> cannot fail");
    out
}

fn batch_bytes<M: Message>(empty: bool, build: impl FnOnce() -> M) -> Vec<Vec<u8>> {
    if empty {
        vec![]
    } else {
        vec![build().encode_to_vec()]
    }
}

/// Consume envelope bytes, producing the decoded header, events and flat
/// sample streams, or a fatal [`CyfaceError`]. Does not reconstruct
/// tracks -- see [`crate::decode_measurement`] for the full pipeline.
pub fn decode_envelope(
    bytes: &[u8],
    sink: &mut impl DiagnosticsSink,
) -> Result<DecodedEnvelope, CyfaceError> {
    let _ = &sink; // reserved for future envelope-level diagnostics
    if bytes.len() < 2 {
        return Err(CyfaceError::MalformedStream(
            "envelope shorter than the 2-byte header".into(),
        ));
    }

    let version = u16::from_be_bytes([bytes[0], bytes[1]]);
    if version != CURRENT_FORMAT_VERSION {
        return Err(CyfaceError::UnsupportedFormatVersion(version));
    }

    let body = MeasurementEnvelopeProto::decode(&bytes[2..])
        .map_err(|e| CyfaceError::MalformedStream(e.to_string()))?;

    Ok(DecodedEnvelope {
        format_version: version,
        capture_device: body.capture_device.map(|cd| CaptureDevice {
            device_type: cd.device_type,
            os_version: cd.os_version,
            app_version: cd.app_version,
        }),
        events: EventCodec::decode(&body.events)?,
        locations: LocationCodec::decode_batches(&body.location_records)?,
        accelerations: Point3DCodec::decode_batches(SensorKind::Acceleration, &body.accelerations)?,
        rotations: Point3DCodec::decode_batches(SensorKind::Rotation, &body.rotations)?,
        directions: Point3DCodec::decode_batches(SensorKind::Direction, &body.directions)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::location::LocationSample;

    #[test]
    fn round_trips_header_and_body() {
        let events = vec![Event::lifecycle(EventKind::LifecycleStart, 0)];
        let locations = vec![LocationSample {
            timestamp: 1000,
            latitude: 51.1,
            longitude: 13.1,
            accuracy: 10.0,
            speed: 0.1,
        }];
        let capture_device = CaptureDevice {
            device_type: "Pixel".into(),
            os_version: "14".into(),
            app_version: "8.0.0".into(),
        };

        let bytes = encode_envelope(Some(&capture_device), &events, &locations, &[], &[], &[]);
        assert_eq!(&bytes[0..2], &CURRENT_FORMAT_VERSION.to_be_bytes());

        let decoded = decode_envelope(&bytes, &mut ()).unwrap();
        assert_eq!(decoded.format_version, CURRENT_FORMAT_VERSION);
        assert_eq!(decoded.events, events);
        assert_eq!(decoded.locations.len(), 1);
        assert_eq!(decoded.capture_device.unwrap(), capture_device);
    }

    #[test]
    fn rejects_unsupported_format_version() {
        let bytes = [0x00, 0x02];
        let err = decode_envelope(&bytes, &mut ()).unwrap_err();
        assert_eq!(err, CyfaceError::UnsupportedFormatVersion(2));
    }

    #[test]
    fn rejects_truncated_header() {
        let bytes = [0x00];
        assert!(matches!(
            decode_envelope(&bytes, &mut ()),
            Err(CyfaceError::MalformedStream(_))
        ));
    }
}
