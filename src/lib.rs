//! A decoder and encoder for the Cyface binary measurement format: a
//! stream of user-interaction events, a stream of GNSS location records,
//! and three parallel streams of 3-axis sensor samples (acceleration,
//! rotation, direction), as produced by resource-constrained mobile
//! measurement clients.
//!
//! Common abbreviations:
//!
//! - GNSS: global navigation satellite system;
//! - BE: big-endian.
//!
//! This crate is sans-I/O: encode/decode are pure functions over
//! caller-supplied buffers. The outer deflate compression and the
//! surrounding upload/storage protocol are both external collaborators;
//! this crate only decides what values go in each field and in what
//! preprocessed (quantised, delta-encoded) form.

mod bucket;
mod envelope;
mod error;
mod event;
mod location;
mod measurement;
mod offset;
mod point3d;
mod proto;
mod quantize;
mod sink;
mod track;

pub use bucket::{BucketAssembler, TrackBucket};
pub use envelope::{decode_envelope, encode_envelope, DecodedEnvelope, CURRENT_FORMAT_VERSION};
pub use error::CyfaceError;
pub use event::{Event, EventCodec, EventKind};
pub use location::{LocationCodec, LocationSample, Modality};
pub use measurement::{CaptureDevice, Measurement, MeasurementIdentifier, MetaData, RawRecord, Track};
pub use offset::{deoffset_column, offset_column, DeOffsetter, Offsetter};
pub use point3d::{Point3D, Point3DCodec, SensorKind};
pub use quantize::{Quantiser, Stream};
pub use sink::{DiagnosticEvent, DiagnosticsSink};
pub use track::TrackBuilder;

/// The out-of-band context a consumer must supply alongside envelope
/// bytes in order to reconstruct a full [`MetaData`] -- the parts of
/// `MetaData` that are not carried on the wire: the measurement
/// identifier, its reported length, the uploading user, and the upload
/// timestamp are all owned by the surrounding backend storage, not the
/// binary blob itself.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementContext {
    pub identifier: MeasurementIdentifier,
    pub length_meters: f64,
    pub user_id: String,
    pub upload_timestamp: Option<i64>,
}

/// Producer API: given metadata, tracks and events, produce the envelope
/// bytes. The caller applies the outer deflate wrapping themselves.
pub fn encode_measurement(metadata: &MetaData, tracks: &[Track], events: &[Event]) -> Vec<u8> {
    let mut locations = Vec::new();
    let mut accelerations = Vec::new();
    let mut rotations = Vec::new();
    let mut directions = Vec::new();

    for track in tracks {
        locations.extend(track.locations.iter().map(|r| LocationSample {
            timestamp: r.timestamp,
            latitude: r.latitude,
            longitude: r.longitude,
            accuracy: r.accuracy,
            speed: r.speed,
        }));
        accelerations.extend(track.accelerations.iter().copied());
        rotations.extend(track.rotations.iter().copied());
        directions.extend(track.directions.iter().copied());
    }

    envelope::encode_envelope(
        Some(&metadata.capture_device),
        events,
        &locations,
        &accelerations,
        &rotations,
        &directions,
    )
}

/// Consumer API: given envelope bytes and the out-of-band context a
/// backend already holds for this measurement, produce a fully
/// reconstructed [`Measurement`] or a fatal [`CyfaceError`]. No partial
/// measurement is ever returned alongside an error.
pub fn decode_measurement(
    bytes: &[u8],
    context: MeasurementContext,
    sink: &mut impl DiagnosticsSink,
) -> Result<Measurement, CyfaceError> {
    let decoded = envelope::decode_envelope(bytes, sink)?;

    let metadata = MetaData::new(
        context.identifier.clone(),
        decoded.capture_device.clone().unwrap_or_default(),
        context.length_meters,
        context.user_id,
        decoded.format_version,
        context.upload_timestamp,
    );

    let tracks = TrackBuilder::build(
        &decoded.locations,
        &decoded.accelerations,
        &decoded.rotations,
        &decoded.directions,
        &decoded.events,
        context.identifier,
        sink,
    )?;

    Ok(Measurement::new(metadata, tracks))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> MeasurementContext {
        MeasurementContext {
            identifier: MeasurementIdentifier::new("device-1", 42),
            length_meters: 120.5,
            user_id: "user-1".into(),
            upload_timestamp: Some(1_700_000_000_000),
        }
    }

    fn metadata() -> MetaData {
        MetaData::new(
            MeasurementIdentifier::new("device-1", 42),
            CaptureDevice {
                device_type: "Pixel 7".into(),
                os_version: "14".into(),
                app_version: "8.2.0".into(),
            },
            120.5,
            "user-1",
            CURRENT_FORMAT_VERSION,
            Some(1_700_000_000_000),
        )
    }

    #[test]
    fn encode_then_decode_round_trips_a_minimal_measurement() {
        let point = Point3D {
            timestamp: 1000,
            x: 1.0,
            y: -2.0,
            z: 3.0,
        };
        let track = Track {
            locations: vec![RawRecord {
                measurement_id: MeasurementIdentifier::new("device-1", 42),
                timestamp: 1000,
                latitude: 51.1,
                longitude: 13.1,
                elevation: None,
                accuracy: 10.0,
                speed: 0.1,
                modality: Modality::unknown(),
            }],
            accelerations: vec![point],
            rotations: vec![point],
            directions: vec![point],
        };

        let bytes = encode_measurement(&metadata(), &[track], &[]);
        let measurement = decode_measurement(&bytes, context(), &mut ()).unwrap();

        assert_eq!(measurement.tracks.len(), 1);
        let decoded_track = &measurement.tracks[0];
        assert_eq!(decoded_track.locations.len(), 1);
        assert_eq!(decoded_track.locations[0].modality, Modality::unknown());
        assert!((decoded_track.locations[0].latitude - 51.1).abs() <= 5e-7);
        assert_eq!(decoded_track.accelerations.len(), 1);
        assert_eq!(measurement.metadata.identifier, context().identifier);
        assert_eq!(measurement.metadata.capture_device.device_type, "Pixel 7");
    }

    #[test]
    fn rejects_format_version_two() {
        let bytes = [0x00, 0x02];
        let err = decode_measurement(&bytes, context(), &mut ()).unwrap_err();
        assert_eq!(err, CyfaceError::UnsupportedFormatVersion(2));
    }

    #[test]
    fn surfaces_invalid_lifecycle_events() {
        let events = vec![Event::lifecycle(EventKind::LifecycleResume, 1000)];
        let bytes = encode_measurement(&metadata(), &[], &events);
        let err = decode_measurement(&bytes, context(), &mut ()).unwrap_err();
        assert!(matches!(err, CyfaceError::InvalidLifecycleEvents(_)));
    }
}
