//! The in-memory measurement model and its invariants. (C9, Appendix §3,
//! §4.9)

use crate::error::CyfaceError;
use crate::location::Modality;
use crate::point3d::Point3D;

/// (device identifier, measurement identifier): globally unique per
/// device-measurement pair. `RawRecord` carries this back by value, never
/// as a shared owning handle (Appendix §9).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate")
)]
pub struct MeasurementIdentifier {
    pub device_id: String,
    pub measurement_id: u64,
}

impl MeasurementIdentifier {
    pub fn new(device_id: impl Into<String>, measurement_id: u64) -> Self {
        Self {
            device_id: device_id.into(),
            measurement_id,
        }
    }
}

/// Capture-device metadata fields carried in the envelope body (Appendix
/// §4.6/§6).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate")
)]
pub struct CaptureDevice {
    pub device_type: String,
    pub os_version: String,
    pub app_version: String,
}

/// Immutable once constructed (Appendix §9: no JavaBean-style setters).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate")
)]
pub struct MetaData {
    pub identifier: MeasurementIdentifier,
    pub capture_device: CaptureDevice,
    pub length_meters: f64,
    pub user_id: String,
    pub format_version: u16,
    pub upload_timestamp: Option<i64>,
}

impl MetaData {
    pub fn new(
        identifier: MeasurementIdentifier,
        capture_device: CaptureDevice,
        length_meters: f64,
        user_id: impl Into<String>,
        format_version: u16,
        upload_timestamp: Option<i64>,
    ) -> Self {
        Self {
            identifier,
            capture_device,
            length_meters,
            user_id: user_id.into(),
            format_version,
            upload_timestamp,
        }
    }
}

/// A location record, annotated with the modality active at the time it
/// was recorded. `measurement_id` is a value copy of the owning
/// measurement's identifier, not a lifetime anchor (Appendix §9).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate")
)]
pub struct RawRecord {
    pub measurement_id: MeasurementIdentifier,
    pub timestamp: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
    pub accuracy: f64,
    pub speed: f64,
    pub modality: Modality,
}

/// A contiguous recording segment between consecutive pause/resume
/// boundaries. Invariant: every sample's timestamp lies in
/// `[startAt, pauseAt]` for the segment it belongs to — guaranteed by
/// construction in [`crate::track::TrackBuilder`], never checked again
/// here.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Track {
    pub locations: Vec<RawRecord>,
    pub accelerations: Vec<Point3D>,
    pub rotations: Vec<Point3D>,
    pub directions: Vec<Point3D>,
}

impl Track {
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

fn track_timestamp_range(track: &Track) -> Option<(i64, i64)> {
    track
        .locations
        .iter()
        .map(|r| r.timestamp)
        .chain(track.accelerations.iter().map(|p| p.timestamp))
        .chain(track.rotations.iter().map(|p| p.timestamp))
        .chain(track.directions.iter().map(|p| p.timestamp))
        .fold(None, |acc, ts| match acc {
            None => Some((ts, ts)),
            Some((min, max)) => Some((min.min(ts), max.max(ts))),
        })
}

/// A measurement exclusively owns its tracks and their samples. A
/// well-formed measurement contains no empty tracks.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Measurement {
    pub metadata: MetaData,
    pub tracks: Vec<Track>,
}

impl Measurement {
    /// Construct a measurement from tracks already in their final order
    /// (chronological for [`crate::track::TrackBuilder`], ascending
    /// `trackId` for [`crate::bucket::BucketAssembler`]); only empty
    /// tracks are dropped here.
    pub fn new(metadata: MetaData, tracks: Vec<Track>) -> Self {
        let tracks = tracks.into_iter().filter(|t| !t.is_empty()).collect();
        Self { metadata, tracks }
    }

    /// Drop every sample (in any column, across every track) with
    /// `timestamp > t`. Fails with `TimestampNotFound` if no track
    /// contains `t` within its own `[min, max]` timestamp span. Tracks
    /// left empty by the truncation are removed (Appendix §9, resolved
    /// open question).
    pub fn clear_after(&mut self, t: i64) -> Result<(), CyfaceError> {
        let touched = self.tracks.iter().any(|track| {
            track_timestamp_range(track)
                .map(|(min, max)| t >= min && t <= max)
                .unwrap_or(false)
        });

        if !touched {
            return Err(CyfaceError::TimestampNotFound(t));
        }

        for track in &mut self.tracks {
            track.locations.retain(|r| r.timestamp <= t);
            track.accelerations.retain(|p| p.timestamp <= t);
            track.rotations.retain(|p| p.timestamp <= t);
            track.directions.retain(|p| p.timestamp <= t);
        }

        self.tracks.retain(|t| !t.is_empty());
        Ok(())
    }
}
