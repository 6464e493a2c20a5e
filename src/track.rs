//! Slicing the four raw parallel sample streams into `Track`s at
//! lifecycle pause/resume boundaries, with modality annotation. (C7,
//! Appendix §4.7) This is the single forward-pass reimplementation
//! mandated by Appendix §9 — no backward-seeking cursor.

use crate::error::CyfaceError;
use crate::event::{Event, EventKind};
use crate::location::{LocationSample, Modality};
use crate::measurement::{MeasurementIdentifier, RawRecord, Track};
use crate::point3d::Point3D;
use crate::sink::{DiagnosticEvent, DiagnosticsSink};

pub struct TrackBuilder;

impl TrackBuilder {
    /// Build the ordered list of tracks for one measurement.
    ///
    /// `locations`, `accelerations`, `rotations` and `directions` must
    /// each be sorted by timestamp, as must `events`. All failures are
    /// fatal: no partial track list is ever returned alongside an `Err`
    /// (Appendix §4.7.4).
    pub fn build(
        locations: &[LocationSample],
        accelerations: &[Point3D],
        rotations: &[Point3D],
        directions: &[Point3D],
        events: &[Event],
        measurement_id: MeasurementIdentifier,
        sink: &mut impl DiagnosticsSink,
    ) -> Result<Vec<Track>, CyfaceError> {
        let mut modality = ModalityWalker::new(events)?;
        let mut cursors = Cursors::default();
        let mut pause_at: Option<i64> = None;
        let mut tracks = Vec::new();

        for event in events {
            match event.kind {
                EventKind::LifecyclePause => pause_at = Some(event.timestamp),
                EventKind::LifecycleResume => {
                    let boundary = pause_at.take().ok_or_else(|| {
                        CyfaceError::InvalidLifecycleEvents(
                            "resume without prior pause".into(),
                        )
                    })?;

                    let track = Self::take_segment(
                        locations,
                        accelerations,
                        rotations,
                        directions,
                        &mut cursors,
                        boundary,
                        event.timestamp,
                        &measurement_id,
                        &mut modality,
                        sink,
                    );
                    if !track.is_empty() {
                        tracks.push(track);
                    }
                }
                _ => {}
            }
        }

        let tail = Self::take_tail(
            locations,
            accelerations,
            rotations,
            directions,
            &mut cursors,
            &measurement_id,
            &mut modality,
        );
        if !tail.is_empty() {
            tracks.push(tail);
        }

        Ok(tracks)
    }

    #[allow(clippy::too_many_arguments)]
    fn take_segment(
        locations: &[LocationSample],
        accelerations: &[Point3D],
        rotations: &[Point3D],
        directions: &[Point3D],
        cursors: &mut Cursors,
        pause_at: i64,
        resume_at: i64,
        measurement_id: &MeasurementIdentifier,
        modality: &mut ModalityWalker,
        sink: &mut impl DiagnosticsSink,
    ) -> Track {
        let (loc, loc_skipped) =
            collect_upto_and_skip(locations, &mut cursors.locations, |s| s.timestamp, pause_at, resume_at);
        let (acc, acc_skipped) = collect_upto_and_skip(
            accelerations,
            &mut cursors.accelerations,
            |s| s.timestamp,
            pause_at,
            resume_at,
        );
        let (rot, rot_skipped) =
            collect_upto_and_skip(rotations, &mut cursors.rotations, |s| s.timestamp, pause_at, resume_at);
        let (dir, dir_skipped) =
            collect_upto_and_skip(directions, &mut cursors.directions, |s| s.timestamp, pause_at, resume_at);

        for (stream, count) in [
            ("locations", loc_skipped),
            ("accelerations", acc_skipped),
            ("rotations", rot_skipped),
            ("directions", dir_skipped),
        ] {
            if count > 0 {
                sink.note(DiagnosticEvent::SkippedSamples {
                    stream,
                    count,
                    pause_at,
                    resume_at,
                });
            }
        }

        let locations = loc
            .into_iter()
            .map(|s| to_raw_record(s, measurement_id, modality))
            .collect();

        Track {
            locations,
            accelerations: acc,
            rotations: rot,
            directions: dir,
        }
    }

    fn take_tail(
        locations: &[LocationSample],
        accelerations: &[Point3D],
        rotations: &[Point3D],
        directions: &[Point3D],
        cursors: &mut Cursors,
        measurement_id: &MeasurementIdentifier,
        modality: &mut ModalityWalker,
    ) -> Track {
        let loc = collect_remaining(locations, &mut cursors.locations);
        let acc = collect_remaining(accelerations, &mut cursors.accelerations);
        let rot = collect_remaining(rotations, &mut cursors.rotations);
        let dir = collect_remaining(directions, &mut cursors.directions);

        let locations = loc
            .into_iter()
            .map(|s| to_raw_record(s, measurement_id, modality))
            .collect();

        Track {
            locations,
            accelerations: acc,
            rotations: rot,
            directions: dir,
        }
    }
}

#[derive(Default)]
struct Cursors {
    locations: usize,
    accelerations: usize,
    rotations: usize,
    directions: usize,
}

fn to_raw_record(
    sample: LocationSample,
    measurement_id: &MeasurementIdentifier,
    modality: &mut ModalityWalker,
) -> RawRecord {
    RawRecord {
        measurement_id: measurement_id.clone(),
        timestamp: sample.timestamp,
        latitude: sample.latitude,
        longitude: sample.longitude,
        elevation: None,
        accuracy: sample.accuracy,
        speed: sample.speed,
        modality: modality.annotate(sample.timestamp),
    }
}

/// Consume every sample with `timestamp <= pause_at`, then skip (without
/// collecting) every sample with `pause_at < timestamp < resume_at`.
/// Leaves `cursor` positioned so the next yielded element has
/// `timestamp >= resume_at`, if one exists (Appendix §4.7.2).
fn collect_upto_and_skip<T: Clone>(
    items: &[T],
    cursor: &mut usize,
    timestamp_of: impl Fn(&T) -> i64,
    pause_at: i64,
    resume_at: i64,
) -> (Vec<T>, usize) {
    let mut collected = Vec::new();
    while *cursor < items.len() && timestamp_of(&items[*cursor]) <= pause_at {
        collected.push(items[*cursor].clone());
        *cursor += 1;
    }

    let mut skipped = 0;
    while *cursor < items.len() && timestamp_of(&items[*cursor]) < resume_at {
        *cursor += 1;
        skipped += 1;
    }

    (collected, skipped)
}

fn collect_remaining<T: Clone>(items: &[T], cursor: &mut usize) -> Vec<T> {
    let rest = items[*cursor..].to_vec();
    *cursor = items.len();
    rest
}

/// Walks the `MODALITY_TYPE_CHANGE` events in timestamp order, applying
/// the last change with `timestamp <= location.timestamp` before
/// annotating that location (Appendix §4.7.3).
struct ModalityWalker<'a> {
    changes: Vec<&'a Event>,
    pos: usize,
    current: Modality,
}

impl<'a> ModalityWalker<'a> {
    fn new(events: &'a [Event]) -> Result<Self, CyfaceError> {
        let changes: Vec<&Event> = events
            .iter()
            .filter(|e| e.kind == EventKind::ModalityTypeChange)
            .collect();

        for change in &changes {
            match &change.value {
                Some(v) if !v.is_empty() => {}
                _ => {
                    return Err(CyfaceError::InvalidLifecycleEvents(
                        "MODALITY_TYPE_CHANGE missing or empty value".into(),
                    ))
                }
            }
        }

        Ok(Self {
            changes,
            pos: 0,
            current: Modality::unknown(),
        })
    }

    fn annotate(&mut self, timestamp: i64) -> Modality {
        while self.pos < self.changes.len() && self.changes[self.pos].timestamp <= timestamp {
            // The value was validated non-empty in `new`.
            self.current = Modality::new(self.changes[self.pos].value.clone().unwrap());
            self.pos += 1;
        }
        self.current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(ts: i64) -> LocationSample {
        LocationSample {
            timestamp: ts,
            latitude: 0.0,
            longitude: 0.0,
            accuracy: 0.0,
            speed: 0.0,
        }
    }

    fn mid() -> MeasurementIdentifier {
        MeasurementIdentifier::new("dev", 1)
    }

    #[test]
    fn minimal_measurement_one_location_unknown_modality() {
        let locations = vec![LocationSample {
            timestamp: 1000,
            latitude: 51.1,
            longitude: 13.1,
            accuracy: 10.0,
            speed: 0.1,
        }];
        let point = Point3D { timestamp: 1000, x: 1.0, y: -2.0, z: 3.0 };
        let tracks = TrackBuilder::build(
            &locations,
            &[point],
            &[point],
            &[point],
            &[],
            mid(),
            &mut (),
        )
        .unwrap();

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].locations.len(), 1);
        assert_eq!(tracks[0].locations[0].modality, Modality::unknown());
        assert_eq!(tracks[0].accelerations.len(), 1);
        assert_eq!(tracks[0].rotations.len(), 1);
        assert_eq!(tracks[0].directions.len(), 1);
    }

    #[test]
    fn modality_change_at_boundary() {
        let locations: Vec<_> = [1000, 1500, 3000, 4000].into_iter().map(loc).collect();
        let events = vec![
            Event::modality_change(0, "WALKING").unwrap(),
            Event::modality_change(3000, "BICYCLE").unwrap(),
        ];
        let tracks =
            TrackBuilder::build(&locations, &[], &[], &[], &events, mid(), &mut ()).unwrap();

        assert_eq!(tracks.len(), 1);
        let locs = &tracks[0].locations;
        assert_eq!(locs[0].modality.as_str(), "WALKING");
        assert_eq!(locs[1].modality.as_str(), "WALKING");
        assert_eq!(locs[2].modality.as_str(), "BICYCLE");
        assert_eq!(locs[3].modality.as_str(), "BICYCLE");
    }

    #[test]
    fn pause_resume_slicing_drops_gap_samples() {
        let locations: Vec<_> = [1000, 1500, 2500, 3500].into_iter().map(loc).collect();
        let events = vec![
            Event::lifecycle(EventKind::LifecyclePause, 1800),
            Event::lifecycle(EventKind::LifecycleResume, 3000),
        ];
        let tracks =
            TrackBuilder::build(&locations, &[], &[], &[], &events, mid(), &mut ()).unwrap();

        assert_eq!(tracks.len(), 2);
        assert_eq!(
            tracks[0].locations.iter().map(|r| r.timestamp).collect::<Vec<_>>(),
            vec![1000, 1500]
        );
        assert_eq!(
            tracks[1].locations.iter().map(|r| r.timestamp).collect::<Vec<_>>(),
            vec![3500]
        );
    }

    #[test]
    fn resume_without_pause_is_fatal() {
        let events = vec![Event::lifecycle(EventKind::LifecycleResume, 1000)];
        let err = TrackBuilder::build(&[], &[], &[], &[], &events, mid(), &mut ()).unwrap_err();
        assert!(matches!(err, CyfaceError::InvalidLifecycleEvents(_)));
    }

    #[test]
    fn empty_sub_tracks_are_dropped() {
        let locations: Vec<_> = [1000, 5000].into_iter().map(loc).collect();
        let events = vec![
            Event::lifecycle(EventKind::LifecyclePause, 1000),
            Event::lifecycle(EventKind::LifecycleResume, 4000),
        ];
        // Only the tail remains; the paused segment had no samples with
        // timestamp <= 1000 besides the first one already consumed, and
        // pausing right after it leaves an empty leading sub-track only
        // if no samples qualify -- here one does, so one track results
        // from the pause and one from the tail.
        let tracks =
            TrackBuilder::build(&locations, &[], &[], &[], &events, mid(), &mut ()).unwrap();
        assert_eq!(tracks.len(), 2);
    }

    #[test]
    fn track_ordering_is_first_timestamp_ascending() {
        let locations: Vec<_> = [1000, 2000, 5000, 6000].into_iter().map(loc).collect();
        let events = vec![
            Event::lifecycle(EventKind::LifecyclePause, 2000),
            Event::lifecycle(EventKind::LifecycleResume, 5000),
        ];
        let tracks =
            TrackBuilder::build(&locations, &[], &[], &[], &events, mid(), &mut ()).unwrap();
        let firsts: Vec<_> = tracks.iter().map(|t| t.locations[0].timestamp).collect();
        let mut sorted = firsts.clone();
        sorted.sort();
        assert_eq!(firsts, sorted);
    }

    #[test]
    fn diagnostics_sink_records_skipped_samples() {
        let locations: Vec<_> = [1000, 1500, 2500, 3500].into_iter().map(loc).collect();
        let events = vec![
            Event::lifecycle(EventKind::LifecyclePause, 1800),
            Event::lifecycle(EventKind::LifecycleResume, 3000),
        ];
        let mut diagnostics: Vec<DiagnosticEvent> = Vec::new();
        TrackBuilder::build(&locations, &[], &[], &[], &events, mid(), &mut diagnostics).unwrap();
        assert_eq!(
            diagnostics,
            vec![DiagnosticEvent::SkippedSamples {
                stream: "locations",
                count: 1,
                pause_at: 1800,
                resume_at: 3000,
            }]
        );
    }

    #[test]
    fn invalid_modality_value_is_fatal() {
        // Bypass Event::new's own guard to exercise TrackBuilder's
        // defence-in-depth check directly.
        let events = vec![Event {
            kind: EventKind::ModalityTypeChange,
            timestamp: 0,
            value: None,
        }];
        let err = TrackBuilder::build(&[], &[], &[], &[], &events, mid(), &mut ()).unwrap_err();
        assert!(matches!(err, CyfaceError::InvalidLifecycleEvents(_)));
    }
}
