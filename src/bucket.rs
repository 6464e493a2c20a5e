//! Merging time-bucketed track fragments, as stored by the upstream
//! database, into a complete `Measurement`. (C8, Appendix §4.8)

use std::collections::BTreeMap;

use crate::error::CyfaceError;
use crate::measurement::{Measurement, MeasurementIdentifier, MetaData, Track};

/// A time-sliced fragment of a track. Fragments sharing a `track_id` are
/// contiguous in time and share `metadata`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate")
)]
pub struct TrackBucket {
    pub track_id: u64,
    pub bucket_instant: i64,
    pub fragment: Track,
    pub metadata: MetaData,
}

pub struct BucketAssembler;

impl BucketAssembler {
    /// Group buckets by `track_id`, order groups ascending by
    /// `track_id`, order buckets within a group ascending by
    /// `bucket_instant`, then concatenate each group's four streams into
    /// one `Track`. Permutation-invariant: the result does not depend on
    /// the order `buckets` were supplied in.
    pub fn assemble(buckets: Vec<TrackBucket>) -> Result<Measurement, CyfaceError> {
        let metadata = buckets
            .first()
            .map(|b| b.metadata.clone())
            .ok_or_else(|| CyfaceError::InconsistentBuckets("no buckets supplied".into()))?;

        if buckets.iter().any(|b| b.metadata != metadata) {
            return Err(CyfaceError::InconsistentBuckets(
                "buckets carry divergent metadata".into(),
            ));
        }

        let mut groups: BTreeMap<u64, Vec<&TrackBucket>> = BTreeMap::new();
        for bucket in &buckets {
            groups.entry(bucket.track_id).or_default().push(bucket);
        }

        let mut tracks = Vec::with_capacity(groups.len());
        for (_, mut members) in groups {
            members.sort_by_key(|b| b.bucket_instant);

            let mut track = Track::default();
            for member in members {
                track.locations.extend(member.fragment.locations.iter().cloned());
                track.accelerations.extend(member.fragment.accelerations.iter().cloned());
                track.rotations.extend(member.fragment.rotations.iter().cloned());
                track.directions.extend(member.fragment.directions.iter().cloned());
            }
            tracks.push(track);
        }

        Ok(Measurement::new(metadata, tracks))
    }

    /// Assemble only the buckets belonging to `identifier`, failing with
    /// `NoSuchMeasurement` if none match -- the lookup a multi-measurement
    /// bucket source needs (Appendix §7).
    pub fn assemble_for(
        buckets: &[TrackBucket],
        identifier: &MeasurementIdentifier,
    ) -> Result<Measurement, CyfaceError> {
        let matching: Vec<TrackBucket> = buckets
            .iter()
            .filter(|b| &b.metadata.identifier == identifier)
            .cloned()
            .collect();

        if matching.is_empty() {
            return Err(CyfaceError::NoSuchMeasurement(identifier.measurement_id));
        }

        Self::assemble(matching)
    }
}
