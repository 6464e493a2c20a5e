//! Error taxonomy (Appendix §7). Every variant is fatal to the operation
//! that raised it; nothing here is retried locally, and no partial
//! `Measurement` is ever returned alongside an `Err`.

use crate::quantize::Stream;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate")
)]
pub enum CyfaceError {
    /// The envelope's format-version header is not recognised.
    #[error("unsupported format version: {0}")]
    UnsupportedFormatVersion(u16),

    /// Column lengths within a batch disagree, or a timestamp delta
    /// decoded negative.
    #[error("malformed stream: {0}")]
    MalformedStream(String),

    /// A dequantised value exceeds the declared range for its stream.
    #[error("value out of range for {stream:?}: {value}")]
    OutOfRangeValue { stream: Stream, value: f64 },

    /// An event-type discriminant is not in the enumerated set.
    #[error("unknown event kind discriminant: {0}")]
    UnknownEventKind(i32),

    /// A required event value is missing or empty for its kind.
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    /// A `RESUME` with no prior `PAUSE`, or an empty modality value.
    #[error("invalid lifecycle events: {0}")]
    InvalidLifecycleEvents(String),

    /// Buckets being assembled into one measurement carry divergent
    /// metadata.
    #[error("inconsistent buckets: {0}")]
    InconsistentBuckets(String),

    /// `clear_after` was called with a timestamp outside every track's
    /// range.
    #[error("timestamp {0} not found in any track")]
    TimestampNotFound(i64),

    /// A multi-measurement source lacks the requested measurement id.
    #[error("no such measurement: {0}")]
    NoSuchMeasurement(u64),
}
