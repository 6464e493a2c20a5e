//! Wire shapes for the envelope body (Appendix §4.6/§6).
//!
//! These mirror the Protobuf schema maintained by the external framing
//! library this core delegates byte-level field encoding to; this module
//! only says *what* goes in each field, never how a length-delimited
//! message or a varint is laid out on the wire — that is `prost`'s job,
//! standing in for the external schema library. Field numbers are fixed
//! by the format and must never be renumbered.
//!
//! Each sensor stream (`location_records`, `accelerations`, `rotations`,
//! `directions`) is a `repeated bytes` of independently-encoded batch
//! messages rather than `repeated message`. This lets a producer that
//! already holds pre-serialised opaque batch bytes (mobile devices append
//! incrementally) push them in directly without re-parsing (Appendix
//! §4.6), and lets a decoder concatenate multiple batches in arrival
//! order (Appendix §4.5) by decoding each element independently.

use prost::Message;

#[derive(Clone, PartialEq, Message)]
pub struct CaptureDeviceProto {
    #[prost(string, tag = "1")]
    pub device_type: String,
    #[prost(string, tag = "2")]
    pub os_version: String,
    #[prost(string, tag = "3")]
    pub app_version: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct EventProto {
    #[prost(int32, tag = "1")]
    pub kind: i32,
    #[prost(int64, tag = "2")]
    pub timestamp: i64,
    #[prost(string, optional, tag = "3")]
    pub value: Option<String>,
}

/// A column batch of delta-encoded location samples. One instance of this
/// message, independently encoded, is what each element of
/// `MeasurementEnvelopeProto::location_records` decodes to.
#[derive(Clone, PartialEq, Message)]
pub struct LocationBatchProto {
    #[prost(int64, repeated, tag = "1")]
    pub timestamp: Vec<i64>,
    #[prost(int64, repeated, tag = "2")]
    pub latitude: Vec<i64>,
    #[prost(int64, repeated, tag = "3")]
    pub longitude: Vec<i64>,
    #[prost(int32, repeated, tag = "4")]
    pub accuracy: Vec<i32>,
    #[prost(int32, repeated, tag = "5")]
    pub speed: Vec<i32>,
}

/// A column batch of delta-encoded 3-axis sensor samples. Shared by
/// acceleration, rotation and direction streams; the scaling exponent
/// differs per stream but the wire shape does not.
#[derive(Clone, PartialEq, Message)]
pub struct Point3DBatchProto {
    #[prost(int64, repeated, tag = "1")]
    pub timestamp: Vec<i64>,
    #[prost(int32, repeated, tag = "2")]
    pub x: Vec<i32>,
    #[prost(int32, repeated, tag = "3")]
    pub y: Vec<i32>,
    #[prost(int32, repeated, tag = "4")]
    pub z: Vec<i32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct MeasurementEnvelopeProto {
    /// Mirror of the 2-byte header, carried in the body for sanity.
    #[prost(uint32, tag = "1")]
    pub format_version: u32,
    #[prost(message, repeated, tag = "2")]
    pub events: Vec<EventProto>,
    #[prost(bytes = "vec", repeated, tag = "3")]
    pub location_records: Vec<Vec<u8>>,
    #[prost(bytes = "vec", repeated, tag = "4")]
    pub accelerations: Vec<Vec<u8>>,
    #[prost(bytes = "vec", repeated, tag = "5")]
    pub rotations: Vec<Vec<u8>>,
    #[prost(bytes = "vec", repeated, tag = "6")]
    pub directions: Vec<Vec<u8>>,
    #[prost(message, optional, tag = "7")]
    pub capture_device: Option<CaptureDeviceProto>,
}
