//! Typed lifecycle/modality events. (C3, Appendix §4.3)

use crate::error::CyfaceError;
use crate::proto::EventProto;

/// The closed set of event-type discriminants this format understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate")
)]
pub enum EventKind {
    LifecycleStart,
    LifecyclePause,
    LifecycleResume,
    LifecycleStop,
    ModalityTypeChange,
}

impl EventKind {
    fn from_discriminant(discriminant: i32) -> Result<Self, CyfaceError> {
        Ok(match discriminant {
            0 => EventKind::LifecycleStart,
            1 => EventKind::LifecyclePause,
            2 => EventKind::LifecycleResume,
            3 => EventKind::LifecycleStop,
            4 => EventKind::ModalityTypeChange,
            other => return Err(CyfaceError::UnknownEventKind(other)),
        })
    }

    fn discriminant(self) -> i32 {
        match self {
            EventKind::LifecycleStart => 0,
            EventKind::LifecyclePause => 1,
            EventKind::LifecycleResume => 2,
            EventKind::LifecycleStop => 3,
            EventKind::ModalityTypeChange => 4,
        }
    }
}

/// A single lifecycle or modality event. `timestamp` is absolute; events
/// are sparse enough that delta-encoding them is not worthwhile.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Event {
    pub kind: EventKind,
    pub timestamp: i64,
    pub value: Option<String>,
}

impl Event {
    /// Construct an event, rejecting a `MODALITY_TYPE_CHANGE` with a
    /// missing or empty value up front so an invalid one can never exist
    /// in memory.
    pub fn new(kind: EventKind, timestamp: i64, value: Option<String>) -> Result<Self, CyfaceError> {
        if kind == EventKind::ModalityTypeChange {
            match &value {
                Some(v) if !v.is_empty() => {}
                _ => {
                    return Err(CyfaceError::MalformedEvent(
                        "MODALITY_TYPE_CHANGE requires a non-empty value".into(),
                    ))
                }
            }
        }
        Ok(Self {
            kind,
            timestamp,
            value,
        })
    }

    pub fn modality_change(timestamp: i64, value: impl Into<String>) -> Result<Self, CyfaceError> {
        Self::new(EventKind::ModalityTypeChange, timestamp, Some(value.into()))
    }

    pub fn lifecycle(kind: EventKind, timestamp: i64) -> Self {
        Self {
            kind,
            timestamp,
            value: None,
        }
    }
}

pub struct EventCodec;

impl EventCodec {
    pub fn encode(events: &[Event]) -> Vec<EventProto> {
        events
            .iter()
            .map(|e| EventProto {
                kind: e.kind.discriminant(),
                timestamp: e.timestamp,
                value: e.value.clone(),
            })
            .collect()
    }

    pub fn decode(raw: &[EventProto]) -> Result<Vec<Event>, CyfaceError> {
        raw.iter()
            .map(|p| {
                let kind = EventKind::from_discriminant(p.kind)?;
                Event::new(kind, p.timestamp, p.value.clone())
            })
            .collect()
    }
}
