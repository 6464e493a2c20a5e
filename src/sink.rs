//! Injected diagnostics, in place of a global logger or static singleton
//! (Appendix §9, design note "Global loggers and static singletons").
//!
//! `Envelope`/`TrackBuilder` report recoverable, non-fatal observations
//! through a caller-supplied sink rather than reaching for a process-wide
//! logging facade. A caller that does not care can pass `&mut ()`.

/// A recoverable observation made while decoding, distinct from the
/// fatal [`crate::error::CyfaceError`] conditions that abort the
/// operation outright.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    /// Samples were dropped because their timestamp fell strictly
    /// between a `PAUSE` and the following `RESUME` (Appendix §4.7.1).
    SkippedSamples {
        stream: &'static str,
        count: usize,
        pause_at: i64,
        resume_at: i64,
    },
}

pub trait DiagnosticsSink {
    fn note(&mut self, event: DiagnosticEvent);
}

/// The default no-op sink for callers that do not care about
/// diagnostics.
impl DiagnosticsSink for () {
    fn note(&mut self, _event: DiagnosticEvent) {}
}

/// Collects every diagnostic emitted during a call, in order.
impl DiagnosticsSink for Vec<DiagnosticEvent> {
    fn note(&mut self, event: DiagnosticEvent) {
        self.push(event);
    }
}
