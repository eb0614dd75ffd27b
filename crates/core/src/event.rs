use chrono::{DateTime, Utc};

/// A domain-agnostic event.
///
/// Events are facts: they are never modified after an aggregate emits them.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name (e.g. "tender.version_appended").
    fn event_type(&self) -> &'static str;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
