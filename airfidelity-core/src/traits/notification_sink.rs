use crate::models::notification::QualityNotice;

/// Delivers user-facing notifications (e.g. the OS notification centre).
///
/// Called on the engine thread. Implementations should hand off to
/// their own queue if delivery can block.
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, notice: &QualityNotice);
}

/// Sink that discards everything.
pub struct NullNotificationSink;

impl NotificationSink for NullNotificationSink {
    fn deliver(&self, _notice: &QualityNotice) {}
}
