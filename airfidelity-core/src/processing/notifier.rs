use std::sync::Arc;

use crate::models::notification::{NotificationContent, QualityNotice};
use crate::models::quality::QualityState;
use crate::traits::notification_sink::NotificationSink;
use crate::traits::preferences::Preferences;

/// Which transitions the user wants to hear about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyPrefs {
    pub on_drop: bool,
    pub on_restore: bool,
}

impl NotifyPrefs {
    pub fn from_preferences(preferences: &dyn Preferences) -> Self {
        Self {
            on_drop: preferences.notify_on_quality_drop(),
            on_restore: preferences.notify_on_quality_restore(),
        }
    }
}

/// Decide whether a quality transition deserves an alert.
///
/// Only HighQuality ⇄ CallMode transitions qualify; connecting or
/// disconnecting never does.
pub fn decide(
    old: QualityState,
    new: QualityState,
    device_name: &str,
    prefs: NotifyPrefs,
) -> Option<NotificationContent> {
    if old == new || old == QualityState::Disconnected || new == QualityState::Disconnected {
        return None;
    }

    match (old, new) {
        (QualityState::HighQuality, QualityState::CallMode) if prefs.on_drop => {
            Some(NotificationContent {
                title: "Audio quality reduced".into(),
                body: format!("{} switched to call mode", device_name),
            })
        }
        (QualityState::CallMode, QualityState::HighQuality) if prefs.on_restore => {
            Some(NotificationContent {
                title: "Audio quality restored".into(),
                body: format!("{} back to stereo", device_name),
            })
        }
        _ => None,
    }
}

/// Turns quality transitions into delivered notifications.
pub struct TransitionNotifier {
    preferences: Arc<dyn Preferences>,
    sink: Arc<dyn NotificationSink>,
}

impl TransitionNotifier {
    pub fn new(preferences: Arc<dyn Preferences>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { preferences, sink }
    }

    /// Returns the delivered notice, if any.
    pub fn quality_did_change(
        &self,
        old: QualityState,
        new: QualityState,
        device_name: &str,
    ) -> Option<QualityNotice> {
        let prefs = NotifyPrefs::from_preferences(self.preferences.as_ref());
        let content = decide(old, new, device_name, prefs)?;
        let notice = QualityNotice::new(content);
        log::info!("Notifying: {} ({})", notice.title, notice.body);
        self.sink.deliver(&notice);
        Some(notice)
    }
}
