use serde::Serialize;

/// Title and body for a quality-change alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
}

/// A notification ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityNotice {
    /// Unique per notice so notification centres don't coalesce alerts.
    pub id: String,
    pub title: String,
    pub body: String,
}

impl QualityNotice {
    pub fn new(content: NotificationContent) -> Self {
        Self {
            id: format!("airfidelity.quality.{}", uuid::Uuid::new_v4()),
            title: content.title,
            body: content.body,
        }
    }
}
