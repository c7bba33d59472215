use serde::{Deserialize, Serialize};

/// User preferences the engine consults on every decision.
///
/// Storage is the host's concern; the engine only reads these values and
/// writes the preferred input when the user picks one.
pub trait Preferences: Send + Sync {
    fn auto_switching_enabled(&self) -> bool;

    /// Preferred input device ID. Empty means "use the built-in mic".
    fn preferred_input_device_uid(&self) -> String;

    fn set_preferred_input_device_uid(&self, uid: &str);

    fn notify_on_quality_drop(&self) -> bool;

    fn notify_on_quality_restore(&self) -> bool;
}

/// Plain preference values, as stored or loaded by a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceValues {
    pub auto_switching_enabled: bool,
    pub preferred_input_device_uid: String,
    pub notify_on_quality_drop: bool,
    pub notify_on_quality_restore: bool,
}

impl Default for PreferenceValues {
    fn default() -> Self {
        Self {
            auto_switching_enabled: true,
            preferred_input_device_uid: String::new(),
            notify_on_quality_drop: false,
            notify_on_quality_restore: false,
        }
    }
}
