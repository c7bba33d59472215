use std::fmt;

use serde::{Deserialize, Serialize};

use super::device::DeviceSnapshot;

/// Effective audio quality of the default output device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityState {
    HighQuality,
    CallMode,
    /// No Bluetooth output device is currently the default.
    Disconnected,
    Unknown,
}

impl QualityState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::HighQuality => "High Quality Audio",
            Self::CallMode => "Call Mode",
            Self::Disconnected => "No Bluetooth Audio",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for QualityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Human-readable codec information inferred from a Bluetooth device.
///
/// Only exists for Bluetooth devices; see
/// [`classify`](crate::processing::classifier::classify).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodecInfo {
    pub codec_name: String,
    pub profile_name: String,
    pub sample_rate_display: String,
    pub channel_display: String,
    pub is_high_quality: bool,
    pub summary: String,
}

impl CodecInfo {
    /// Codec information for `device`, or `None` for non-Bluetooth devices.
    pub fn from_device(device: &DeviceSnapshot) -> Option<Self> {
        crate::processing::classifier::classify(device).codec
    }
}
