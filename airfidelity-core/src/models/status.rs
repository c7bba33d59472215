use chrono::{DateTime, Utc};
use serde::Serialize;

use super::quality::{CodecInfo, QualityState};

/// Name shown when there is no default device.
pub const NO_DEVICE_NAME: &str = "None";

/// Read-only view of the engine for the host UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStatus {
    pub output_device_name: String,
    pub input_device_name: String,
    pub quality: QualityState,
    pub is_bluetooth_output_connected: bool,
    pub codec: Option<CodecInfo>,
    pub is_call_active: bool,
    pub monitored_device_id: Option<String>,
    pub last_switch_at: Option<DateTime<Utc>>,
}

impl Default for EngineStatus {
    fn default() -> Self {
        Self {
            output_device_name: NO_DEVICE_NAME.into(),
            input_device_name: NO_DEVICE_NAME.into(),
            quality: QualityState::Unknown,
            is_bluetooth_output_connected: false,
            codec: None,
            is_call_active: false,
            monitored_device_id: None,
            last_switch_at: None,
        }
    }
}
