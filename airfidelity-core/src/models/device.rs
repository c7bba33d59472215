use std::fmt;

use serde::{Deserialize, Serialize};

/// Transport type for an audio device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioTransportType {
    BuiltIn,
    Bluetooth,
    #[serde(rename = "bluetooth_le")]
    BluetoothLE,
    Usb,
    Aggregate,
    Virtual,
    Other,
}

impl AudioTransportType {
    /// True only for classic Bluetooth and Bluetooth LE.
    pub fn is_bluetooth(&self) -> bool {
        matches!(self, Self::Bluetooth | Self::BluetoothLE)
    }
}

impl fmt::Display for AudioTransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::BuiltIn => "Built-In",
            Self::Bluetooth => "Bluetooth",
            Self::BluetoothLE => "Bluetooth LE",
            Self::Usb => "USB",
            Self::Aggregate => "Aggregate",
            Self::Virtual => "Virtual",
            Self::Other => "Other",
        };
        f.write_str(label)
    }
}

/// Point-in-time view of an audio device as reported by the audio system.
///
/// Replaced wholesale on every provider query; the engine never mutates one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub id: String,
    pub name: String,
    pub transport_type: AudioTransportType,
    /// Audio I/O is currently flowing on this device.
    #[serde(default)]
    pub is_running: bool,
    #[serde(default)]
    pub nominal_sample_rate: Option<f64>,
    #[serde(default)]
    pub output_channels: u32,
    #[serde(default)]
    pub input_channels: u32,
}

impl DeviceSnapshot {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        transport_type: AudioTransportType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            transport_type,
            is_running: false,
            nominal_sample_rate: None,
            output_channels: 0,
            input_channels: 0,
        }
    }

    pub fn with_sample_rate(mut self, rate: f64) -> Self {
        self.nominal_sample_rate = Some(rate);
        self
    }

    pub fn with_channels(mut self, output: u32, input: u32) -> Self {
        self.output_channels = output;
        self.input_channels = input;
        self
    }

    pub fn with_running(mut self, is_running: bool) -> Self {
        self.is_running = is_running;
        self
    }

    pub fn is_bluetooth(&self) -> bool {
        self.transport_type.is_bluetooth()
    }

    /// Bluetooth device that can play audio (headphones, not a bare mic).
    pub fn is_bluetooth_output(&self) -> bool {
        self.is_bluetooth() && self.output_channels > 0
    }
}

/// Entry in the manual input selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputDeviceChoice {
    pub name: String,
    pub id: String,
}

impl From<&DeviceSnapshot> for InputDeviceChoice {
    fn from(device: &DeviceSnapshot) -> Self {
        Self {
            name: device.name.clone(),
            id: device.id.clone(),
        }
    }
}
