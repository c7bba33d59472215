use std::sync::Arc;

use crate::models::device::DeviceSnapshot;

/// Notification from the audio system, delivered one at a time to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    /// Devices that just became visible.
    DevicesAdded(Vec<DeviceSnapshot>),
    DefaultInputChanged,
    DefaultOutputChanged,
    /// Some device started or stopped doing I/O.
    DeviceRunningStateChanged,
}

/// Interface to the host's audio device layer.
///
/// Implemented by:
/// - `MemoryAudioSystem` (in-process simulation, tests and replay)
/// - Future: a Core Audio backend, a PipeWire backend
///
/// Queries return fresh snapshots every call. Events are not pulled from the
/// provider; the host forwards them to the engine as [`ProviderEvent`]s.
pub trait AudioSystemProvider: Send + Sync {
    /// All input-capable devices, in system order.
    fn all_input_devices(&self) -> Vec<DeviceSnapshot>;

    fn default_input_device(&self) -> Option<DeviceSnapshot>;

    fn default_output_device(&self) -> Option<DeviceSnapshot>;

    /// Ask the system to make `device_id` the default input.
    ///
    /// Fire-and-forget: the outcome is observed on the next query.
    fn set_default_input(&self, device_id: &str);
}

impl<T: AudioSystemProvider + ?Sized> AudioSystemProvider for Arc<T> {
    fn all_input_devices(&self) -> Vec<DeviceSnapshot> {
        (**self).all_input_devices()
    }

    fn default_input_device(&self) -> Option<DeviceSnapshot> {
        (**self).default_input_device()
    }

    fn default_output_device(&self) -> Option<DeviceSnapshot> {
        (**self).default_output_device()
    }

    fn set_default_input(&self, device_id: &str) {
        (**self).set_default_input(device_id)
    }
}
