//! In-process audio system and preferences.
//!
//! `MemoryAudioSystem` behaves like a real device layer that is driven by
//! hand: every simulation helper mutates the topology and returns the
//! [`ProviderEvent`] a real backend would emit, for the caller to forward.

use parking_lot::{Mutex, RwLock};

use crate::models::device::DeviceSnapshot;
use crate::traits::audio_system::{AudioSystemProvider, ProviderEvent};
use crate::traits::preferences::{PreferenceValues, Preferences};

#[derive(Debug, Default)]
struct Topology {
    inputs: Vec<DeviceSnapshot>,
    default_input: Option<DeviceSnapshot>,
    default_output: Option<DeviceSnapshot>,
    switch_requests: Vec<String>,
    declines_switches: bool,
}

/// Controllable audio system.
#[derive(Debug, Default)]
pub struct MemoryAudioSystem {
    topology: Mutex<Topology>,
}

impl MemoryAudioSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a known topology. Default input is looked up by ID among `inputs`.
    pub fn with_devices(
        inputs: Vec<DeviceSnapshot>,
        default_input_id: Option<&str>,
        default_output: Option<DeviceSnapshot>,
    ) -> Self {
        let default_input =
            default_input_id.and_then(|id| inputs.iter().find(|d| d.id == id).cloned());
        Self {
            topology: Mutex::new(Topology {
                inputs,
                default_input,
                default_output,
                ..Topology::default()
            }),
        }
    }

    /// Every device ID passed to `set_default_input`, oldest first.
    pub fn switch_requests(&self) -> Vec<String> {
        self.topology.lock().switch_requests.clone()
    }

    pub fn clear_switch_requests(&self) {
        self.topology.lock().switch_requests.clear();
    }

    /// Make the system ignore switch requests (they are still recorded).
    pub fn set_declines_switches(&self, declines: bool) {
        self.topology.lock().declines_switches = declines;
    }

    pub fn set_default_output(&self, device: Option<DeviceSnapshot>) -> ProviderEvent {
        self.topology.lock().default_output = device;
        ProviderEvent::DefaultOutputChanged
    }

    /// Headphones appear, optionally becoming the default output and an input.
    pub fn connect_bluetooth_headphones(
        &self,
        device: DeviceSnapshot,
        as_output: bool,
        add_as_input: bool,
    ) -> ProviderEvent {
        let mut topology = self.topology.lock();
        if as_output {
            topology.default_output = Some(device.clone());
        }
        if add_as_input && !topology.inputs.iter().any(|d| d.id == device.id) {
            topology.inputs.push(device.clone());
        }
        ProviderEvent::DevicesAdded(vec![device])
    }

    pub fn disconnect_bluetooth_headphones(&self, device_id: &str) -> ProviderEvent {
        let mut topology = self.topology.lock();
        topology.inputs.retain(|d| d.id != device_id);
        if topology.default_output.as_ref().is_some_and(|d| d.id == device_id) {
            topology.default_output = None;
        }
        if topology.default_input.as_ref().is_some_and(|d| d.id == device_id) {
            topology.default_input = None;
        }
        ProviderEvent::DefaultOutputChanged
    }

    /// The OS grabs an input on its own, e.g. the headset mic at call start.
    pub fn switch_input_externally(&self, device_id: &str) -> ProviderEvent {
        let mut topology = self.topology.lock();
        if let Some(device) = topology.inputs.iter().find(|d| d.id == device_id).cloned() {
            topology.default_input = Some(device);
        }
        ProviderEvent::DefaultInputChanged
    }

    pub fn simulate_call_started(&self, device_id: &str) -> ProviderEvent {
        self.set_running(device_id, true)
    }

    pub fn simulate_call_ended(&self, device_id: &str) -> ProviderEvent {
        self.set_running(device_id, false)
    }

    /// Update the running flag on every copy of the device.
    pub fn set_running(&self, device_id: &str, is_running: bool) -> ProviderEvent {
        let mut topology = self.topology.lock();
        let Topology {
            inputs,
            default_input,
            default_output,
            ..
        } = &mut *topology;
        inputs
            .iter_mut()
            .chain(default_input.iter_mut())
            .chain(default_output.iter_mut())
            .filter(|d| d.id == device_id)
            .for_each(|d| d.is_running = is_running);
        ProviderEvent::DeviceRunningStateChanged
    }

    /// Replace a device's properties everywhere it appears (e.g. A2DP → HFP).
    pub fn update_device(&self, device: DeviceSnapshot) -> ProviderEvent {
        let mut topology = self.topology.lock();
        let Topology {
            inputs,
            default_input,
            default_output,
            ..
        } = &mut *topology;
        inputs
            .iter_mut()
            .chain(default_input.iter_mut())
            .chain(default_output.iter_mut())
            .filter(|d| d.id == device.id)
            .for_each(|d| *d = device.clone());
        ProviderEvent::DefaultOutputChanged
    }
}

impl AudioSystemProvider for MemoryAudioSystem {
    fn all_input_devices(&self) -> Vec<DeviceSnapshot> {
        self.topology.lock().inputs.clone()
    }

    fn default_input_device(&self) -> Option<DeviceSnapshot> {
        self.topology.lock().default_input.clone()
    }

    fn default_output_device(&self) -> Option<DeviceSnapshot> {
        self.topology.lock().default_output.clone()
    }

    fn set_default_input(&self, device_id: &str) {
        let mut topology = self.topology.lock();
        topology.switch_requests.push(device_id.to_string());
        if topology.declines_switches {
            return;
        }
        if let Some(device) = topology.inputs.iter().find(|d| d.id == device_id).cloned() {
            topology.default_input = Some(device);
        }
    }
}

/// Preferences held in memory.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: RwLock<PreferenceValues>,
}

impl MemoryPreferences {
    pub fn new(values: PreferenceValues) -> Self {
        Self {
            values: RwLock::new(values),
        }
    }

    pub fn values(&self) -> PreferenceValues {
        self.values.read().clone()
    }

    pub fn set_auto_switching_enabled(&self, enabled: bool) {
        self.values.write().auto_switching_enabled = enabled;
    }

    pub fn set_notify_on_quality_drop(&self, enabled: bool) {
        self.values.write().notify_on_quality_drop = enabled;
    }

    pub fn set_notify_on_quality_restore(&self, enabled: bool) {
        self.values.write().notify_on_quality_restore = enabled;
    }

    pub fn reset_to_defaults(&self) {
        *self.values.write() = PreferenceValues::default();
    }
}

impl Preferences for MemoryPreferences {
    fn auto_switching_enabled(&self) -> bool {
        self.values.read().auto_switching_enabled
    }

    fn preferred_input_device_uid(&self) -> String {
        self.values.read().preferred_input_device_uid.clone()
    }

    fn set_preferred_input_device_uid(&self, uid: &str) {
        self.values.write().preferred_input_device_uid = uid.to_string();
    }

    fn notify_on_quality_drop(&self) -> bool {
        self.values.read().notify_on_quality_drop
    }

    fn notify_on_quality_restore(&self) -> bool {
        self.values.read().notify_on_quality_restore
    }
}
