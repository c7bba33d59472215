//! JSON scenario format.
//!
//! ```json
//! {
//!   "policy": { "connection_delay_secs": 0, "cooldown_secs": 5 },
//!   "preferences": { "notify_on_quality_drop": true },
//!   "initial": {
//!     "inputs": [{ "id": "mic", "name": "Built-in Mic", "transport_type": "built_in",
//!       "input_channels": 1 }],
//!     "default_input": "mic"
//!   },
//!   "steps": [
//!     { "action": "connect_bluetooth", "device": { "id": "bt", "name": "Headphones",
//!       "transport_type": "bluetooth", "nominal_sample_rate": 48000, "output_channels": 2,
//!       "input_channels": 1 } },
//!     { "action": "call_started", "device_id": "bt" },
//!     { "action": "advance", "ms": 6000 },
//!     { "action": "expect", "quality": "call_mode" }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use airfidelity_core::{
    ArbiterError, ArbitrationPolicy, DeviceSnapshot, PreferenceValues, QualityState,
};

/// A complete replayable session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub policy: ArbitrationPolicy,
    #[serde(default)]
    pub preferences: PreferenceValues,
    #[serde(default)]
    pub initial: InitialTopology,
    pub steps: Vec<Step>,
}

/// Devices present before the first step.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InitialTopology {
    pub inputs: Vec<DeviceSnapshot>,
    /// ID of one of `inputs`.
    pub default_input: Option<String>,
    pub default_output: Option<DeviceSnapshot>,
}

/// One thing that happens during a scenario.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    ConnectBluetooth {
        device: DeviceSnapshot,
        #[serde(default = "default_true")]
        as_output: bool,
        #[serde(default = "default_true")]
        add_as_input: bool,
    },
    Disconnect {
        device_id: String,
    },
    /// The OS changes the default input on its own.
    SwitchInput {
        device_id: String,
    },
    SetOutput {
        device: Option<DeviceSnapshot>,
    },
    UpdateDevice {
        device: DeviceSnapshot,
    },
    CallStarted {
        device_id: String,
    },
    CallEnded {
        device_id: String,
    },
    /// Flip the running flag; with `notify: false` only polling can see it.
    SetRunning {
        device_id: String,
        running: bool,
        #[serde(default = "default_true")]
        notify: bool,
    },
    SetAutoSwitching {
        enabled: bool,
    },
    Advance {
        ms: u64,
    },
    FixNow,
    SelectInput {
        device_id: String,
    },
    Refresh,
    Expect(Expectation),
}

/// Assertions checked against the engine; unset fields are not checked.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Expectation {
    pub quality: Option<QualityState>,
    pub summary: Option<String>,
    pub call_active: Option<bool>,
    pub input: Option<String>,
    pub switch_count: Option<usize>,
}

fn default_true() -> bool {
    true
}

impl Step {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ConnectBluetooth { .. } => "connect_bluetooth",
            Self::Disconnect { .. } => "disconnect",
            Self::SwitchInput { .. } => "switch_input",
            Self::SetOutput { .. } => "set_output",
            Self::UpdateDevice { .. } => "update_device",
            Self::CallStarted { .. } => "call_started",
            Self::CallEnded { .. } => "call_ended",
            Self::SetRunning { .. } => "set_running",
            Self::SetAutoSwitching { .. } => "set_auto_switching",
            Self::Advance { .. } => "advance",
            Self::FixNow => "fix_now",
            Self::SelectInput { .. } => "select_input",
            Self::Refresh => "refresh",
            Self::Expect(_) => "expect",
        }
    }
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, ArbiterError> {
        let scenario: Scenario = serde_json::from_str(json)
            .map_err(|e| ArbiterError::Scenario(format!("failed to parse scenario: {}", e)))?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self, ArbiterError> {
        let json = fs::read_to_string(path)
            .map_err(|e| ArbiterError::Io(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), ArbiterError> {
        self.policy.validate()?;
        if let Some(ref id) = self.initial.default_input {
            if !self.initial.inputs.iter().any(|d| &d.id == id) {
                return Err(ArbiterError::Scenario(format!(
                    "default input {} is not among the initial inputs",
                    id
                )));
            }
        }
        Ok(())
    }
}
