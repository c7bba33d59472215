use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ArbiterError;

/// Timing policy for an arbitration engine. Immutable once the engine is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbitrationPolicy {
    /// Seconds to wait after a Bluetooth output appears before auto-switching input.
    pub connection_delay_secs: f64,

    /// Seconds after an engine-initiated switch during which input-changed
    /// events are ignored.
    pub debounce_interval_secs: f64,

    /// Seconds a device must stay silent before a call is declared ended.
    pub cooldown_secs: f64,

    /// Fallback running-state poll interval in seconds (0 disables polling).
    pub poll_interval_secs: f64,
}

impl ArbitrationPolicy {
    /// Policy with no delays and no polling, for driving the engine by hand.
    pub fn immediate() -> Self {
        Self {
            connection_delay_secs: 0.0,
            debounce_interval_secs: 0.0,
            cooldown_secs: 0.0,
            poll_interval_secs: 0.0,
        }
    }

    pub fn validate(&self) -> Result<(), ArbiterError> {
        let fields = [
            ("connection_delay_secs", self.connection_delay_secs),
            ("debounce_interval_secs", self.debounce_interval_secs),
            ("cooldown_secs", self.cooldown_secs),
            ("poll_interval_secs", self.poll_interval_secs),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ArbiterError::InvalidPolicy(format!(
                    "{} must be a non-negative number of seconds, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    pub fn connection_delay(&self) -> Duration {
        secs(self.connection_delay_secs)
    }

    pub fn debounce_interval(&self) -> Duration {
        secs(self.debounce_interval_secs)
    }

    pub fn cooldown(&self) -> Duration {
        secs(self.cooldown_secs)
    }

    /// `None` when fallback polling is disabled or the interval rounds down
    /// to zero.
    pub fn poll_interval(&self) -> Option<Duration> {
        Some(secs(self.poll_interval_secs)).filter(|interval| !interval.is_zero())
    }
}

// Invalid values collapse to zero; `validate` is what rejects them.
fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

impl Default for ArbitrationPolicy {
    fn default() -> Self {
        Self {
            connection_delay_secs: 2.5,
            debounce_interval_secs: 1.0,
            cooldown_secs: 5.0,
            poll_interval_secs: 3.0,
        }
    }
}
