use std::time::{Duration, Instant};

use crate::models::call_state::{CallActivityState, CallTransition};

/// Cooldown-debounced call detector over a device's running signal.
///
/// The running flag of a Bluetooth device flickers around call start and end.
/// A call starts on the first "active" report and only ends once the device
/// has stayed silent for the whole cooldown. Any "active" report during the
/// cooldown cancels the pending end.
///
/// The cooldown deadline lives inside [`CallActivityState::CoolingDown`], so
/// leaving that state always cancels it. The owner drives expiry by calling
/// [`poll`](Self::poll) at or after [`next_deadline`](Self::next_deadline).
#[derive(Debug)]
pub struct CallActivityMonitor {
    state: CallActivityState,
    cooldown: Duration,
}

impl CallActivityMonitor {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            state: CallActivityState::Idle,
            cooldown,
        }
    }

    pub fn state(&self) -> CallActivityState {
        self.state
    }

    pub fn is_call_active(&self) -> bool {
        self.state.is_call_active()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.state.deadline()
    }

    /// Feed the latest running state of the monitored device.
    ///
    /// Returns `Started` on the idle → active edge; never returns `Ended`
    /// (that only comes out of [`poll`](Self::poll)).
    pub fn report(&mut self, is_active: bool, now: Instant) -> Option<CallTransition> {
        match (self.state, is_active) {
            (CallActivityState::Idle, true) => {
                self.state = CallActivityState::Active;
                log::info!("Call started");
                Some(CallTransition::Started)
            }
            (CallActivityState::CoolingDown { .. }, true) => {
                log::debug!("Device active again during cooldown, call continues");
                self.state = CallActivityState::Active;
                None
            }
            (CallActivityState::Active, false) => {
                let deadline = now + self.cooldown;
                log::debug!("Device went silent, cooling down for {:?}", self.cooldown);
                self.state = CallActivityState::CoolingDown { deadline };
                None
            }
            // Repeated silence keeps the first deadline.
            (CallActivityState::Active, true)
            | (CallActivityState::Idle, false)
            | (CallActivityState::CoolingDown { .. }, false) => None,
        }
    }

    /// Declare the call ended if the cooldown has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<CallTransition> {
        match self.state {
            CallActivityState::CoolingDown { deadline } if deadline <= now => {
                self.state = CallActivityState::Idle;
                log::info!("Call ended after {:?} of silence", self.cooldown);
                Some(CallTransition::Ended)
            }
            _ => None,
        }
    }

    /// Drop to idle immediately without reporting anything.
    pub fn reset(&mut self) {
        if !self.state.is_idle() {
            log::debug!("Call monitor reset from {:?}", self.state);
        }
        self.state = CallActivityState::Idle;
    }
}
