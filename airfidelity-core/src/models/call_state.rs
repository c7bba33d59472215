use std::time::Instant;

/// Call activity state machine.
///
/// State transitions:
/// ```text
/// idle ─report(true)→ active ─report(false)→ cooling_down
///                       ↑                          │
///                       └──────report(true)────────┤
///                                                  ↓ (deadline elapses)
///                                                idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallActivityState {
    Idle,
    Active,
    CoolingDown { deadline: Instant },
}

impl CallActivityState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// True while a call is in progress or may still resume.
    pub fn is_call_active(&self) -> bool {
        !self.is_idle()
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self {
            Self::CoolingDown { deadline } => Some(*deadline),
            _ => None,
        }
    }
}

/// Edge reported by the call activity monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallTransition {
    Started,
    Ended,
}
