use std::time::Instant;

/// Holds at most one pending deadline.
///
/// Arming replaces (and so cancels) whatever was pending.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TimerSlot {
    deadline: Option<Instant>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, deadline: Instant) {
        self.deadline = Some(deadline);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Disarm and return true if the deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn fires_once_at_deadline() {
        let now = Instant::now();
        let mut slot = TimerSlot::new();
        slot.arm(now + Duration::from_secs(1));

        assert!(!slot.take_due(now));
        assert!(slot.take_due(now + Duration::from_secs(1)));
        assert_eq!(slot.deadline(), None);
        assert!(!slot.take_due(now + Duration::from_secs(5)));
    }

    #[test]
    fn rearming_supersedes_previous_deadline() {
        let now = Instant::now();
        let mut slot = TimerSlot::new();
        slot.arm(now + Duration::from_secs(1));
        slot.arm(now + Duration::from_secs(3));

        assert!(!slot.take_due(now + Duration::from_secs(2)));
        assert_eq!(slot.deadline(), Some(now + Duration::from_secs(3)));
    }

    #[test]
    fn cancel_prevents_firing() {
        let now = Instant::now();
        let mut slot = TimerSlot::new();
        slot.arm(now);
        slot.cancel();
        assert!(!slot.take_due(now + Duration::from_secs(10)));
    }
}
