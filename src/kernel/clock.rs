/// Result of delivering one tick to the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockStep {
    /// No target duration, or stopped.
    Inert,
    /// Paused, or already expired. Nothing counted.
    Held,
    /// Counted one second; value is the new remaining time.
    Counted(u32),
    /// This tick brought remaining to zero. Reported once.
    Expired,
}

/// Countdown primitive for timed exercises.
///
/// Pure counting only: the cadence of `tick()` calls belongs to the session
/// driver. Never fails, never goes below zero.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    remaining: Option<u32>,
    paused: bool,
    expired: bool,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absent or zero target leaves the clock inert.
    pub fn start(&mut self, target_secs: Option<u32>) {
        self.remaining = target_secs.filter(|&secs| secs > 0);
        self.paused = false;
        self.expired = false;
    }

    pub fn tick(&mut self) -> ClockStep {
        let Some(remaining) = self.remaining else {
            return ClockStep::Inert;
        };
        if self.paused || self.expired {
            return ClockStep::Held;
        }

        let next = remaining.saturating_sub(1);
        self.remaining = Some(next);
        if next == 0 {
            self.expired = true;
            ClockStep::Expired
        } else {
            ClockStep::Counted(next)
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Makes the clock inert. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.remaining = None;
        self.paused = false;
        self.expired = false;
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn is_inert(&self) -> bool {
        self.remaining.is_none()
    }

    /// Whether the driver should be delivering ticks right now.
    pub fn is_counting(&self) -> bool {
        self.remaining.is_some() && !self.paused && !self.expired
    }

    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }
}
