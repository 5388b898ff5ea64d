use std::time::Duration;
use tokio::time::Instant;

/// Keeps the clock's sub-period phase across a pause so pausing neither
/// consumes nor grants time: with a 1s period, pausing 0.3s after a tick
/// means the first tick after resume fires 0.7s later.
#[derive(Debug, Clone)]
pub struct Cadence {
    period: Duration,
    anchor: Option<Instant>,
    carried: Duration,
}

impl Cadence {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            anchor: None,
            carried: Duration::ZERO,
        }
    }

    /// Marks the ticker as running from `now`; returns the delay until its
    /// first tick.
    pub fn start(&mut self, now: Instant, fresh: bool) -> Duration {
        if fresh {
            self.carried = Duration::ZERO;
        }
        self.anchor = Some(now);
        self.period - self.carried
    }

    /// Records how far into the current period the ticker got. No-op when
    /// not running.
    pub fn stop(&mut self, now: Instant) {
        if let Some(anchor) = self.anchor.take() {
            let phase = self.carried + now.saturating_duration_since(anchor);
            self.carried = wrap(phase, self.period);
        }
    }

    pub fn carried(&self) -> Duration {
        self.carried
    }
}

fn wrap(phase: Duration, period: Duration) -> Duration {
    let period_ns = period.as_nanos().max(1);
    Duration::from_nanos((phase.as_nanos() % period_ns) as u64)
}
