use std::collections::VecDeque;

use super::event::TelemetryEvent;
use super::metrics::{compute_snapshot, TelemetrySnapshot};
use crate::kernel::lifecycle::Phase;

/// Enough for a long session at one transition per second.
const CAPACITY: usize = 10_000;

/// Bounded log of controller telemetry. Oldest entries fall off first; the
/// running totals never do.
#[derive(Debug)]
pub struct TelemetryRecorder {
    log: VecDeque<TelemetryEvent>,
    totals: TelemetrySnapshot,
    evicted: u64,
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self {
            log: VecDeque::with_capacity(256),
            totals: TelemetrySnapshot::default(),
            evicted: 0,
        }
    }

    pub fn record(&mut self, event: TelemetryEvent) {
        self.totals.apply(&event);
        if self.log.len() >= CAPACITY {
            self.log.pop_front();
            self.evicted += 1;
        }
        self.log.push_back(event);
    }

    /// Session-wide counts, including evicted entries.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.totals.clone()
    }

    /// Counts over the entries still held.
    pub fn recent(&self) -> TelemetrySnapshot {
        compute_snapshot(&self.log)
    }

    /// Phase changes still in the log, oldest first.
    pub fn transitions(&self) -> impl Iterator<Item = (Phase, Phase)> + '_ {
        self.log.iter().filter_map(|event| match event {
            TelemetryEvent::PhaseTransition { from, to } => Some((*from, *to)),
            _ => None,
        })
    }

    /// Entries dropped to stay under capacity.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}
