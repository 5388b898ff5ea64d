use super::event::{CallbackSource, TelemetryEvent};
use crate::kernel::audio::monitor::StruggleEdge;
use crate::kernel::lifecycle::Phase;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetrySnapshot {
    pub pauses: u64,
    pub exercises_completed: u64,
    pub struggle_stats: StruggleStats,
    pub device_stats: DeviceStats,
    pub stale_stats: StaleStats,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StruggleStats {
    pub episodes: u64,
    pub resolved: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceStats {
    pub degradations: u64,
    pub warnings: u64,
    pub late_releases: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaleStats {
    pub clock: u64,
    pub sampler: u64,
}

impl TelemetrySnapshot {
    /// Folds one event into the running counts.
    pub fn apply(&mut self, event: &TelemetryEvent) {
        match event {
            TelemetryEvent::PhaseTransition { to: Phase::Paused, .. } => self.pauses += 1,
            TelemetryEvent::PhaseTransition { .. } => {}
            TelemetryEvent::ExerciseCompleted { .. } => self.exercises_completed += 1,
            TelemetryEvent::StruggleEdge(StruggleEdge::Detected) => self.struggle_stats.episodes += 1,
            TelemetryEvent::StruggleEdge(StruggleEdge::Resolved) => self.struggle_stats.resolved += 1,
            TelemetryEvent::DeviceDegraded { warned } => {
                self.device_stats.degradations += 1;
                if *warned {
                    self.device_stats.warnings += 1;
                }
            }
            TelemetryEvent::StaleCallback { source } => match source {
                CallbackSource::Clock => self.stale_stats.clock += 1,
                CallbackSource::Sampler => self.stale_stats.sampler += 1,
            },
            TelemetryEvent::LateDeviceReleased => self.device_stats.late_releases += 1,
        }
    }
}

pub fn compute_snapshot<'a>(events: impl IntoIterator<Item = &'a TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();
    for event in events {
        snap.apply(event);
    }
    snap
}
