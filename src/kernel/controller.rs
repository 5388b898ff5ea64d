use tracing::{debug, info, warn};

use super::audio::monitor::{StruggleConfig, StruggleEdge, StruggleMonitor};
use super::cancel::{Epoch, EpochRegistry};
use super::clock::{Clock, ClockStep};
use super::event::{Command, Event};
use super::exercise::{CompletionDriver, ExerciseSpec};
use super::lifecycle::{Phase, PhaseGraph, PhaseRequest};
use super::scheduler::{SideEffect, Signal};
use super::sets::SetTracker;
use super::state::{SamplingStatus, SessionSnapshot};
use super::telemetry::event::{CallbackSource, TelemetryEvent};
use super::telemetry::recorder::TelemetryRecorder;
use crate::audio::StreamGuard;
use crate::error::DeviceError;
use crate::summary::Biometrics;

/// Coordinates the clock, set tracker and struggle monitor under one
/// pause/resume control.
///
/// Pure step machine: `handle` consumes one event and returns the side effects
/// for the driver to execute. It never awaits, never spawns and never touches a
/// device, so every ordering of ticks, samples and commands can be replayed in
/// tests. Timer and set state are mutated here and nowhere else.
pub struct SessionController {
    exercise: Option<ExerciseSpec>,
    phase: Phase,
    ended: bool,
    clock: Clock,
    sets: SetTracker,
    monitor: StruggleMonitor,
    epochs: EpochRegistry,
    sampling: SamplingStatus,
    device_warned: bool,
    completion_signaled: bool,
    last_published: Option<SessionSnapshot>,
    pub telemetry: TelemetryRecorder,
}

impl SessionController {
    pub fn new(struggle: StruggleConfig) -> Self {
        Self {
            exercise: None,
            phase: Phase::Idle,
            ended: false,
            clock: Clock::new(),
            sets: SetTracker::default(),
            monitor: StruggleMonitor::new(struggle),
            epochs: EpochRegistry::new(),
            sampling: SamplingStatus::Off,
            device_warned: false,
            completion_signaled: false,
            last_published: None,
            telemetry: TelemetryRecorder::new(),
        }
    }

    /// Single entry point. A fresh snapshot is appended whenever the visible
    /// state changed.
    pub fn handle(&mut self, event: Event) -> Vec<SideEffect> {
        let mut effects = Vec::new();

        match event {
            Event::Command(command) => self.on_command(command, &mut effects),
            Event::ClockTick { epoch } => self.on_clock_tick(epoch, &mut effects),
            Event::Amplitude { epoch, level } => self.on_amplitude(epoch, level, &mut effects),
            Event::DeviceReady { epoch, stream } => self.on_device_ready(epoch, stream, &mut effects),
            Event::DeviceFailed { epoch, error } => self.on_device_failed(epoch, error, &mut effects),
        }

        self.publish(&mut effects);
        effects
    }

    fn on_command(&mut self, command: Command, effects: &mut Vec<SideEffect>) {
        match command {
            Command::Load(spec) => self.load_exercise(spec, effects),
            Command::TogglePause => match self.phase {
                Phase::Running => self.pause(effects),
                Phase::Paused => self.resume(effects),
                other => debug!("Toggle pause ignored in {:?}", other),
            },
            Command::Pause => self.pause(effects),
            Command::Resume => self.resume(effects),
            Command::CompleteSet => self.complete_set(effects),
            Command::Skip(next) => self.skip(next, effects),
            Command::RetrySampling => self.retry_sampling(effects),
            Command::End(biometrics) => self.terminate(biometrics, effects),
        }
    }

    // === Commands ===

    fn load_exercise(&mut self, spec: ExerciseSpec, effects: &mut Vec<SideEffect>) {
        if self.ended {
            warn!("Session already ended; ignoring load of '{}'", spec.id);
            return;
        }

        self.halt_leaves(effects);
        self.clock.start(spec.duration_secs);
        self.sets.reset(spec.sets);
        self.completion_signaled = false;
        self.transition(PhaseRequest::Load);

        info!("Exercise loaded: '{}' driven by {:?}", spec.label(), spec.driver());
        self.exercise = Some(spec);
        self.start_leaves(true, effects);
    }

    fn pause(&mut self, effects: &mut Vec<SideEffect>) {
        if !self.transition(PhaseRequest::Pause) {
            debug!("Pause ignored in {:?}", self.phase);
            return;
        }
        self.clock.pause();
        self.halt_leaves(effects);
        info!("Session paused");
    }

    fn resume(&mut self, effects: &mut Vec<SideEffect>) {
        if !self.transition(PhaseRequest::Resume) {
            debug!("Resume ignored in {:?}", self.phase);
            return;
        }
        self.clock.resume();
        self.start_leaves(false, effects);
        info!("Session resumed");
    }

    fn complete_set(&mut self, effects: &mut Vec<SideEffect>) {
        let Some(spec) = self.exercise.as_ref() else {
            debug!("Complete set ignored: no exercise loaded");
            return;
        };
        if self.ended {
            return;
        }
        if spec.driver() == CompletionDriver::Timer {
            debug!("Complete set ignored: '{}' is timed", spec.id);
            return;
        }

        let advance = self.sets.advance();
        debug!("Set {}/{} (at cap: {})", advance.index, self.sets.target(), advance.at_cap);

        if advance.at_cap {
            self.finish(CompletionDriver::Sets, PhaseRequest::SetsComplete, effects);
        }
    }

    fn skip(&mut self, next: Option<ExerciseSpec>, effects: &mut Vec<SideEffect>) {
        let request = if next.is_some() {
            PhaseRequest::Skip
        } else {
            PhaseRequest::SkipToEnd
        };
        if PhaseGraph::transition(self.phase, request).is_none() {
            debug!("Skip ignored in {:?}", self.phase);
            return;
        }

        match next {
            Some(spec) => {
                info!("Skipping to '{}'", spec.label());
                self.load_exercise(spec, effects);
            }
            None => {
                info!("Skipped past the last exercise");
                self.halt_leaves(effects);
                self.clock.stop();
                self.sets.reset(1);
                self.exercise = None;
                self.completion_signaled = false;
                self.transition(PhaseRequest::SkipToEnd);
            }
        }
    }

    fn retry_sampling(&mut self, effects: &mut Vec<SideEffect>) {
        if self.ended || self.sampling != SamplingStatus::Degraded {
            debug!("Sampling retry ignored ({:?})", self.sampling);
            return;
        }

        info!("Retrying audio input acquisition");
        self.sampling = SamplingStatus::Off;
        self.device_warned = false;
        if self.phase == Phase::Running {
            self.start_sampling(effects);
        }
    }

    /// Unconditional stop of every leaf. Safe from any phase, any number of
    /// times; only the first call records a summary.
    fn terminate(&mut self, biometrics: Biometrics, effects: &mut Vec<SideEffect>) {
        self.epochs.revoke_clock();
        self.epochs.revoke_sampling();
        effects.push(SideEffect::StopClock);
        effects.push(SideEffect::StopSampling);
        if let Some(edge) = self.monitor.reset() {
            self.emit_struggle(edge, effects);
        }
        if self.sampling != SamplingStatus::Degraded {
            self.sampling = SamplingStatus::Off;
        }

        if self.ended {
            debug!("Session already ended");
            return;
        }

        self.transition(PhaseRequest::End);
        self.ended = true;
        info!("Session ended");
        effects.push(SideEffect::RecordSummary(biometrics));
        effects.push(SideEffect::Emit(Signal::SessionEnded));
    }

    // === Leaf callbacks ===

    fn on_clock_tick(&mut self, epoch: Epoch, effects: &mut Vec<SideEffect>) {
        if !self.epochs.is_clock_current(epoch) || self.phase != Phase::Running {
            debug!("Dropping stale clock tick {:?}", epoch);
            self.telemetry.record(TelemetryEvent::StaleCallback {
                source: CallbackSource::Clock,
            });
            return;
        }

        match self.clock.tick() {
            ClockStep::Counted(remaining) => debug!("Clock: {}s remaining", remaining),
            ClockStep::Expired => {
                debug!("Clock expired");
                self.finish(CompletionDriver::Timer, PhaseRequest::ClockExpired, effects);
            }
            ClockStep::Inert | ClockStep::Held => {}
        }
    }

    fn on_amplitude(&mut self, epoch: Epoch, level: f32, effects: &mut Vec<SideEffect>) {
        if !self.epochs.is_sampling_current(epoch)
            || self.phase != Phase::Running
            || self.sampling != SamplingStatus::Live
        {
            self.telemetry.record(TelemetryEvent::StaleCallback {
                source: CallbackSource::Sampler,
            });
            return;
        }

        if let Some(edge) = self.monitor.observe(level) {
            self.emit_struggle(edge, effects);
        }
    }

    fn on_device_ready(&mut self, epoch: Epoch, stream: StreamGuard, effects: &mut Vec<SideEffect>) {
        let wanted = self.epochs.is_sampling_current(epoch)
            && self.sampling == SamplingStatus::Acquiring
            && self.phase == Phase::Running;

        if wanted {
            info!("Audio input acquired; struggle detection live");
            self.sampling = SamplingStatus::Live;
            effects.push(SideEffect::StartSampler { epoch, stream });
        } else {
            info!("Releasing device handle that resolved after the session moved on");
            self.telemetry.record(TelemetryEvent::LateDeviceReleased);
            stream.release();
        }
    }

    fn on_device_failed(&mut self, epoch: Epoch, error: DeviceError, effects: &mut Vec<SideEffect>) {
        if !self.epochs.is_sampling_current(epoch) {
            debug!("Ignoring device failure from stale epoch {:?}: {}", epoch, error);
            return;
        }

        self.epochs.revoke_sampling();
        self.sampling = SamplingStatus::Degraded;
        effects.push(SideEffect::StopSampling);
        if let Some(edge) = self.monitor.reset() {
            self.emit_struggle(edge, effects);
        }

        let warn_now = !self.device_warned;
        self.telemetry.record(TelemetryEvent::DeviceDegraded { warned: warn_now });
        if warn_now {
            self.device_warned = true;
            warn!("Struggle detection unavailable: {}", error);
            effects.push(SideEffect::Emit(Signal::DeviceWarning(error)));
        } else {
            debug!("Device failure already reported this session: {}", error);
        }
    }

    // === Helpers ===

    /// Completion is signalled once per loaded exercise.
    fn finish(&mut self, driver: CompletionDriver, request: PhaseRequest, effects: &mut Vec<SideEffect>) {
        if self.completion_signaled {
            return;
        }
        let Some(id) = self.exercise.as_ref().map(|spec| spec.id.clone()) else {
            return;
        };

        self.completion_signaled = true;
        self.transition(request);
        self.halt_leaves(effects);

        info!("Exercise '{}' completed ({:?})", id, driver);
        self.telemetry.record(TelemetryEvent::ExerciseCompleted {
            exercise: id.clone(),
            driver,
        });
        effects.push(SideEffect::Emit(Signal::ExerciseCompleted(id)));
    }

    fn start_leaves(&mut self, fresh: bool, effects: &mut Vec<SideEffect>) {
        if self.clock.is_counting() {
            let epoch = self.epochs.renew_clock();
            effects.push(SideEffect::StartClock { epoch, fresh });
        }
        self.start_sampling(effects);
    }

    fn start_sampling(&mut self, effects: &mut Vec<SideEffect>) {
        if self.sampling == SamplingStatus::Degraded {
            debug!("Struggle detection degraded; waiting for an explicit retry");
            return;
        }
        let epoch = self.epochs.renew_sampling();
        self.sampling = SamplingStatus::Acquiring;
        effects.push(SideEffect::AcquireDevice { epoch });
    }

    /// Stops whichever periodic tasks are live and clears the struggle latch.
    fn halt_leaves(&mut self, effects: &mut Vec<SideEffect>) {
        if self.epochs.clock().is_some() {
            self.epochs.revoke_clock();
            effects.push(SideEffect::StopClock);
        }
        if self.epochs.sampling().is_some() {
            self.epochs.revoke_sampling();
            effects.push(SideEffect::StopSampling);
        }
        if matches!(self.sampling, SamplingStatus::Acquiring | SamplingStatus::Live) {
            self.sampling = SamplingStatus::Off;
        }
        // Resolve before the stop takes effect so edges keep alternating.
        if let Some(edge) = self.monitor.reset() {
            self.emit_struggle(edge, effects);
        }
    }

    fn emit_struggle(&mut self, edge: StruggleEdge, effects: &mut Vec<SideEffect>) {
        info!("Struggle {:?}", edge);
        self.telemetry.record(TelemetryEvent::StruggleEdge(edge));
        effects.push(SideEffect::Emit(Signal::Struggle(edge)));
    }

    fn transition(&mut self, request: PhaseRequest) -> bool {
        match PhaseGraph::transition(self.phase, request) {
            Some(next) => {
                if next != self.phase {
                    self.telemetry.record(TelemetryEvent::PhaseTransition {
                        from: self.phase,
                        to: next,
                    });
                    self.phase = next;
                }
                true
            }
            None => false,
        }
    }

    fn publish(&mut self, effects: &mut Vec<SideEffect>) {
        let snapshot = self.snapshot();
        if self.last_published.as_ref() != Some(&snapshot) {
            self.last_published = Some(snapshot.clone());
            effects.push(SideEffect::Emit(Signal::State(snapshot)));
        }
    }

    // === Read-only accessors ===

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            exercise: self.exercise.as_ref().map(|spec| spec.id.clone()),
            phase: self.phase,
            remaining_seconds: self.clock.remaining(),
            current_set: self.sets.current(),
            target_sets: self.sets.target(),
            is_paused: self.phase == Phase::Paused,
            struggle_active: self.monitor.is_flagged() && self.sampling == SamplingStatus::Live,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn sampling_status(&self) -> SamplingStatus {
        self.sampling
    }

    pub fn exercise(&self) -> Option<&ExerciseSpec> {
        self.exercise.as_ref()
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(StruggleConfig::default())
    }
}
