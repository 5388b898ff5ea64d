use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{self, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::cadence::Cadence;
use super::handle::SessionHandle;
use crate::audio::processing::mean_amplitude;
use crate::audio::{AudioSource, StreamGuard};
use crate::config::SessionConfig;
use crate::error::{DeviceError, SamplingError};
use crate::kernel::cancel::Epoch;
use crate::kernel::controller::SessionController;
use crate::kernel::event::{Command, Event};
use crate::kernel::scheduler::{SideEffect, Signal};
use crate::summary::{Biometrics, SummaryRecorder, WorkoutSummary};

/// Async driver around the pure controller.
///
/// One queue, one consumer: commands from `SessionHandle`s, clock ticks,
/// amplitude readings and device results all arrive on `receiver` and are
/// applied in order. Periodic work runs in tokio tasks that only ever send
/// events; they hold a weak sender so the session winds down once every
/// handle is dropped.
pub struct SessionRuntime {
    controller: SessionController,
    receiver: mpsc::Receiver<Event>,
    events: mpsc::WeakSender<Event>,
    signals: mpsc::Sender<Signal>,
    source: Arc<dyn AudioSource>,
    recorder: Box<dyn SummaryRecorder>,
    config: SessionConfig,
    session_id: Uuid,
    cadence: Cadence,
    // Dropping a guard cancels its task.
    clock_task: Option<DropGuard>,
    sampler_task: Option<DropGuard>,
    started_at: Option<Instant>,
}

impl SessionRuntime {
    pub fn new(
        config: SessionConfig,
        source: Arc<dyn AudioSource>,
        recorder: Box<dyn SummaryRecorder>,
    ) -> (Self, SessionHandle, mpsc::Receiver<Signal>) {
        let (tx, receiver) = mpsc::channel(config.event_capacity.max(1));
        let (signals, signal_rx) = mpsc::channel(config.signal_capacity.max(1));

        let runtime = Self {
            controller: SessionController::new(config.struggle),
            receiver,
            events: tx.downgrade(),
            signals,
            source,
            recorder,
            cadence: Cadence::new(config.clock_period()),
            config,
            session_id: Uuid::new_v4(),
            clock_task: None,
            sampler_task: None,
            started_at: None,
        };

        (runtime, SessionHandle::new(tx), signal_rx)
    }

    /// Runs the session on its own task.
    pub fn spawn(
        config: SessionConfig,
        source: Arc<dyn AudioSource>,
        recorder: Box<dyn SummaryRecorder>,
    ) -> (SessionHandle, mpsc::Receiver<Signal>, JoinHandle<Option<WorkoutSummary>>) {
        let (runtime, handle, signals) = Self::new(config, source, recorder);
        let join = tokio::spawn(runtime.run());
        (handle, signals, join)
    }

    /// Drives the session until it ends or every handle is dropped. Returns
    /// the recorded summary if the session was ended explicitly.
    pub async fn run(mut self) -> Option<WorkoutSummary> {
        info!("Session {} started", self.session_id);
        let mut summary = None;

        while let Some(event) = self.receiver.recv().await {
            if self.started_at.is_none() && matches!(event, Event::Command(Command::Load(_))) {
                self.started_at = Some(Instant::now());
            }

            let effects = self.controller.handle(event);
            for effect in effects {
                if let Some(recorded) = self.execute(effect).await {
                    summary = Some(recorded);
                }
            }

            if self.controller.is_ended() {
                break;
            }
        }

        self.shutdown();
        summary
    }

    async fn execute(&mut self, effect: SideEffect) -> Option<WorkoutSummary> {
        match effect {
            SideEffect::StartClock { epoch, fresh } => {
                let first_delay = self.cadence.start(Instant::now(), fresh);
                self.spawn_clock(epoch, first_delay);
            }
            SideEffect::StopClock => {
                if self.clock_task.take().is_some() {
                    self.cadence.stop(Instant::now());
                }
            }
            SideEffect::AcquireDevice { epoch } => self.spawn_acquisition(epoch),
            SideEffect::StartSampler { epoch, stream } => self.spawn_sampler(epoch, stream),
            SideEffect::StopSampling => {
                self.sampler_task = None;
            }
            SideEffect::RecordSummary(biometrics) => return Some(self.record_summary(biometrics)),
            SideEffect::Emit(signal) => {
                if self.signals.send(signal).await.is_err() {
                    debug!("Signal receiver dropped");
                }
            }
        }
        None
    }

    fn spawn_clock(&mut self, epoch: Epoch, first_delay: Duration) {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let events = self.events.clone();
        let period = self.config.clock_period();

        tokio::spawn(async move {
            let mut ticks = time::interval_at(Instant::now() + first_delay, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticks.tick() => {
                        if !deliver(&events, Event::ClockTick { epoch }).await {
                            break;
                        }
                    }
                }
            }
        });

        // Replacing an old guard cancels the previous ticker.
        self.clock_task = Some(token.drop_guard());
    }

    /// Permission and hardware may take a while; the answer comes back as an
    /// event. If nobody is listening by then, the event is dropped and the
    /// stream inside it released.
    fn spawn_acquisition(&self, epoch: Epoch) {
        let source = Arc::clone(&self.source);
        let events = self.events.clone();

        tokio::spawn(async move {
            let event = match task::spawn_blocking(move || StreamGuard::acquire(source)).await {
                Ok(Ok(stream)) => Event::DeviceReady { epoch, stream },
                Ok(Err(error)) => Event::DeviceFailed { epoch, error },
                Err(e) => Event::DeviceFailed {
                    epoch,
                    error: DeviceError::Unavailable(format!("acquisition task failed: {}", e)),
                },
            };
            deliver(&events, event).await;
        });
    }

    fn spawn_sampler(&mut self, epoch: Epoch, mut stream: StreamGuard) {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let events = self.events.clone();
        let frame_interval = self.config.frame_interval();

        tokio::spawn(async move {
            let mut frames = time::interval(frame_interval);
            frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut frame = Vec::new();

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = frames.tick() => {
                        match stream.read_frame(&mut frame) {
                            Ok(true) => {
                                let level = mean_amplitude(&frame);
                                if !deliver(&events, Event::Amplitude { epoch, level }).await {
                                    break;
                                }
                            }
                            Ok(false) => {}
                            Err(SamplingError::Transient(reason)) => {
                                debug!("Skipping audio frame: {}", reason);
                            }
                            Err(SamplingError::Disconnected(reason)) => {
                                let error = DeviceError::Lost(reason);
                                deliver(&events, Event::DeviceFailed { epoch, error }).await;
                                break;
                            }
                        }
                    }
                }
            }

            stream.release();
            debug!("Sampler {:?} stopped", epoch);
        });

        self.sampler_task = Some(token.drop_guard());
    }

    fn record_summary(&mut self, biometrics: Biometrics) -> WorkoutSummary {
        let telemetry = self.controller.telemetry.snapshot();
        let summary = WorkoutSummary {
            session_id: self.session_id,
            elapsed: self
                .started_at
                .map(|start| Instant::now().saturating_duration_since(start))
                .unwrap_or_default(),
            exercises_completed: telemetry.exercises_completed,
            struggle_episodes: telemetry.struggle_stats.episodes,
            biometrics,
        };

        if let Err(e) = self.recorder.record(&summary) {
            warn!("Failed to record workout summary: {:#}", e);
        }
        summary
    }

    fn shutdown(&mut self) {
        self.clock_task = None;
        self.sampler_task = None;
        info!("Session {} stopped", self.session_id);
    }
}

/// Sends through a weak sender. False once the session is gone.
async fn deliver(events: &mpsc::WeakSender<Event>, event: Event) -> bool {
    match events.upgrade() {
        Some(tx) => tx.send(event).await.is_ok(),
        None => false,
    }
}
