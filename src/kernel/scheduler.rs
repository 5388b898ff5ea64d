use super::audio::monitor::StruggleEdge;
use super::cancel::Epoch;
use super::exercise::ExerciseId;
use super::state::SessionSnapshot;
use crate::audio::StreamGuard;
use crate::error::DeviceError;
use crate::summary::Biometrics;

/// Outbound notifications for the presentation layer and plan supplier.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    State(SessionSnapshot),
    /// The active exercise is done. Advancing is the caller's decision.
    ExerciseCompleted(ExerciseId),
    Struggle(StruggleEdge),
    /// Non-blocking warning, surfaced once per session attempt.
    DeviceWarning(DeviceError),
    SessionEnded,
}

/// Work the controller asks the driver to perform. The controller itself
/// never awaits, spawns or touches a device.
#[derive(Debug)]
pub enum SideEffect {
    /// Start the ticker. `fresh` discards any phase carried over a pause.
    StartClock { epoch: Epoch, fresh: bool },
    /// Cancel the ticker, keeping its sub-period phase for a resume.
    StopClock,
    AcquireDevice { epoch: Epoch },
    StartSampler { epoch: Epoch, stream: StreamGuard },
    /// Cancel the sampler; its stream is released as the task unwinds.
    StopSampling,
    RecordSummary(Biometrics),
    Emit(Signal),
}

impl SideEffect {
    pub fn signal(&self) -> Option<&Signal> {
        match self {
            SideEffect::Emit(signal) => Some(signal),
            _ => None,
        }
    }
}
