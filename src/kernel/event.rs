use super::cancel::Epoch;
use super::exercise::ExerciseSpec;
use crate::audio::StreamGuard;
use crate::error::DeviceError;
use crate::summary::Biometrics;

/// User intents arriving from the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load(ExerciseSpec),
    TogglePause,
    Pause,
    Resume,
    CompleteSet,
    /// Jump to `next`, or back to idle when the plan has nothing left.
    Skip(Option<ExerciseSpec>),
    /// Explicit retry after the microphone was refused or lost.
    RetrySampling,
    End(Biometrics),
}

/// Everything the controller consumes, from one queue.
#[derive(Debug)]
pub enum Event {
    Command(Command),
    /// One elapsed clock period.
    ClockTick { epoch: Epoch },
    /// Mean amplitude of one analysed frame.
    Amplitude { epoch: Epoch, level: f32 },
    /// Acquisition finished. The guard releases the stream if dropped.
    DeviceReady { epoch: Epoch, stream: StreamGuard },
    DeviceFailed { epoch: Epoch, error: DeviceError },
}

impl From<Command> for Event {
    fn from(command: Command) -> Self {
        Event::Command(command)
    }
}
