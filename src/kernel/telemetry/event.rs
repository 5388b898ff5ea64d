use serde::{Deserialize, Serialize};

use crate::kernel::audio::monitor::StruggleEdge;
use crate::kernel::exercise::{CompletionDriver, ExerciseId};
use crate::kernel::lifecycle::Phase;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TelemetryEvent {
    PhaseTransition {
        from: Phase,
        to: Phase,
    },

    ExerciseCompleted {
        exercise: ExerciseId,
        driver: CompletionDriver,
    },

    StruggleEdge(StruggleEdge),

    /// Microphone refused or lost; `warned` is false when the warning was
    /// already surfaced earlier in the session.
    DeviceDegraded {
        warned: bool,
    },

    /// A tick or sample arrived after its subsystem was stopped.
    StaleCallback {
        source: CallbackSource,
    },

    /// A device handle resolved after the session had moved on.
    LateDeviceReleased,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallbackSource {
    Clock,
    Sampler,
}
