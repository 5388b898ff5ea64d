use serde::{Deserialize, Serialize};

/// Lifecycle of the exercise currently held by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Nothing loaded (or skipped past the end of the plan).
    #[default]
    Idle,
    /// Clock ticking (if timed) and struggle monitor sampling.
    Running,
    /// Ticking and sampling suspended. Set recording still allowed.
    Paused,
    /// Exercise finished, or session ended. Only a new load leaves it.
    Completed,
}

/// Requests for a phase transition. The graph validates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseRequest {
    Load,
    Pause,
    Resume,
    ClockExpired,
    SetsComplete,
    Skip,
    SkipToEnd,
    End,
}

pub struct PhaseGraph;

impl PhaseGraph {
    /// Pure function: (current phase, request) -> new phase.
    /// `None` means the request is ignored in this phase.
    pub fn transition(current: Phase, request: PhaseRequest) -> Option<Phase> {
        use Phase::*;
        use PhaseRequest::*;

        match (current, request) {
            // Loading always (re)starts, whatever came before.
            (_, Load) => Some(Running),

            (Running, Pause) => Some(Paused),
            (Paused, Resume) => Some(Running),

            (Running, ClockExpired) => Some(Completed),
            (Running | Paused, SetsComplete) => Some(Completed),

            (Running | Paused, Skip) => Some(Running),
            (Running | Paused, SkipToEnd) => Some(Idle),

            // Safe from anywhere, including before the first load.
            (_, End) => Some(Completed),

            _ => None,
        }
    }
}
