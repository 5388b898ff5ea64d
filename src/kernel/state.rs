use serde::{Deserialize, Serialize};

use super::exercise::ExerciseId;
use super::lifecycle::Phase;

/// Read-only view handed to the presentation layer on every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub exercise: Option<ExerciseId>,
    pub phase: Phase,
    /// `None` for rep-based exercises.
    pub remaining_seconds: Option<u32>,
    pub current_set: u32,
    pub target_sets: u32,
    pub is_paused: bool,
    pub struggle_active: bool,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            exercise: None,
            phase: Phase::Idle,
            remaining_seconds: None,
            current_set: 1,
            target_sets: 1,
            is_paused: false,
            struggle_active: false,
        }
    }
}

/// Where the struggle monitor stands with its device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SamplingStatus {
    #[default]
    Off,
    /// Waiting on permission/hardware.
    Acquiring,
    /// Frames flowing.
    Live,
    /// Refused or lost. Stays here until an explicit retry.
    Degraded,
}
