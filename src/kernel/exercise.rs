use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseId(pub String);

impl ExerciseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    #[default]
    Bodyweight,
    Dumbbell,
    Barbell,
    Kettlebell,
    Machine,
    Band,
    Other,
}

/// Which subsystem decides that an exercise is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionDriver {
    /// Countdown reaching zero.
    Timer,
    /// Set counter reaching its target.
    Sets,
}

/// Immutable description of the active exercise, owned by the plan supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSpec {
    pub id: ExerciseId,
    #[serde(default)]
    pub name: String,
    /// Present for timed exercises, absent for rep-based ones.
    #[serde(default)]
    pub duration_secs: Option<u32>,
    #[serde(default = "default_sets")]
    pub sets: u32,
    #[serde(default)]
    pub rest_secs: u32,
    #[serde(default)]
    pub weight: Option<f32>,
    #[serde(default)]
    pub equipment: Equipment,
}

fn default_sets() -> u32 {
    1
}

impl ExerciseSpec {
    pub fn timed(id: impl Into<String>, duration_secs: u32) -> Self {
        Self {
            id: ExerciseId::new(id),
            name: String::new(),
            duration_secs: Some(duration_secs),
            sets: 1,
            rest_secs: 0,
            weight: None,
            equipment: Equipment::Bodyweight,
        }
    }

    pub fn reps(id: impl Into<String>, sets: u32) -> Self {
        Self {
            id: ExerciseId::new(id),
            name: String::new(),
            duration_secs: None,
            sets,
            rest_secs: 0,
            weight: None,
            equipment: Equipment::Bodyweight,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// A zero duration counts as "no duration".
    pub fn driver(&self) -> CompletionDriver {
        match self.duration_secs {
            Some(secs) if secs > 0 => CompletionDriver::Timer,
            _ => CompletionDriver::Sets,
        }
    }

    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id.0
        } else {
            &self.name
        }
    }
}
