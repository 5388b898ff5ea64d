use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::kernel::exercise::{Equipment, ExerciseSpec};
use crate::kernel::lifecycle::Phase;
use crate::kernel::scheduler::Signal;

/// Exercise plan supplier: hands out the ordered sequence of exercises and
/// advances when told the current one is done.
pub trait ExerciseSupplier: Send {
    fn current(&self) -> Option<&ExerciseSpec>;

    /// Moves past the current exercise and returns the next one, if any.
    fn advance(&mut self) -> Option<&ExerciseSpec>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    #[serde(default)]
    pub name: String,
    pub exercises: Vec<ExerciseSpec>,
    #[serde(skip)]
    cursor: usize,
}

impl WorkoutPlan {
    pub fn new(name: impl Into<String>, exercises: Vec<ExerciseSpec>) -> Self {
        Self {
            name: name.into(),
            exercises,
            cursor: 0,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading plan {}", path.display()))?;
        let plan: WorkoutPlan =
            serde_json::from_str(&raw).with_context(|| format!("parsing plan {}", path.display()))?;
        if plan.exercises.is_empty() {
            bail!("plan {} has no exercises", path.display());
        }
        Ok(plan)
    }

    /// Small mixed plan for trying the runner without a file.
    pub fn sample() -> Self {
        let mut goblet = ExerciseSpec::reps("goblet-squat", 3).with_name("Goblet squat");
        goblet.rest_secs = 60;
        goblet.weight = Some(16.0);
        goblet.equipment = Equipment::Kettlebell;

        Self::new(
            "Sample circuit",
            vec![
                ExerciseSpec::timed("plank", 30).with_name("Plank"),
                goblet,
                ExerciseSpec::timed("wall-sit", 45).with_name("Wall sit"),
            ],
        )
    }
}

impl ExerciseSupplier for WorkoutPlan {
    fn current(&self) -> Option<&ExerciseSpec> {
        self.exercises.get(self.cursor)
    }

    fn advance(&mut self) -> Option<&ExerciseSpec> {
        if self.cursor < self.exercises.len() {
            self.cursor += 1;
        }
        self.exercises.get(self.cursor)
    }
}

/// Command the runner should forward after a plan decision.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanStep {
    Load(ExerciseSpec),
    Skip(Option<ExerciseSpec>),
    Finished,
}

/// Single owner of the plan cursor while a session runs.
///
/// Completions and manual skips both move the cursor, so both go through
/// here, in signal order. A skip is only taken while the session is on an
/// active exercise; a completion that the session reports for an exercise
/// the cursor already left means the skip was dropped, and the cursor's
/// exercise is loaded instead of advancing again.
#[derive(Debug)]
pub struct PlanFollower<S> {
    supplier: S,
    phase: Phase,
}

impl<S: ExerciseSupplier> PlanFollower<S> {
    pub fn new(supplier: S) -> Self {
        Self {
            supplier,
            phase: Phase::Idle,
        }
    }

    pub fn current(&self) -> Option<&ExerciseSpec> {
        self.supplier.current()
    }

    pub fn observe(&mut self, signal: &Signal) -> Option<PlanStep> {
        match signal {
            Signal::State(state) => {
                self.phase = state.phase;
                None
            }
            Signal::ExerciseCompleted(id) => {
                self.phase = Phase::Completed;
                let on_cursor = self.supplier.current().is_some_and(|spec| &spec.id == id);
                let next = if on_cursor {
                    self.supplier.advance()
                } else {
                    self.supplier.current()
                };
                Some(next.cloned().map_or(PlanStep::Finished, PlanStep::Load))
            }
            _ => None,
        }
    }

    pub fn skip(&mut self) -> Option<PlanStep> {
        if !matches!(self.phase, Phase::Running | Phase::Paused) {
            return None;
        }
        Some(PlanStep::Skip(self.supplier.advance().cloned()))
    }
}
