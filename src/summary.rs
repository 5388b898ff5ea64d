use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// User-entered readings forwarded verbatim. The engine neither validates
/// nor stores them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Biometrics {
    pub heart_rate_bpm: Option<u16>,
    pub calories_kcal: Option<u32>,
    pub oxygen_saturation_pct: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub session_id: Uuid,
    /// Wall-clock time from the first load to `end_session`, pauses included.
    pub elapsed: Duration,
    pub exercises_completed: u64,
    pub struggle_episodes: u64,
    pub biometrics: Biometrics,
}

/// Receives the final summary when a session ends.
pub trait SummaryRecorder: Send {
    fn record(&mut self, summary: &WorkoutSummary) -> Result<()>;
}

/// Writes the summary to the tracing log.
#[derive(Debug, Default)]
pub struct LogRecorder;

impl SummaryRecorder for LogRecorder {
    fn record(&mut self, summary: &WorkoutSummary) -> Result<()> {
        info!(
            "Workout summary: {}",
            serde_json::to_string(summary).context("serializing workout summary")?
        );
        Ok(())
    }
}

/// Appends one JSON line per session.
#[derive(Debug)]
pub struct JsonFileRecorder {
    path: PathBuf,
}

impl JsonFileRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SummaryRecorder for JsonFileRecorder {
    fn record(&mut self, summary: &WorkoutSummary) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;
        let line = serde_json::to_string(summary)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}
