use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::kernel::audio::monitor::StruggleConfig;
use crate::kernel::time::{CLOCK_PERIOD_MS, FRAME_INTERVAL_MS};

/// Runtime knobs. Every field has a default, so a partial JSON file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub clock_period_ms: u64,
    pub frame_interval_ms: u64,
    /// Samples per analysed frame.
    pub frame_len: usize,
    pub struggle: StruggleConfig,
    pub event_capacity: usize,
    pub signal_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            clock_period_ms: CLOCK_PERIOD_MS,
            frame_interval_ms: FRAME_INTERVAL_MS,
            frame_len: 1024,
            struggle: StruggleConfig::default(),
            event_capacity: 256,
            signal_capacity: 64,
        }
    }
}

impl SessionConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    // Zero periods would make tokio intervals panic.
    pub fn clock_period(&self) -> Duration {
        Duration::from_millis(self.clock_period_ms.max(1))
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}
