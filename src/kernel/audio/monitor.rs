use serde::{Deserialize, Serialize};

/// Edge notifications from the struggle latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StruggleEdge {
    Detected,
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StruggleConfig {
    /// Mean amplitude (0-255 analyser scale) above which struggle is flagged.
    pub threshold: f32,
    /// Amplitude below which a flagged struggle clears. `None` reuses
    /// `threshold` (single-threshold policy).
    pub release_threshold: Option<f32>,
}

impl Default for StruggleConfig {
    fn default() -> Self {
        Self {
            threshold: 150.0,
            release_threshold: None,
        }
    }
}

/// Two-state latch turning a noisy amplitude stream into alternating edges.
///
/// One comparison per sample, no history. Only the owner decides whether a
/// sample is observed at all (e.g. never while paused).
#[derive(Debug, Clone)]
pub struct StruggleMonitor {
    config: StruggleConfig,
    flagged: bool,
}

impl StruggleMonitor {
    pub fn new(config: StruggleConfig) -> Self {
        Self {
            config,
            flagged: false,
        }
    }

    /// Returns an edge only when the flag actually flips.
    pub fn observe(&mut self, amplitude: f32) -> Option<StruggleEdge> {
        if !self.flagged && amplitude > self.config.threshold {
            self.flagged = true;
            return Some(StruggleEdge::Detected);
        }

        let release = self.config.release_threshold.unwrap_or(self.config.threshold);
        if self.flagged && amplitude < release {
            self.flagged = false;
            return Some(StruggleEdge::Resolved);
        }

        None
    }

    /// Clears the latch. Returns `Resolved` if it was flagged so the caller can
    /// keep the edge stream alternating.
    pub fn reset(&mut self) -> Option<StruggleEdge> {
        if std::mem::take(&mut self.flagged) {
            Some(StruggleEdge::Resolved)
        } else {
            None
        }
    }

    pub fn is_flagged(&self) -> bool {
        self.flagged
    }
}

impl Default for StruggleMonitor {
    fn default() -> Self {
        Self::new(StruggleConfig::default())
    }
}
