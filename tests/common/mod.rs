#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use stride::audio::{AudioSource, AudioStream};
use stride::error::{DeviceError, SamplingError};
use stride::kernel::scheduler::{SideEffect, Signal};
use stride::kernel::state::SessionSnapshot;
use stride::summary::{SummaryRecorder, WorkoutSummary};

#[derive(Debug, Default)]
pub struct Counters {
    pub acquired: AtomicUsize,
    pub released: AtomicUsize,
}

impl Counters {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

/// Audio source that plays back a fixed list of frame amplitudes (0-255
/// scale), or refuses every acquisition.
pub struct ScriptedSource {
    levels: Vec<f32>,
    refuse: Option<DeviceError>,
    pub counters: Arc<Counters>,
}

impl ScriptedSource {
    pub fn levels(levels: &[f32]) -> Self {
        Self {
            levels: levels.to_vec(),
            refuse: None,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn silent() -> Self {
        Self::levels(&[])
    }

    pub fn refusing() -> Self {
        Self {
            levels: Vec::new(),
            refuse: Some(DeviceError::Unavailable("permission denied".into())),
            counters: Arc::new(Counters::default()),
        }
    }
}

impl AudioSource for ScriptedSource {
    fn acquire(&self) -> Result<Box<dyn AudioStream>, DeviceError> {
        if let Some(error) = &self.refuse {
            return Err(error.clone());
        }
        self.counters.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedStream {
            levels: self.levels.iter().copied().collect(),
            counters: Arc::clone(&self.counters),
        }))
    }
}

struct ScriptedStream {
    levels: VecDeque<f32>,
    counters: Arc<Counters>,
}

impl AudioStream for ScriptedStream {
    fn read_frame(&mut self, frame: &mut Vec<f32>) -> Result<bool, SamplingError> {
        match self.levels.pop_front() {
            Some(level) => {
                frame.clear();
                frame.resize(64, level / 255.0);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl Drop for ScriptedStream {
    fn drop(&mut self) {
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Keeps every recorded summary for inspection.
#[derive(Clone, Default)]
pub struct MemoryRecorder {
    pub summaries: Arc<Mutex<Vec<WorkoutSummary>>>,
}

impl SummaryRecorder for MemoryRecorder {
    fn record(&mut self, summary: &WorkoutSummary) -> anyhow::Result<()> {
        self.summaries.lock().unwrap().push(summary.clone());
        Ok(())
    }
}

pub fn signals(effects: &[SideEffect]) -> Vec<Signal> {
    effects.iter().filter_map(|e| e.signal().cloned()).collect()
}

pub fn last_state(effects: &[SideEffect]) -> Option<SessionSnapshot> {
    signals(effects).into_iter().rev().find_map(|s| match s {
        Signal::State(state) => Some(state),
        _ => None,
    })
}
