use serde::{Deserialize, Serialize};

/// Stamp carried by every periodic callback. A callback whose epoch is no
/// longer current was scheduled before a pause, load, skip or end and must
/// be dropped without touching state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Epoch(pub u64);

/// Tracks the live epoch of each periodic subsystem.
///
/// Actual task handles live in the session driver, not here; the kernel only
/// decides which callbacks are still wanted.
#[derive(Debug, Default)]
pub struct EpochRegistry {
    counter: u64,
    clock: Option<Epoch>,
    sampling: Option<Epoch>,
}

impl EpochRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue(&mut self) -> Epoch {
        self.counter += 1;
        Epoch(self.counter)
    }

    pub fn renew_clock(&mut self) -> Epoch {
        let epoch = self.issue();
        self.clock = Some(epoch);
        epoch
    }

    pub fn renew_sampling(&mut self) -> Epoch {
        let epoch = self.issue();
        self.sampling = Some(epoch);
        epoch
    }

    pub fn revoke_clock(&mut self) {
        self.clock = None;
    }

    pub fn revoke_sampling(&mut self) {
        self.sampling = None;
    }

    pub fn is_clock_current(&self, epoch: Epoch) -> bool {
        self.clock == Some(epoch)
    }

    pub fn is_sampling_current(&self, epoch: Epoch) -> bool {
        self.sampling == Some(epoch)
    }

    pub fn clock(&self) -> Option<Epoch> {
        self.clock
    }

    pub fn sampling(&self) -> Option<Epoch> {
        self.sampling
    }
}
