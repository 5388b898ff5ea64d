#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetAdvance {
    pub index: u32,
    pub at_cap: bool,
}

/// Bounded 1-based set counter for rep-based exercises.
#[derive(Debug, Clone)]
pub struct SetTracker {
    current: u32,
    target: u32,
}

impl SetTracker {
    pub fn new(target: u32) -> Self {
        Self {
            current: 1,
            target: target.max(1),
        }
    }

    /// At the target this is a no-op that still reports `at_cap`.
    pub fn advance(&mut self) -> SetAdvance {
        if self.current < self.target {
            self.current += 1;
        }
        SetAdvance {
            index: self.current,
            at_cap: self.current == self.target,
        }
    }

    pub fn reset(&mut self, target: u32) {
        *self = Self::new(target);
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn at_cap(&self) -> bool {
        self.current == self.target
    }
}

impl Default for SetTracker {
    fn default() -> Self {
        Self::new(1)
    }
}
