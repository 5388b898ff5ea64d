/// One clock tick per real second.
pub const CLOCK_PERIOD_MS: u64 = 1000;

/// Sampling follows display refresh (~60 Hz).
pub const FRAME_INTERVAL_MS: u64 = 16;
