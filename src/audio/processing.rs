/// Byte-level analyser range that thresholds are expressed in.
pub const AMPLITUDE_SCALE: f32 = 255.0;

/// Mean absolute amplitude of one frame, scaled to 0-255.
/// Samples are expected in [-1.0, 1.0]; anything outside is clamped.
pub fn mean_amplitude(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    let sum: f32 = frame.iter().map(|&x| x.abs().min(1.0)).sum();
    sum / frame.len() as f32 * AMPLITUDE_SCALE
}

/// Convert signed 16-bit PCM to f32.
pub fn i16_to_f32(sample: i16) -> f32 {
    sample as f32 / i16::MAX as f32
}

/// Convert unsigned 16-bit PCM (midpoint at 32768) to f32.
pub fn u16_to_f32(sample: u16) -> f32 {
    (sample as f32 - 32768.0) / 32768.0
}
