use std::path::{Path, PathBuf};

use super::source::{AudioSource, AudioStream};
use crate::error::{DeviceError, SamplingError};

/// Plays a WAV file back as if it were a microphone, one frame per read.
/// Useful for rehearsing threshold settings against a recorded workout.
#[derive(Debug, Clone)]
pub struct WavReplaySource {
    path: PathBuf,
    frame_len: usize,
}

impl WavReplaySource {
    pub fn new(path: impl AsRef<Path>, frame_len: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            frame_len: frame_len.max(1),
        }
    }
}

impl AudioSource for WavReplaySource {
    fn acquire(&self) -> Result<Box<dyn AudioStream>, DeviceError> {
        let samples = read_mono(&self.path)?;
        Ok(Box::new(ReplayStream {
            samples,
            cursor: 0,
            frame_len: self.frame_len,
        }))
    }
}

fn read_mono(path: &Path) -> Result<Vec<f32>, DeviceError> {
    let reader = hound::WavReader::open(path)
        .map_err(|e| DeviceError::Unavailable(format!("{}: {}", path.display(), e)))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| DeviceError::Unavailable(e.to_string()))?,
        hound::SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<Result<_, _>>()
                .map_err(|e| DeviceError::Unavailable(e.to_string()))?
        }
    };

    // Downmix by averaging channels.
    Ok(interleaved
        .chunks(channels)
        .map(|c| c.iter().sum::<f32>() / c.len() as f32)
        .collect())
}

struct ReplayStream {
    samples: Vec<f32>,
    cursor: usize,
    frame_len: usize,
}

impl AudioStream for ReplayStream {
    fn read_frame(&mut self, frame: &mut Vec<f32>) -> Result<bool, SamplingError> {
        if self.cursor >= self.samples.len() {
            return Ok(false);
        }
        let end = (self.cursor + self.frame_len).min(self.samples.len());
        frame.clear();
        frame.extend_from_slice(&self.samples[self.cursor..end]);
        self.cursor = end;
        Ok(true)
    }
}
