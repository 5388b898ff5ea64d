use std::fmt;
use std::sync::Arc;

use crate::error::{DeviceError, SamplingError};

/// Device permission layer: the struggle monitor's only boundary dependency.
pub trait AudioSource: Send + Sync + 'static {
    /// Blocks until permission and hardware answer.
    fn acquire(&self) -> Result<Box<dyn AudioStream>, DeviceError>;

    /// Default releases by dropping; sources with explicit teardown override.
    fn release(&self, stream: Box<dyn AudioStream>) {
        drop(stream);
    }
}

/// A live input stream plus whatever analysis buffer sits behind it.
pub trait AudioStream: Send {
    /// Fills `frame` with the latest samples. `Ok(false)` means no new data
    /// since the last read.
    fn read_frame(&mut self, frame: &mut Vec<f32>) -> Result<bool, SamplingError>;
}

/// Scoped ownership of one acquired stream. Dropping the guard releases the
/// stream through its source on every exit path.
pub struct StreamGuard {
    source: Arc<dyn AudioSource>,
    stream: Option<Box<dyn AudioStream>>,
}

impl StreamGuard {
    pub fn acquire(source: Arc<dyn AudioSource>) -> Result<Self, DeviceError> {
        let stream = source.acquire()?;
        Ok(Self {
            source,
            stream: Some(stream),
        })
    }

    pub fn read_frame(&mut self, frame: &mut Vec<f32>) -> Result<bool, SamplingError> {
        match self.stream.as_mut() {
            Some(stream) => stream.read_frame(frame),
            None => Err(SamplingError::Disconnected("stream already released".into())),
        }
    }

    /// Explicit release; equivalent to dropping.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(stream) = self.stream.take() {
            self.source.release(stream);
        }
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.release_inner();
    }
}

impl fmt::Debug for StreamGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamGuard")
            .field("live", &self.stream.is_some())
            .finish()
    }
}

/// Source for hosts without audio input. Always refuses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAudio;

impl AudioSource for NoAudio {
    fn acquire(&self) -> Result<Box<dyn AudioStream>, DeviceError> {
        Err(DeviceError::Unavailable("audio input disabled".into()))
    }
}
