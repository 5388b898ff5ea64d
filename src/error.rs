use thiserror::Error;

/// Failures of the device permission layer. Always recoverable: the session
/// keeps running without struggle detection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("audio input unavailable: {0}")]
    Unavailable(String),

    #[error("audio input lost mid-stream: {0}")]
    Lost(String),
}

/// Failure of a single frame read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SamplingError {
    /// Skip this frame and keep sampling.
    #[error("transient sampling error: {0}")]
    Transient(String),

    /// The stream is gone; escalates to `DeviceError::Lost`.
    #[error("audio stream disconnected: {0}")]
    Disconnected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session runtime has shut down")]
    Closed,
}
