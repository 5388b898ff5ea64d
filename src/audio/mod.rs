pub mod capture;
pub mod processing;
pub mod replay;
pub mod source;

pub use capture::MicrophoneSource;
pub use replay::WavReplaySource;
pub use source::{AudioSource, AudioStream, NoAudio, StreamGuard};
