use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapRb};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;
use tracing::{error, info};

use super::processing::{i16_to_f32, u16_to_f32};
use super::source::{AudioSource, AudioStream};
use crate::error::{DeviceError, SamplingError};

/// Default input device through cpal.
///
/// cpal streams are not `Send`, so each acquisition parks the stream on its
/// own thread and hands back a ring buffer consumer. Releasing the stream
/// signals that thread, which drops the cpal stream and exits.
#[derive(Debug, Clone)]
pub struct MicrophoneSource {
    frame_len: usize,
    buffer_len: usize,
}

impl MicrophoneSource {
    pub fn new(frame_len: usize) -> Self {
        let frame_len = frame_len.max(1);
        Self {
            frame_len,
            // Room for a few frames of jitter between callback and reader.
            buffer_len: (frame_len * 8).max(8192),
        }
    }
}

impl AudioSource for MicrophoneSource {
    fn acquire(&self) -> Result<Box<dyn AudioStream>, DeviceError> {
        let rb = HeapRb::<f32>::new(self.buffer_len);
        let (producer, consumer) = rb.split();
        let lost = Arc::new(AtomicBool::new(false));

        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<u32, DeviceError>>(1);
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let stream_lost = Arc::clone(&lost);

        let worker = std::thread::Builder::new()
            .name("stride-mic".into())
            .spawn(move || match open_stream(producer, stream_lost) {
                Ok((stream, rate)) => {
                    let _ = ready_tx.send(Ok(rate));
                    // Returns on explicit stop or when the sender is dropped.
                    let _ = stop_rx.recv();
                    drop(stream);
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })
            .map_err(|e| DeviceError::Unavailable(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(rate)) => {
                info!("Microphone stream live at {}Hz", rate);
                Ok(Box::new(MicrophoneStream {
                    consumer,
                    lost,
                    frame_len: self.frame_len,
                    stop: Some(stop_tx),
                    worker: Some(worker),
                }))
            }
            Ok(Err(e)) => {
                let _ = worker.join();
                Err(e)
            }
            Err(_) => Err(DeviceError::Unavailable("capture thread exited early".into())),
        }
    }
}

fn open_stream<P>(mut producer: P, lost: Arc<AtomicBool>) -> Result<(cpal::Stream, u32), DeviceError>
where
    P: Producer<Item = f32> + Send + 'static,
{
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| DeviceError::Unavailable("no input device available".into()))?;

    info!("Audio Input Device: {}", device.name().unwrap_or_default());

    let config = device
        .default_input_config()
        .map_err(|e| DeviceError::Unavailable(e.to_string()))?;
    let rate = config.sample_rate().0;

    let err_fn = move |err: cpal::StreamError| {
        error!("audio input stream error: {}", err);
        lost.store(true, Ordering::Release);
    };

    let built = match config.sample_format() {
        cpal::SampleFormat::F32 => device.build_input_stream(
            &config.into(),
            move |data: &[f32], _: &_| {
                // Lossy when full; the reader only wants the latest frame.
                producer.push_slice(data);
            },
            err_fn,
            None,
        ),
        cpal::SampleFormat::I16 => device.build_input_stream(
            &config.into(),
            move |data: &[i16], _: &_| {
                for &sample in data {
                    let _ = producer.try_push(i16_to_f32(sample));
                }
            },
            err_fn,
            None,
        ),
        cpal::SampleFormat::U16 => device.build_input_stream(
            &config.into(),
            move |data: &[u16], _: &_| {
                for &sample in data {
                    let _ = producer.try_push(u16_to_f32(sample));
                }
            },
            err_fn,
            None,
        ),
        other => {
            return Err(DeviceError::Unavailable(format!(
                "unsupported sample format {:?}",
                other
            )))
        }
    };

    let stream = built.map_err(|e| DeviceError::Unavailable(e.to_string()))?;
    stream
        .play()
        .map_err(|e| DeviceError::Unavailable(e.to_string()))?;

    Ok((stream, rate))
}

struct MicrophoneStream {
    consumer: HeapCons<f32>,
    lost: Arc<AtomicBool>,
    frame_len: usize,
    stop: Option<mpsc::Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl AudioStream for MicrophoneStream {
    fn read_frame(&mut self, frame: &mut Vec<f32>) -> Result<bool, SamplingError> {
        if self.lost.load(Ordering::Acquire) {
            return Err(SamplingError::Disconnected("input stream reported an error".into()));
        }

        let available = self.consumer.occupied_len();
        if available == 0 {
            return Ok(false);
        }

        // Keep only the most recent frame.
        if available > self.frame_len {
            self.consumer.skip(available - self.frame_len);
        }
        frame.clear();
        frame.resize(available.min(self.frame_len), 0.0);
        let read = self.consumer.pop_slice(frame);
        frame.truncate(read);
        Ok(read > 0)
    }
}

impl Drop for MicrophoneStream {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
