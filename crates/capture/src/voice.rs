//! Microphone recorder: a two-state machine over a cpal input stream.
//!
//! `start` opens the default input device and buffers f32 samples; `stop`
//! drops the stream (which releases the microphone) and hands back the
//! buffer as 16-bit mono WAV. The stream lives in an `Option` field, so the
//! microphone is also released when the recorder itself is dropped.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use parking_lot::Mutex;
use shared::error::AssistError;
use std::sync::Arc;

/// Wrapper to make cpal::Stream Send (it is safe for our usage pattern).
struct SendStream(#[allow(dead_code)] cpal::Stream);
unsafe impl Send for SendStream {}

pub struct VoiceRecorder {
    stream: Option<SendStream>,
    buffer: Arc<Mutex<Vec<f32>>>,
    sample_rate: u32,
}

impl Default for VoiceRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl VoiceRecorder {
    pub fn new() -> Self {
        Self {
            stream: None,
            buffer: Arc::new(Mutex::new(Vec::new())),
            sample_rate: 44_100,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.stream.is_some()
    }

    /// Idle → Recording. Acquires the microphone and begins buffering.
    ///
    /// A missing input device or an unopenable stream is reported as a
    /// microphone-permission failure without entering the recording state.
    pub fn start(&mut self) -> Result<(), AssistError> {
        if self.stream.is_some() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(AssistError::PermissionDenied("Microphone"))?;
        let config = device
            .default_input_config()
            .map_err(|_| AssistError::PermissionDenied("Microphone"))?;

        self.sample_rate = config.sample_rate().0;
        self.buffer.lock().clear();
        let buffer = Arc::clone(&self.buffer);

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => device
                .build_input_stream(
                    &config.into(),
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        buffer.lock().extend_from_slice(data);
                    },
                    |err| tracing::error!("audio stream error: {}", err),
                    None,
                )
                .map_err(|e| AssistError::Audio(e.to_string()))?,
            cpal::SampleFormat::I16 => device
                .build_input_stream(
                    &config.into(),
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        let floats: Vec<f32> = data.iter().map(|&s| s as f32 / 32768.0).collect();
                        buffer.lock().extend_from_slice(&floats);
                    },
                    |err| tracing::error!("audio stream error: {}", err),
                    None,
                )
                .map_err(|e| AssistError::Audio(e.to_string()))?,
            format => {
                return Err(AssistError::Audio(format!(
                    "unsupported sample format: {:?}",
                    format
                )));
            }
        };

        stream
            .play()
            .map_err(|e| AssistError::Audio(e.to_string()))?;
        self.stream = Some(SendStream(stream));
        tracing::info!(sample_rate = self.sample_rate, "recording started");
        Ok(())
    }

    /// Recording → Idle. Releases the microphone and assembles the buffer.
    ///
    /// Returns `Ok(None)` when nothing was captured; callers show a
    /// "no audio recorded" message instead of calling the transcription API.
    pub fn stop(&mut self) -> Result<Option<Vec<u8>>, AssistError> {
        // Dropping the stream stops capture and releases the device.
        self.stream = None;

        let samples = std::mem::take(&mut *self.buffer.lock());
        if samples.is_empty() {
            tracing::debug!("recording stopped with empty buffer");
            return Ok(None);
        }
        tracing::info!(samples = samples.len(), "recording stopped");
        encode_wav(&samples, self.sample_rate).map(Some)
    }
}

/// Encode f32 samples as 16-bit mono WAV.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, AssistError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    let mut writer =
        hound::WavWriter::new(&mut cursor, spec).map_err(|e| AssistError::Audio(e.to_string()))?;

    for &sample in samples {
        let s = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
        writer
            .write_sample(s)
            .map_err(|e| AssistError::Audio(e.to_string()))?;
    }

    writer
        .finalize()
        .map_err(|e| AssistError::Audio(e.to_string()))?;
    Ok(cursor.into_inner())
}
