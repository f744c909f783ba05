//! WAV audio loading for transcription input.
//!
//! Decodes a WAV file into the format Whisper expects: f32 PCM in
//! [-1.0, 1.0] at 16kHz mono. Stereo input is downmixed, other sample
//! rates are resampled.

use crate::defaults::SAMPLE_RATE;
use crate::error::{Result, TalgreinirError};
use std::io::Read;
use std::path::Path;

/// Decoded audio ready for inference.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    samples: Vec<f32>,
}

impl AudioBuffer {
    /// Load a WAV file from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TalgreinirError::AudioFileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }
        let data = std::fs::read(path)?;
        Self::from_reader(Box::new(std::io::Cursor::new(data)))
    }

    /// Create from any reader (for testing/flexibility).
    pub fn from_reader(reader: Box<dyn Read + Send>) -> Result<Self> {
        let mut wav_reader =
            hound::WavReader::new(reader).map_err(|e| TalgreinirError::AudioRead {
                message: format!("Failed to parse WAV file: {}", e),
            })?;

        let spec = wav_reader.spec();
        let source_rate = spec.sample_rate;
        let source_channels = spec.channels;

        let raw_samples: Vec<i16> = wav_reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| TalgreinirError::AudioRead {
                message: format!("Failed to read WAV samples: {}", e),
            })?;

        // Convert to mono if stereo
        let mono_samples = if source_channels == 2 {
            raw_samples
                .chunks_exact(2)
                .map(|chunk| {
                    let left = chunk[0] as i32;
                    let right = chunk[1] as i32;
                    ((left + right) / 2) as i16
                })
                .collect()
        } else {
            raw_samples
        };

        // Resample to 16kHz if needed
        let resampled = if source_rate != SAMPLE_RATE {
            resample(&mono_samples, source_rate, SAMPLE_RATE)
        } else {
            mono_samples
        };

        Ok(Self {
            samples: convert_audio(&resampled),
        })
    }

    /// Samples as normalized f32 PCM at 16kHz mono.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Audio duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / f64::from(SAMPLE_RATE)
    }

    /// Whether any RMS window of `window_ms` exceeds `threshold`.
    pub fn has_speech(&self, threshold: f32, window_ms: u32) -> bool {
        has_speech_window(&self.samples, threshold, window_ms)
    }
}

/// Whether any RMS window of `window_ms` in `samples` exceeds `threshold`.
///
/// The VAD gate in the engine uses this to skip inference entirely on
/// silent input.
pub fn has_speech_window(samples: &[f32], threshold: f32, window_ms: u32) -> bool {
    let window = (SAMPLE_RATE as usize * window_ms as usize / 1000).max(1);
    samples.chunks(window).any(|chunk| rms(chunk) > threshold)
}

/// Root mean square energy of a sample window.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Convert i16 audio samples to f32 normalized to [-1.0, 1.0].
///
/// Whisper expects audio in f32 format normalized to the range [-1.0, 1.0].
/// Input is 16-bit PCM audio where samples range from -32768 to 32767.
fn convert_audio(samples: &[i16]) -> Vec<f32> {
    samples
        .iter()
        .map(|&sample| sample as f32 / 32768.0)
        .collect()
}

/// Simple linear interpolation resampling.
fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[source_idx]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}
