//! Whisper-based speech-to-text engine.
//!
//! This module provides a Whisper implementation of the SpeechEngine trait using whisper-rs.
//!
//! # Feature Gate
//!
//! This module requires the `whisper` feature to be enabled and cmake to be installed.
//! To build with Whisper support:
//!
//! ```bash
//! cargo build --features whisper
//! ```

use crate::audio;
use crate::defaults;
use crate::error::{Result, TalgreinirError};
use crate::stt::engine::{DecodeOptions, Segment, SpeechEngine, TranscriptionInfo, Word};
use std::path::PathBuf;

#[cfg(feature = "whisper")]
use std::sync::{Mutex, Once};
#[cfg(feature = "whisper")]
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, install_logging_hooks,
};

#[cfg(feature = "whisper")]
static LOGGING_HOOKS_INSTALLED: Once = Once::new();

/// Configuration for the Whisper engine.
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    /// Path to the Whisper model file
    pub model_path: PathBuf,
    /// Number of threads for inference (None = auto-detect)
    pub threads: Option<usize>,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(defaults::DEFAULT_MODEL),
            threads: None,
        }
    }
}

/// Whisper-based engine implementation.
///
/// Uses whisper-rs for speech-to-text inference. The WhisperContext is
/// wrapped in a Mutex to ensure thread safety.
///
/// # Feature Gate
///
/// This type is only available when the `whisper` feature is enabled.
#[cfg(feature = "whisper")]
pub struct WhisperEngine {
    context: Mutex<WhisperContext>,
    config: WhisperConfig,
    model_name: String,
}

#[cfg(feature = "whisper")]
impl std::fmt::Debug for WhisperEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperEngine")
            .field("config", &self.config)
            .field("model_name", &self.model_name)
            .field("context", &"<WhisperContext>")
            .finish()
    }
}

/// Whisper engine placeholder (without whisper feature).
///
/// This is a stub implementation that returns errors when used.
/// Enable the `whisper` feature to use real transcription.
#[cfg(not(feature = "whisper"))]
#[derive(Debug)]
pub struct WhisperEngine {
    config: WhisperConfig,
    model_name: String,
}

fn model_name_from_path(path: &PathBuf) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}

/// Build a [`Word`] from one decoded token, or reject it.
///
/// Special tokens (`[_BEG_]`, `<|is|>`), empty text, low-probability
/// hallucinations, and tokens with degenerate timestamps are dropped.
/// Timestamps come in centiseconds.
fn word_from_token(text: &str, t0: i64, t1: i64, probability: f32) -> Option<Word> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('[') || trimmed.starts_with('<') {
        return None;
    }
    if probability <= defaults::MIN_WORD_PROBABILITY {
        return None;
    }

    let start = t0 as f64 / 100.0;
    let end = t1 as f64 / 100.0;
    if end <= start {
        return None;
    }

    Some(Word {
        word: trimmed.to_string(),
        start,
        end,
        probability,
    })
}

#[cfg(feature = "whisper")]
impl WhisperEngine {
    /// Create a new Whisper engine, loading the model.
    ///
    /// # Errors
    /// Returns `TalgreinirError::ModelNotFound` if the model file doesn't exist
    /// Returns `TalgreinirError::InferenceFailed` if model loading fails
    pub fn new(config: WhisperConfig) -> Result<Self> {
        // Install logging hooks to suppress whisper.cpp output (only once)
        LOGGING_HOOKS_INSTALLED.call_once(|| {
            install_logging_hooks();
        });

        if !config.model_path.exists() {
            return Err(TalgreinirError::ModelNotFound {
                path: config.model_path.to_string_lossy().to_string(),
            });
        }

        let model_name = model_name_from_path(&config.model_path);

        let context = WhisperContext::new_with_params(
            config
                .model_path
                .to_str()
                .ok_or_else(|| TalgreinirError::InferenceFailed {
                    message: "Invalid UTF-8 in model path".to_string(),
                })?,
            WhisperContextParameters::default(),
        )
        .map_err(|e| TalgreinirError::InferenceFailed {
            message: format!("Failed to load Whisper model: {}", e),
        })?;

        Ok(Self {
            context: Mutex::new(context),
            config,
            model_name,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &WhisperConfig {
        &self.config
    }
}

#[cfg(not(feature = "whisper"))]
impl WhisperEngine {
    /// Create a new Whisper engine (stub implementation).
    pub fn new(config: WhisperConfig) -> Result<Self> {
        if !config.model_path.exists() {
            return Err(TalgreinirError::ModelNotFound {
                path: config.model_path.to_string_lossy().to_string(),
            });
        }

        let model_name = model_name_from_path(&config.model_path);

        Ok(Self { config, model_name })
    }

    /// Get the configuration
    pub fn config(&self) -> &WhisperConfig {
        &self.config
    }
}

#[cfg(feature = "whisper")]
impl SpeechEngine for WhisperEngine {
    fn transcribe(
        &self,
        samples: &[f32],
        options: &DecodeOptions,
    ) -> Result<(Vec<Segment>, TranscriptionInfo)> {
        options.validate()?;

        let duration = samples.len() as f64 / f64::from(defaults::SAMPLE_RATE);
        let forced_language = options.language != defaults::AUTO_LANGUAGE;

        // VAD gate: nothing above the speech threshold anywhere in the file
        // means there is nothing to decode.
        if options.vad_enabled
            && !audio::has_speech_window(
                samples,
                defaults::VAD_SPEECH_THRESHOLD,
                options.vad_min_silence_ms,
            )
        {
            let info = TranscriptionInfo {
                language: if forced_language {
                    options.language.clone()
                } else {
                    String::new()
                },
                language_probability: if forced_language { 1.0 } else { 0.0 },
                duration,
            };
            return Ok((Vec::new(), info));
        }

        let context = self
            .context
            .lock()
            .map_err(|e| TalgreinirError::InferenceFailed {
                message: format!("Failed to acquire context lock: {}", e),
            })?;

        // Create a new state for this transcription
        let mut state = context
            .create_state()
            .map_err(|e| TalgreinirError::InferenceFailed {
                message: format!("Failed to create Whisper state: {}", e),
            })?;

        let mut params = FullParams::new(SamplingStrategy::BeamSearch {
            beam_size: options.beam_size as i32,
            patience: -1.0,
        });

        if forced_language {
            params.set_language(Some(&options.language));
        } else {
            params.set_language(None);
        }

        if let Some(threads) = self.config.threads {
            params.set_n_threads(threads as i32);
        }

        params.set_temperature(options.temperature);
        params.set_token_timestamps(options.word_timestamps);
        params.set_no_context(!options.condition_on_previous_text);

        // Hallucination suppression at the decoder level: repetition loops,
        // low mean log probability, and silence detection.
        params.set_entropy_thold(defaults::ENTROPY_THRESHOLD);
        params.set_logprob_thold(defaults::LOG_PROB_THRESHOLD);
        params.set_no_speech_thold(defaults::NO_SPEECH_THRESHOLD);
        params.set_suppress_blank(true);

        // Disable printing to stdout/stderr
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state
            .full(params, samples)
            .map_err(|e| TalgreinirError::InferenceFailed {
                message: format!("Whisper inference failed: {}", e),
            })?;

        let mut segments = Vec::new();
        let num_segments = state.full_n_segments();
        for seg_idx in 0..num_segments {
            let Some(segment) = state.get_segment(seg_idx) else {
                continue;
            };
            let text = segment
                .to_str()
                .map_err(|e| TalgreinirError::InferenceFailed {
                    message: format!("Invalid UTF-8 in segment text: {}", e),
                })?
                .to_string();

            // Segment timestamps are in centiseconds (10ms units)
            let start = segment.start_timestamp() as f64 / 100.0;
            let end = segment.end_timestamp() as f64 / 100.0;

            let words = if options.word_timestamps {
                let mut words = Vec::new();
                for tok_idx in 0..segment.n_tokens() {
                    let Some(token) = segment.get_token(tok_idx) else {
                        continue;
                    };
                    let Ok(token_text) = token.to_str() else {
                        continue;
                    };
                    let data = token.token_data();
                    if let Some(word) =
                        word_from_token(token_text, data.t0, data.t1, token.token_probability())
                    {
                        words.push(word);
                    }
                }
                Some(words)
            } else {
                None
            };

            segments.push(Segment {
                start,
                end,
                text,
                words,
            });
        }

        let language = if forced_language {
            options.language.clone()
        } else {
            let lang_id = state.full_lang_id_from_state();
            whisper_rs::get_lang_str(lang_id).unwrap_or("").to_string()
        };

        let info = TranscriptionInfo {
            language,
            // whisper.cpp does not report a detection probability; forced
            // languages are certain by construction.
            language_probability: 1.0,
            duration,
        };

        Ok((segments, info))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(not(feature = "whisper"))]
impl SpeechEngine for WhisperEngine {
    fn transcribe(
        &self,
        _samples: &[f32],
        _options: &DecodeOptions,
    ) -> Result<(Vec<Segment>, TranscriptionInfo)> {
        Err(TalgreinirError::InferenceFailed {
            message: concat!(
                "Whisper feature not enabled. This binary was built without speech recognition.\n",
                "To fix: cargo build --release (whisper is enabled by default)\n",
                "If build fails with cmake errors, install: sudo apt install cmake"
            )
            .to_string(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
