use crate::defaults;
use crate::error::{Result, TalgreinirError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A single recognized word with its own timestamps, emitted when word-level
/// timestamps are requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub word: String,
    pub start: f64,
    pub end: f64,
    /// Decoder probability for this word, in [0.0, 1.0].
    pub probability: f32,
}

/// A time-bounded span of recognized speech.
///
/// Timestamps are seconds from the start of the audio. `start <= end` is an
/// engine contract; the assembler rejects violations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    /// Word-level timestamps, present only when the decode requested them.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub words: Option<Vec<Word>>,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            words: None,
        }
    }

    /// Attach word-level timestamps.
    pub fn with_words(mut self, words: Vec<Word>) -> Self {
        self.words = Some(words);
        self
    }

    /// Length of the segment in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Summary metadata the engine reports alongside the segment stream.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionInfo {
    /// Detected (or forced) language code
    pub language: String,
    /// Probability of the detected language (1.0 when forced)
    pub language_probability: f64,
    /// Total audio duration in seconds
    pub duration: f64,
}

/// Decoding parameters passed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeOptions {
    /// Beam search width (1 = greedy)
    pub beam_size: u32,
    /// Language code, or "auto" for detection
    pub language: String,
    /// Sampling temperature (0.0 = deterministic)
    pub temperature: f32,
    /// Skip silent audio before inference
    pub vad_enabled: bool,
    /// Minimum silence treated as a break by the VAD gate
    pub vad_min_silence_ms: u32,
    /// Request per-token timestamps from the decoder
    pub word_timestamps: bool,
    /// Let the decoder condition on the previous segment's text. Off trades
    /// coherence for speed and stops repetition loops from propagating.
    pub condition_on_previous_text: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            beam_size: defaults::DEFAULT_BEAM_SIZE,
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            temperature: defaults::DEFAULT_TEMPERATURE,
            vad_enabled: true,
            vad_min_silence_ms: defaults::VAD_MIN_SILENCE_MS,
            word_timestamps: false,
            condition_on_previous_text: true,
        }
    }
}

impl DecodeOptions {
    /// Validate parameter ranges before they reach the engine.
    pub fn validate(&self) -> Result<()> {
        if self.beam_size < 1 {
            return Err(TalgreinirError::ConfigInvalidValue {
                key: "beam_size".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.temperature < 0.0 {
            return Err(TalgreinirError::ConfigInvalidValue {
                key: "temperature".to_string(),
                message: "must be non-negative".to_string(),
            });
        }
        Ok(())
    }
}

/// Trait for speech-to-text engines.
///
/// This trait allows swapping implementations (real Whisper vs mock).
pub trait SpeechEngine: Send + Sync {
    /// Transcribe audio samples to a time-ordered segment stream.
    ///
    /// # Arguments
    /// * `samples` - Audio as f32 PCM in [-1.0, 1.0] at 16kHz mono
    /// * `options` - Decoding parameters
    ///
    /// # Returns
    /// The raw (unfiltered) segments in chronological order plus summary metadata.
    fn transcribe(
        &self,
        samples: &[f32],
        options: &DecodeOptions,
    ) -> Result<(Vec<Segment>, TranscriptionInfo)>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;
}

/// Implement SpeechEngine for Arc<T> to allow sharing across callers.
impl<T: SpeechEngine> SpeechEngine for Arc<T> {
    fn transcribe(
        &self,
        samples: &[f32],
        options: &DecodeOptions,
    ) -> Result<(Vec<Segment>, TranscriptionInfo)> {
        (**self).transcribe(samples, options)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Mock engine for testing
#[derive(Debug, Clone)]
pub struct MockEngine {
    model_name: String,
    segments: Vec<Segment>,
    language: String,
    should_fail: bool,
}

impl MockEngine {
    /// Create a new mock engine that emits no segments
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            segments: Vec::new(),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            should_fail: false,
        }
    }

    /// Configure the mock to emit specific segments
    pub fn with_segments(mut self, segments: Vec<Segment>) -> Self {
        self.segments = segments;
        self
    }

    /// Configure the reported language
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl SpeechEngine for MockEngine {
    fn transcribe(
        &self,
        samples: &[f32],
        options: &DecodeOptions,
    ) -> Result<(Vec<Segment>, TranscriptionInfo)> {
        options.validate()?;
        if self.should_fail {
            return Err(TalgreinirError::InferenceFailed {
                message: "mock inference failure".to_string(),
            });
        }
        let info = TranscriptionInfo {
            language: self.language.clone(),
            language_probability: 1.0,
            duration: samples.len() as f64 / f64::from(defaults::SAMPLE_RATE),
        };
        Ok((self.segments.clone(), info))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_duration() {
        let segment = Segment::new(1.5, 3.0, "halló");
        assert_eq!(segment.duration(), 1.5);
    }

    #[test]
    fn test_decode_options_defaults() {
        let options = DecodeOptions::default();
        assert_eq!(options.beam_size, 5);
        assert_eq!(options.language, "is");
        assert_eq!(options.temperature, 0.0);
        assert!(options.vad_enabled);
        assert_eq!(options.vad_min_silence_ms, 500);
        assert!(!options.word_timestamps);
        assert!(options.condition_on_previous_text);
    }

    #[test]
    fn test_decode_options_rejects_zero_beam() {
        let options = DecodeOptions {
            beam_size: 0,
            ..DecodeOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_decode_options_rejects_negative_temperature() {
        let options = DecodeOptions {
            temperature: -0.1,
            ..DecodeOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_mock_engine_returns_segments_in_order() {
        let segments = vec![
            Segment::new(0.0, 3.5, "Halló heimur"),
            Segment::new(3.5, 7.0, "þetta er prufa"),
        ];
        let engine = MockEngine::new("test-model").with_segments(segments.clone());

        let samples = vec![0.0f32; 16000];
        let (out, info) = engine.transcribe(&samples, &DecodeOptions::default()).unwrap();

        assert_eq!(out, segments);
        assert_eq!(info.language, "is");
        assert_eq!(info.language_probability, 1.0);
        assert_eq!(info.duration, 1.0);
    }

    #[test]
    fn test_mock_engine_returns_error_when_configured() {
        let engine = MockEngine::new("test-model").with_failure();

        let result = engine.transcribe(&[0.0f32; 100], &DecodeOptions::default());
        assert!(matches!(
            result,
            Err(TalgreinirError::InferenceFailed { .. })
        ));
    }

    #[test]
    fn test_mock_engine_empty_audio_yields_no_segments() {
        let engine = MockEngine::new("test-model");
        let (segments, info) = engine.transcribe(&[], &DecodeOptions::default()).unwrap();
        assert!(segments.is_empty());
        assert_eq!(info.duration, 0.0);
    }

    #[test]
    fn test_engine_trait_is_object_safe() {
        let engine: Box<dyn SpeechEngine> = Box::new(MockEngine::new("boxed"));
        assert_eq!(engine.model_name(), "boxed");
    }

    #[test]
    fn test_segment_serializes_expected_fields() {
        let segment = Segment::new(0.0, 5.0, "Þetta er rétt");
        let json = serde_json::to_value(&segment).unwrap();
        assert_eq!(json["start"], 0.0);
        assert_eq!(json["end"], 5.0);
        assert_eq!(json["text"], "Þetta er rétt");
        // Without word timestamps the words field is absent, not null.
        assert!(json.get("words").is_none());
    }

    #[test]
    fn test_segment_serializes_words_when_present() {
        let segment = Segment::new(0.0, 1.0, "góðan daginn").with_words(vec![
            Word {
                word: "góðan".to_string(),
                start: 0.0,
                end: 0.4,
                probability: 0.98,
            },
            Word {
                word: "daginn".to_string(),
                start: 0.4,
                end: 1.0,
                probability: 0.95,
            },
        ]);
        let json = serde_json::to_value(&segment).unwrap();
        let words = json["words"].as_array().unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[0]["word"], "góðan");
        assert_eq!(words[1]["end"], 1.0);
    }

    #[test]
    fn test_segment_deserializes_without_words() {
        let segment: Segment =
            serde_json::from_str(r#"{"start": 0.0, "end": 2.0, "text": "halló"}"#).unwrap();
        assert_eq!(segment.words, None);
    }
}
