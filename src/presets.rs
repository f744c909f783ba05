//! Transcription presets for different accuracy/speed trade-offs.

use crate::defaults;
use crate::stt::engine::DecodeOptions;
use clap::ValueEnum;

/// Named accuracy/speed trade-off selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Mode {
    /// Fastest processing (beam 1, VAD on, no context carry) — quick drafts
    Fast,
    /// Balanced speed/quality (beam 5, VAD on) — daily use
    #[default]
    Balanced,
    /// Best quality (beam 10, VAD off, word timestamps) — unclear audio
    Accurate,
}

impl Mode {
    /// Decode options for this preset.
    pub fn decode_options(self, language: &str) -> DecodeOptions {
        let base = DecodeOptions {
            language: language.to_string(),
            ..DecodeOptions::default()
        };
        match self {
            Mode::Fast => DecodeOptions {
                beam_size: 1,
                condition_on_previous_text: false,
                ..base
            },
            Mode::Balanced => DecodeOptions {
                beam_size: defaults::DEFAULT_BEAM_SIZE,
                ..base
            },
            Mode::Accurate => DecodeOptions {
                beam_size: 10,
                vad_enabled: false,
                word_timestamps: true,
                ..base
            },
        }
    }

    /// Human-readable name used in status output.
    pub fn name(self) -> &'static str {
        match self {
            Mode::Fast => "fast",
            Mode::Balanced => "balanced",
            Mode::Accurate => "accurate",
        }
    }
}
