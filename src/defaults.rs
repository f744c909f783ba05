//! Default configuration constants for talgreinir.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Default Whisper model path.
///
/// The GGML conversion of the Icelandic fine-tune published by the
/// Language and Voice Lab (967 hours of Icelandic speech). Any whisper.cpp
/// compatible `.bin` model works; multilingual models are required for
/// Icelandic output.
pub const DEFAULT_MODEL: &str = "models/ggml-whisper-large-icelandic-967h.bin";

/// Default language code for transcription.
///
/// "is" forces Icelandic decoding. Forcing the language skips Whisper's
/// detection pass and prevents mid-transcript language switches.
pub const DEFAULT_LANGUAGE: &str = "is";

/// Language value that triggers automatic language detection.
pub const AUTO_LANGUAGE: &str = "auto";

/// Audio sample rate Whisper expects, in Hz.
pub const SAMPLE_RATE: u32 = 16000;

/// Default beam search width.
///
/// beam_size=1 is fastest, 5 is the speed/quality balance point, 10+ trades
/// substantial time for marginal accuracy. 5 reliably catches short Icelandic
/// function words ("að") that greedy decoding drops.
pub const DEFAULT_BEAM_SIZE: u32 = 5;

/// Default sampling temperature. 0.0 keeps decoding deterministic.
pub const DEFAULT_TEMPERATURE: f32 = 0.0;

/// Maximum duration, in seconds, for a segment to be considered a
/// hallucination candidate.
///
/// Whisper under VAD emits tiny spurious tokens ("um", "á") on near-silent
/// boundaries. Genuine short words exceed this floor in practice. Tuned
/// empirically together with [`HALLUCINATION_MAX_CHARS`]; changing either
/// changes which segments survive.
pub const HALLUCINATION_MAX_DURATION_SECS: f64 = 0.3;

/// Maximum text length, in characters, for a segment to be considered a
/// hallucination candidate. Counted in Unicode scalar values, not bytes —
/// "á" is one character.
pub const HALLUCINATION_MAX_CHARS: usize = 3;

/// Minimum duration of silence (in milliseconds) the VAD gate treats as
/// a break. Pauses shorter than this are kept as part of speech.
pub const VAD_MIN_SILENCE_MS: u32 = 500;

/// RMS threshold above which a window counts as speech for the VAD gate.
///
/// Tuned for typical recorded speech levels; files with no window above this
/// contain nothing worth running inference on.
pub const VAD_SPEECH_THRESHOLD: f32 = 0.02;

/// Entropy threshold above which a decoded segment is treated as a
/// repetition loop ("um um um") and suppressed by the decoder.
pub const ENTROPY_THRESHOLD: f32 = 2.4;

/// Mean log probability below which a decoded segment is discarded.
/// -0.8 is stricter than whisper.cpp's default, trading recall for fewer
/// confabulated segments.
pub const LOG_PROB_THRESHOLD: f32 = -0.8;

/// No-speech probability above which a segment is treated as silence.
pub const NO_SPEECH_THRESHOLD: f32 = 0.6;

/// Minimum decoder probability for a word to appear in the word-level
/// timestamp list. Tokens at or below this are hallucination noise.
pub const MIN_WORD_PROBABILITY: f32 = 0.1;

/// Default Gemini model used for punctuation/grammar correction.
pub const CORRECTION_MODEL: &str = "gemini-2.5-flash";

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default local file checked for the Gemini API key when the environment
/// variable is unset.
pub const API_KEY_FILE: &str = ".gemini_key";

/// Timeout for a single correction request, in seconds.
///
/// One bounded attempt, no retries — on expiry the caller falls back to the
/// uncorrected transcript.
pub const CORRECTION_TIMEOUT_SECS: u64 = 300;

/// Token budget for the correction response. Generous enough for any
/// transcript the corrected JSON payload has to carry back.
pub const CORRECTION_MAX_OUTPUT_TOKENS: u32 = 16384;

/// Default directory transcripts are written to.
pub const OUTPUT_DIR: &str = "transcripts";

/// Report the GPU backend compiled into this build.
///
/// Returns a human-readable name based on the compile-time feature flags.
/// Only one GPU backend can be active at a time; if none is enabled, returns "CPU".
pub fn gpu_backend() -> &'static str {
    if cfg!(feature = "cuda") {
        "CUDA"
    } else if cfg!(feature = "vulkan") {
        "Vulkan"
    } else if cfg!(feature = "hipblas") {
        "HipBLAS (AMD)"
    } else if cfg!(feature = "openblas") {
        "OpenBLAS"
    } else {
        "CPU"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_backend_matches_compiled_feature() {
        let expected = if cfg!(feature = "cuda") {
            "CUDA"
        } else if cfg!(feature = "vulkan") {
            "Vulkan"
        } else if cfg!(feature = "hipblas") {
            "HipBLAS (AMD)"
        } else if cfg!(feature = "openblas") {
            "OpenBLAS"
        } else {
            "CPU"
        };
        assert_eq!(gpu_backend(), expected);
    }

    #[test]
    fn hallucination_thresholds_are_the_tuned_values() {
        // Both bounds must hold simultaneously for a segment to be dropped.
        assert_eq!(HALLUCINATION_MAX_DURATION_SECS, 0.3);
        assert_eq!(HALLUCINATION_MAX_CHARS, 3);
    }
}
