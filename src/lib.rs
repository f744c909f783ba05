//! talgreinir - Icelandic speech transcription
//!
//! Whisper-based transcription with hallucination filtering and optional
//! Gemini punctuation/grammar correction.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod audio;
pub mod cli;
pub mod config;
pub mod correction;
pub mod defaults;
pub mod error;
pub mod output;
pub mod presets;
pub mod stt;
pub mod transcript;

// Core traits (engine → assemble → correct)
pub use correction::corrector::{CorrectionResult, Corrector};
pub use correction::gemini::{GeminiCorrector, resolve_api_key};
pub use stt::engine::{DecodeOptions, Segment, SpeechEngine, TranscriptionInfo, Word};

// Assembly
pub use transcript::{TranscriptMetadata, TranscriptResult, assemble, is_hallucination};

// Error handling
pub use error::{Result, TalgreinirError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.3.1+abc1234"` when git hash is available, `"0.3.1"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
