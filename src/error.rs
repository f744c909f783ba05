//! Error types for talgreinir.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TalgreinirError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error(
        "Gemini API key not found. Set {env_var} or save your key to {key_file}.\n\
         Get one at https://aistudio.google.com/"
    )]
    ApiKeyMissing { env_var: String, key_file: String },

    // Audio input errors
    #[error("Audio file not found: {path}")]
    AudioFileNotFound { path: String },

    #[error("Failed to read audio: {message}")]
    AudioRead { message: String },

    // Transcription errors
    #[error("Transcription model not found at {path}")]
    ModelNotFound { path: String },

    #[error("Transcription inference failed: {message}")]
    InferenceFailed { message: String },

    #[error("Segment timestamps out of order: start {start}s, end {end}s")]
    SegmentOutOfOrder { start: f64, end: f64 },

    // Correction errors (transient service failures, always recoverable)
    #[error("Correction failed: {message}")]
    Correction { message: String },

    #[error("Correction confidence {value} outside [0.0, 1.0]")]
    ConfidenceOutOfRange { value: f64 },

    // General I/O and wire-format errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl TalgreinirError {
    /// Whether this error is a configuration problem the user must fix,
    /// as opposed to a transient service failure the pipeline can degrade past.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            TalgreinirError::ConfigFileNotFound { .. }
                | TalgreinirError::ConfigInvalidValue { .. }
                | TalgreinirError::Config(_)
                | TalgreinirError::ApiKeyMissing { .. }
        )
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, TalgreinirError>;
