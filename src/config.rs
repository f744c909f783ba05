use crate::defaults;
use crate::error::TalgreinirError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub asr: AsrConfig,
    pub correction: CorrectionConfig,
    pub output: OutputConfig,
}

/// Speech recognition configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AsrConfig {
    /// Path to the whisper.cpp model file
    pub model: String,
    /// Language code ("is" default, "auto" for detection)
    pub language: String,
    /// Inference threads (None = auto-detect)
    pub threads: Option<usize>,
}

/// LLM correction configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CorrectionConfig {
    /// Gemini model identifier
    pub model: String,
    /// File checked for the API key when GEMINI_API_KEY is unset
    pub key_file: String,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory transcript files are written to
    pub dir: PathBuf,
}

impl Default for AsrConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_MODEL.to_string(),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            threads: None,
        }
    }
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            model: defaults::CORRECTION_MODEL.to_string(),
            key_file: defaults::API_KEY_FILE.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(defaults::OUTPUT_DIR),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// A missing file is a named `ConfigFileNotFound` error so the CLI can
    /// report an explicit `--config` path that points nowhere.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Err(TalgreinirError::ConfigFileNotFound {
                path: path.to_string_lossy().to_string(),
            }
            .into());
        }
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if matches!(
                    e.downcast_ref::<TalgreinirError>(),
                    Some(TalgreinirError::ConfigFileNotFound { .. })
                ) {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - TALGREINIR_MODEL → asr.model
    /// - TALGREINIR_LANGUAGE → asr.language
    /// - TALGREINIR_KEY_FILE → correction.key_file
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("TALGREINIR_MODEL")
            && !model.is_empty()
        {
            self.asr.model = model;
        }

        if let Ok(language) = std::env::var("TALGREINIR_LANGUAGE")
            && !language.is_empty()
        {
            self.asr.language = language;
        }

        if let Ok(key_file) = std::env::var("TALGREINIR_KEY_FILE")
            && !key_file.is_empty()
        {
            self.correction.key_file = key_file;
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/talgreinir/config.toml on Linux
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("talgreinir").join("config.toml"))
    }
}
