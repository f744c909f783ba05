//! Command-line interface for talgreinir
//!
//! Provides argument parsing using clap derive macros.

use crate::presets::Mode;
use clap::Parser;
use std::path::PathBuf;

/// Icelandic speech transcription
#[derive(Parser, Debug)]
#[command(
    name = "talgreinir",
    version,
    about = "Transcribe Icelandic speech audio with Whisper, optionally corrected by Gemini"
)]
pub struct Cli {
    /// Audio file to transcribe (WAV)
    #[arg(value_name = "AUDIO")]
    pub audio: PathBuf,

    /// Accuracy/speed preset
    #[arg(short, long, value_enum, default_value_t = Mode::Balanced)]
    pub mode: Mode,

    /// Correct punctuation and grammar with Gemini (requires an API key)
    #[arg(short = 'l', long = "llm")]
    pub llm: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Whisper model path override
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Language code override (default: is). Use "auto" for detection
    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    /// Directory to write transcripts to (default: transcripts)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Suppress status output (quiet mode)
    #[arg(short, long)]
    pub quiet: bool,

    /// Show per-segment output and correction diagnostics
    #[arg(short, long)]
    pub verbose: bool,
}
