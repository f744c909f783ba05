//! Transcription pipeline composition.
//!
//! Wires the pieces together for one run: load model → load audio →
//! transcribe → assemble → save → optionally correct. Strictly sequential;
//! the only blocking steps are inference and the correction network call.

use crate::audio::AudioBuffer;
use crate::config::Config;
use crate::correction::corrector::Corrector;
use crate::correction::gemini::{GeminiCorrector, resolve_api_key};
use crate::error::{Result, TalgreinirError};
use crate::output;
use crate::presets::Mode;
use crate::stt::engine::{DecodeOptions, SpeechEngine};
use crate::stt::whisper::{WhisperConfig, WhisperEngine};
use crate::transcript::{TranscriptResult, assemble};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Transcribe loaded audio with the given engine and assemble the result.
///
/// Wall-clock time for the inference call is measured here and folded into
/// the result metadata, together with the model load time the caller
/// measured (if any).
pub fn transcribe_file(
    engine: &dyn SpeechEngine,
    audio: &AudioBuffer,
    options: &DecodeOptions,
    audio_path: &str,
    model_load_time: Option<Duration>,
) -> Result<TranscriptResult> {
    let started = Instant::now();
    let (segments, info) = engine.transcribe(audio.samples(), options)?;
    let transcription_time = started.elapsed();

    assemble(
        segments,
        &info,
        audio_path,
        engine.model_name(),
        model_load_time,
        transcription_time,
    )
}

/// Run the transcribe command: load model → transcribe → save → correct.
///
/// # Arguments
/// * `config` - Base configuration (can be overridden by CLI args)
/// * `audio_path` - Audio file to transcribe
/// * `mode` - Accuracy/speed preset
/// * `model` - Optional model path override from CLI
/// * `language` - Optional language override from CLI
/// * `output_dir` - Optional output directory override from CLI
/// * `use_llm` - Send the transcript to Gemini for correction
/// * `quiet` - Suppress status messages
/// * `verbose` - Show per-segment output and correction diagnostics
pub async fn run_transcribe_command(
    mut config: Config,
    audio_path: PathBuf,
    mode: Mode,
    model: Option<String>,
    language: Option<String>,
    output_dir: Option<PathBuf>,
    use_llm: bool,
    quiet: bool,
    verbose: bool,
) -> Result<()> {
    // Validate input before any heavy work
    if !audio_path.exists() {
        return Err(TalgreinirError::AudioFileNotFound {
            path: audio_path.to_string_lossy().to_string(),
        });
    }

    // Apply CLI overrides
    if let Some(m) = model {
        config.asr.model = m;
    }
    if let Some(l) = language {
        config.asr.language = l;
    }
    if let Some(dir) = output_dir {
        config.output.dir = dir;
    }

    // Resolve the API key up front when correction is requested, so a
    // missing key aborts before minutes of inference, not after.
    let api_key = if use_llm {
        Some(resolve_api_key(Path::new(&config.correction.key_file))?)
    } else {
        None
    };

    if !quiet {
        eprintln!(
            "Loading model '{}' ({} mode)...",
            config.asr.model,
            mode.name()
        );
    }
    let load_started = Instant::now();
    let engine = WhisperEngine::new(WhisperConfig {
        model_path: PathBuf::from(&config.asr.model),
        threads: config.asr.threads,
    })?;
    let model_load_time = load_started.elapsed();

    if !quiet {
        eprintln!("Transcribing: {}", audio_path.display());
    }

    let audio = AudioBuffer::from_file(&audio_path)?;
    let options = mode.decode_options(&config.asr.language);
    let result = transcribe_file(
        &engine,
        &audio,
        &options,
        &audio_path.to_string_lossy(),
        Some(model_load_time),
    )?;

    if verbose {
        output::print_segments(&result);
    }

    let saved = output::save_transcript(&result, &config.output.dir)?;

    if !quiet {
        output::print_summary(&result, &saved);
    }

    if let Some(api_key) = api_key {
        if !quiet {
            eprintln!(
                "\nPost-processing with {}...",
                config.correction.model
            );
        }
        let corrector = GeminiCorrector::new(api_key, &config.correction.model)?;
        let corrected = corrector
            .correct_with_fallback(&result.full_text, verbose)
            .await;
        let corrected_path = output::save_corrected(
            &result.metadata.audio_file,
            &corrected,
            &config.output.dir,
        )?;
        if !quiet {
            eprintln!("Saved: {}", corrected_path.display());
        }
    }

    Ok(())
}
