//! Transcript persistence and terminal rendering.
//!
//! Writes the plain-text transcript, the JSON record with timestamps and
//! metadata, and (when correction ran) the corrected text. Status output
//! goes to stderr so stdout stays clean for piping.

use crate::error::Result;
use crate::transcript::TranscriptResult;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

/// Files written for one transcription run.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedTranscript {
    pub text_file: PathBuf,
    pub json_file: PathBuf,
}

/// File stem of the originating audio file, used to name outputs.
pub fn audio_stem(audio_file: &str) -> String {
    Path::new(audio_file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("transcript")
        .to_string()
}

/// Write `<stem>_transcript.txt` and `<stem>_transcript.json` to `output_dir`.
///
/// The directory is created if missing. An empty transcript is written as an
/// empty text file — silent input is a valid outcome, not an error.
pub fn save_transcript(result: &TranscriptResult, output_dir: &Path) -> Result<SavedTranscript> {
    std::fs::create_dir_all(output_dir)?;

    let stem = audio_stem(&result.metadata.audio_file);
    let text_file = output_dir.join(format!("{}_transcript.txt", stem));
    let json_file = output_dir.join(format!("{}_transcript.json", stem));

    std::fs::write(&text_file, &result.full_text)?;
    std::fs::write(&json_file, serde_json::to_string_pretty(result)?)?;

    Ok(SavedTranscript {
        text_file,
        json_file,
    })
}

/// Write `<stem>_corrected.txt` to `output_dir`.
pub fn save_corrected(audio_file: &str, corrected: &str, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let path = output_dir.join(format!("{}_corrected.txt", audio_stem(audio_file)));
    std::fs::write(&path, corrected)?;
    Ok(path)
}

/// Render retained segments with timestamps to stderr.
pub fn print_segments(result: &TranscriptResult) {
    eprintln!("\n{}", "--- Segments ---".dimmed());
    for segment in &result.segments {
        eprintln!(
            "{} {}",
            format!("[{:.2}s -> {:.2}s]", segment.start, segment.end).dimmed(),
            segment.text
        );
    }
}

/// Render the run summary to stderr.
pub fn print_summary(result: &TranscriptResult, saved: &SavedTranscript) {
    let meta = &result.metadata;
    eprintln!("\n{}", "--- Summary ---".dimmed());
    if let Some(load) = meta.model_load_time {
        eprintln!(
            "Model: {} ({}, loaded in {:.2}s)",
            meta.model,
            crate::defaults::gpu_backend(),
            load
        );
    } else {
        eprintln!("Model: {} ({})", meta.model, crate::defaults::gpu_backend());
    }
    eprintln!(
        "Duration: {:.2}s | Time: {:.2}s | Language: {} ({:.0}%)",
        meta.audio_duration,
        meta.transcription_time,
        meta.language,
        meta.language_probability * 100.0
    );
    eprintln!("Saved: {}", saved.text_file.display().green());
    eprintln!("Saved: {}", saved.json_file.display().green());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stt::engine::Segment;
    use crate::transcript::TranscriptMetadata;

    fn sample_result(audio_file: &str) -> TranscriptResult {
        TranscriptResult {
            full_text: "Halló heimur þetta er prufa".to_string(),
            segments: vec![
                Segment::new(0.0, 3.5, "Halló heimur"),
                Segment::new(3.5, 7.0, "þetta er prufa"),
            ],
            metadata: TranscriptMetadata {
                audio_duration: 7.0,
                language: "is".to_string(),
                language_probability: 1.0,
                model_load_time: Some(1.1),
                transcription_time: 4.2,
                audio_file: audio_file.to_string(),
                model: "ggml-icelandic".to_string(),
            },
        }
    }

    #[test]
    fn audio_stem_strips_directory_and_extension() {
        assert_eq!(audio_stem("audio/upptaka.wav"), "upptaka");
        assert_eq!(audio_stem("/abs/path/fundur.m4a"), "fundur");
        assert_eq!(audio_stem(""), "transcript");
    }

    #[test]
    fn save_transcript_writes_text_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let result = sample_result("audio/upptaka.wav");

        let saved = save_transcript(&result, dir.path()).unwrap();

        assert_eq!(saved.text_file, dir.path().join("upptaka_transcript.txt"));
        assert_eq!(saved.json_file, dir.path().join("upptaka_transcript.json"));

        let text = std::fs::read_to_string(&saved.text_file).unwrap();
        assert_eq!(text, "Halló heimur þetta er prufa");

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&saved.json_file).unwrap()).unwrap();
        assert_eq!(json["full_text"], "Halló heimur þetta er prufa");
        assert_eq!(json["segments"].as_array().unwrap().len(), 2);
        assert_eq!(json["metadata"]["language"], "is");
        assert_eq!(json["metadata"]["audio_file"], "audio/upptaka.wav");
    }

    #[test]
    fn save_transcript_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/transcripts");
        let result = sample_result("x.wav");

        let saved = save_transcript(&result, &nested).unwrap();
        assert!(saved.text_file.exists());
    }

    #[test]
    fn save_transcript_empty_result_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut result = sample_result("silent.wav");
        result.full_text = String::new();
        result.segments.clear();

        let saved = save_transcript(&result, dir.path()).unwrap();
        let text = std::fs::read_to_string(&saved.text_file).unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn save_corrected_writes_next_to_transcript() {
        let dir = tempfile::tempdir().unwrap();

        let path = save_corrected("audio/upptaka.wav", "Halló, heimur.", dir.path()).unwrap();

        assert_eq!(path, dir.path().join("upptaka_corrected.txt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Halló, heimur.");
    }
}
