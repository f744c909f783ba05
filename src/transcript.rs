//! Transcript assembly from the raw segment stream.
//!
//! Takes the time-ordered segments an engine produced, drops hallucinated
//! micro-segments, and packages the surviving text with timing metadata.
//! Filtering only ever removes segments — order is preserved and nothing is
//! merged or rewritten beyond whitespace trimming.

use crate::defaults;
use crate::error::{Result, TalgreinirError};
use crate::stt::engine::{Segment, TranscriptionInfo};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Assembled transcript with retained segments and run metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptResult {
    /// Surviving segment texts joined by single spaces. Empty for silent input.
    pub full_text: String,
    /// Retained segments in chronological order.
    pub segments: Vec<Segment>,
    pub metadata: TranscriptMetadata,
}

/// Metadata attached to an assembled transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptMetadata {
    /// Total audio duration in seconds
    pub audio_duration: f64,
    /// Detected (or forced) language code
    pub language: String,
    pub language_probability: f64,
    /// Model load wall time in seconds, when the caller measured it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_load_time: Option<f64>,
    /// Inference wall time in seconds, measured by the caller around the ASR call
    pub transcription_time: f64,
    /// Originating audio file path (opaque, for output only)
    pub audio_file: String,
    /// Name of the model that produced the segments
    pub model: String,
}

/// Whether a segment is a hallucination: a micro-segment that is both very
/// short and nearly empty. Text is assumed to be already trimmed.
///
/// Genuine short words ("já", "nei") exceed the duration floor in practice,
/// so only spurious VAD-boundary tokens match both conditions.
pub fn is_hallucination(duration: f64, text: &str) -> bool {
    duration < defaults::HALLUCINATION_MAX_DURATION_SECS
        && text.chars().count() <= defaults::HALLUCINATION_MAX_CHARS
}

/// Assemble a transcript from the raw segment stream and summary metadata.
///
/// Per segment: trim the text, drop it if [`is_hallucination`], otherwise
/// retain it unchanged. The retained list is a strict subsequence of the
/// input. Timing values come from the caller, which wraps the engine call
/// with wall-clock measurement.
///
/// # Errors
/// Returns `SegmentOutOfOrder` when a segment reports `end < start` — that is
/// an engine contract violation, not recoverable input.
pub fn assemble(
    raw_segments: impl IntoIterator<Item = Segment>,
    info: &TranscriptionInfo,
    audio_file: &str,
    model: &str,
    model_load_time: Option<Duration>,
    transcription_time: Duration,
) -> Result<TranscriptResult> {
    let mut texts: Vec<String> = Vec::new();
    let mut segments: Vec<Segment> = Vec::new();

    for segment in raw_segments {
        if segment.end < segment.start {
            return Err(TalgreinirError::SegmentOutOfOrder {
                start: segment.start,
                end: segment.end,
            });
        }

        let text = segment.text.trim().to_string();

        if is_hallucination(segment.duration(), &text) {
            continue;
        }

        texts.push(text.clone());
        segments.push(Segment {
            start: segment.start,
            end: segment.end,
            text,
            words: segment.words,
        });
    }

    Ok(TranscriptResult {
        full_text: texts.join(" "),
        segments,
        metadata: TranscriptMetadata {
            audio_duration: info.duration,
            language: info.language.clone(),
            language_probability: info.language_probability,
            model_load_time: model_load_time.map(|d| d.as_secs_f64()),
            transcription_time: transcription_time.as_secs_f64(),
            audio_file: audio_file.to_string(),
            model: model.to_string(),
        },
    })
}
