//! Corrector trait for post-ASR text correction.

use crate::error::{Result, TalgreinirError};
use async_trait::async_trait;
use owo_colors::OwoColorize;
use serde::Deserialize;

/// Structured result of a successful correction call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CorrectionResult {
    /// Corrected text with punctuation and grammar
    pub corrected_text: String,
    /// Model-reported confidence in [0.0, 1.0]
    pub confidence: f64,
    /// Brief summary of changes, in the transcript's language
    pub changes_summary: String,
}

impl CorrectionResult {
    /// Build a validated result.
    ///
    /// # Errors
    /// Rejects confidence outside [0.0, 1.0] and empty corrected text.
    pub fn new(
        corrected_text: impl Into<String>,
        confidence: f64,
        changes_summary: impl Into<String>,
    ) -> Result<Self> {
        let result = Self {
            corrected_text: corrected_text.into(),
            confidence,
            changes_summary: changes_summary.into(),
        };
        result.validate()?;
        Ok(result)
    }

    /// Validate invariants after deserialization.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence) || self.confidence.is_nan() {
            return Err(TalgreinirError::ConfidenceOutOfRange {
                value: self.confidence,
            });
        }
        if self.corrected_text.trim().is_empty() {
            return Err(TalgreinirError::Correction {
                message: "service returned empty corrected text".to_string(),
            });
        }
        Ok(())
    }
}

/// Trait for post-ASR text correction services.
///
/// Implementations talk to an external service and may fail for any of the
/// usual network reasons. Callers that cannot tolerate failure use
/// [`Corrector::correct_with_fallback`], which never errors.
#[async_trait]
pub trait Corrector: Send + Sync {
    /// Correct the given text, returning the structured service response.
    async fn correct_detailed(&self, text: &str) -> Result<CorrectionResult>;

    /// Return the name of this corrector for logging.
    fn name(&self) -> &str;

    /// Correct the given text, falling back to the input on any failure.
    ///
    /// This is the error boundary of the correction step: no service failure
    /// propagates past it. In verbose mode the confidence and change summary
    /// (or the failure) are reported on stderr; the return value is
    /// unaffected either way.
    async fn correct_with_fallback(&self, text: &str, verbose: bool) -> String {
        match self.correct_detailed(text).await {
            Ok(result) => {
                if verbose {
                    eprintln!(
                        "{} ({:.0}% confidence): {}",
                        "Corrected".green(),
                        result.confidence * 100.0,
                        result.changes_summary.dimmed()
                    );
                }
                result.corrected_text
            }
            Err(e) => {
                if verbose {
                    eprintln!("{} {}", "Correction failed:".red(), e);
                }
                text.to_string()
            }
        }
    }
}
