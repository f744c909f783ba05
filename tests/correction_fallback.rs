//! Correction fallback contract: no service failure may alter or lose the
//! transcript text, and malformed service responses are rejected before use.

use async_trait::async_trait;
use talgreinir::error::{Result, TalgreinirError};
use talgreinir::{CorrectionResult, Corrector};

/// Corrector double that fails with a configurable error.
struct FaultyCorrector {
    error: fn() -> TalgreinirError,
}

#[async_trait]
impl Corrector for FaultyCorrector {
    async fn correct_detailed(&self, _text: &str) -> Result<CorrectionResult> {
        Err((self.error)())
    }

    fn name(&self) -> &str {
        "faulty"
    }
}

/// Corrector double that returns whatever it was constructed with.
struct CannedCorrector(CorrectionResult);

#[async_trait]
impl Corrector for CannedCorrector {
    async fn correct_detailed(&self, _text: &str) -> Result<CorrectionResult> {
        self.0.validate()?;
        Ok(self.0.clone())
    }

    fn name(&self) -> &str {
        "canned"
    }
}

const INPUT: &str = "halló ég heiti jón og ég bý í reykjavík";

#[tokio::test]
async fn network_failure_falls_back_to_identity() {
    let corrector = FaultyCorrector {
        error: || TalgreinirError::Correction {
            message: "connection timed out".to_string(),
        },
    };

    let output = corrector.correct_with_fallback(INPUT, false).await;
    assert_eq!(output, INPUT);
}

#[tokio::test]
async fn parse_failure_falls_back_to_identity() {
    let corrector = FaultyCorrector {
        error: || TalgreinirError::Correction {
            message: "response was not valid JSON".to_string(),
        },
    };

    let output = corrector.correct_with_fallback(INPUT, true).await;
    assert_eq!(output, INPUT);
}

#[tokio::test]
async fn out_of_range_confidence_is_rejected_and_falls_back() {
    // The double validates like the real adapter does after deserializing,
    // so a confidence of 1.5 never reaches the caller as a success.
    let corrector = CannedCorrector(CorrectionResult {
        corrected_text: "Halló.".to_string(),
        confidence: 1.5,
        changes_summary: String::new(),
    });

    let detailed = corrector.correct_detailed(INPUT).await;
    assert!(matches!(
        detailed,
        Err(TalgreinirError::ConfidenceOutOfRange { value }) if value == 1.5
    ));

    let output = corrector.correct_with_fallback(INPUT, false).await;
    assert_eq!(output, INPUT);
}

#[tokio::test]
async fn empty_corrected_text_is_rejected_and_falls_back() {
    let corrector = CannedCorrector(CorrectionResult {
        corrected_text: "   ".to_string(),
        confidence: 0.9,
        changes_summary: "ekkert".to_string(),
    });

    let output = corrector.correct_with_fallback(INPUT, false).await;
    assert_eq!(output, INPUT);
}

#[tokio::test]
async fn successful_correction_replaces_text_verbatim() {
    let corrected = "Halló, ég heiti Jón og ég bý í Reykjavík.";
    let corrector = CannedCorrector(
        CorrectionResult::new(corrected, 0.97, "Hástafir og greinarmerki").unwrap(),
    );

    let output = corrector.correct_with_fallback(INPUT, false).await;
    assert_eq!(output, corrected);
}

#[tokio::test]
async fn fallback_preserves_unicode_text_exactly() {
    let corrector = FaultyCorrector {
        error: || TalgreinirError::Correction {
            message: "HTTP 503".to_string(),
        },
    };
    let input = "þáð æði öll él — dæmi";

    let output = corrector.correct_with_fallback(input, false).await;
    assert_eq!(output, input);
}
