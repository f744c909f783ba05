//! Gemini-backed punctuation and grammar correction for Icelandic ASR output.
//!
//! Sends the raw transcript to the Gemini `generateContent` endpoint with a
//! deterministic prompt (temperature 0) and a response schema carrying
//! exactly three fields, so parsing never scrapes free text. Safety
//! categories are set to BLOCK_NONE — transcripts of ordinary speech must not
//! be rejected by the provider's default moderation.

use crate::correction::corrector::{CorrectionResult, Corrector};
use crate::defaults;
use crate::error::{Result, TalgreinirError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Harm categories the request explicitly un-gates.
const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Resolve the Gemini API key.
///
/// Checks the `GEMINI_API_KEY` environment variable first, then the given
/// key file. A missing key is a configuration error, distinct from transient
/// service failures — it is raised before any network call so the caller can
/// abort the correction step up front.
pub fn resolve_api_key(key_file: &Path) -> Result<String> {
    if let Ok(key) = std::env::var(defaults::API_KEY_ENV)
        && !key.trim().is_empty()
    {
        return Ok(key.trim().to_string());
    }

    if key_file.exists() {
        let key = std::fs::read_to_string(key_file)?;
        let key = key.trim();
        if !key.is_empty() {
            return Ok(key.to_string());
        }
    }

    Err(TalgreinirError::ApiKeyMissing {
        env_var: defaults::API_KEY_ENV.to_string(),
        key_file: key_file.to_string_lossy().to_string(),
    })
}

// Wire types for the generateContent endpoint.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Correction instruction for the model. The example anchors the expected
/// edit distance: punctuation, capitalization, and grammar, never paraphrase.
fn build_prompt(text: &str) -> String {
    format!(
        "You are an Icelandic language expert. You are given raw output from automatic speech recognition (ASR).\n\
         \n\
         The input has NO punctuation and NO capitalization — this is normal for ASR. Your job:\n\
         \n\
         1. SENTENCES: Insert periods (.) where sentences end. Add commas where natural pauses occur.\n\
         2. CAPITALIZATION: Capitalize the first letter of every sentence. Capitalize proper nouns (names, places).\n\
         3. SPELLING: Fix obvious ASR misspellings and wrong word boundaries.\n\
         4. GRAMMAR: Fix all grammatical errors to produce correct, natural Icelandic. ASR frequently gets verb forms, case, and agreement wrong.\n\
         5. PRESERVE: Do NOT add or remove sentences. Do NOT change the meaning. Keep everything in Icelandic.\n\
         \n\
         Example:\n\
         Input: halló ég heiti jón og ég bý í reykjavík það var eins og ég var að tala í tunnu\n\
         Output: Halló, ég heiti Jón og ég bý í Reykjavík. Það var eins og ég væri að tala í tunnu.\n\
         \n\
         Text to correct:\n\
         {text}"
    )
}

/// Schema forcing the structured three-field response.
fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "corrected_text": {
                "type": "STRING",
                "description": "Corrected Icelandic text with punctuation and grammar"
            },
            "confidence": {
                "type": "NUMBER",
                "description": "Confidence score between 0 and 1"
            },
            "changes_summary": {
                "type": "STRING",
                "description": "Brief summary of changes (in Icelandic)"
            }
        },
        "required": ["corrected_text", "confidence", "changes_summary"]
    })
}

fn build_request(text: &str) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: build_prompt(text),
            }],
        }],
        generation_config: GenerationConfig {
            temperature: 0.0,
            max_output_tokens: defaults::CORRECTION_MAX_OUTPUT_TOKENS,
            response_mime_type: "application/json".to_string(),
            response_schema: response_schema(),
        },
        safety_settings: SAFETY_CATEGORIES
            .iter()
            .map(|category| SafetySetting {
                category,
                threshold: "BLOCK_NONE",
            })
            .collect(),
    }
}

/// Extract and validate the structured payload from a generateContent response.
fn parse_response(response: GenerateResponse) -> Result<CorrectionResult> {
    let payload = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| TalgreinirError::Correction {
            message: "response contained no candidates".to_string(),
        })?;

    let result: CorrectionResult =
        serde_json::from_str(&payload).map_err(|e| TalgreinirError::Correction {
            message: format!("response did not match schema: {}", e),
        })?;

    result.validate()?;
    Ok(result)
}

/// Gemini-backed corrector.
pub struct GeminiCorrector {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiCorrector {
    /// Create a corrector with a resolved API key.
    ///
    /// The key must already be resolved (see [`resolve_api_key`]); the
    /// corrector itself never reads the environment.
    pub fn new(api_key: String, model: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(defaults::CORRECTION_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            api_key,
            model: model.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Override the endpoint base URL (for tests against a local server).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl Corrector for GeminiCorrector {
    async fn correct_detailed(&self, text: &str) -> Result<CorrectionResult> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request(text))
            .send()
            .await
            .map_err(|e| TalgreinirError::Correction {
                message: format!("request failed: {}", e),
            })?;

        let response = response
            .error_for_status()
            .map_err(|e| TalgreinirError::Correction {
                message: format!("service returned error status: {}", e),
            })?;

        let body: GenerateResponse =
            response
                .json()
                .await
                .map_err(|e| TalgreinirError::Correction {
                    message: format!("invalid response body: {}", e),
                })?;

        parse_response(body)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    // resolve_api_key tests touch the process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    #[test]
    fn resolve_api_key_prefers_environment() {
        let _lock = ENV_LOCK.lock().unwrap();
        set_env(defaults::API_KEY_ENV, "  env-key  ");

        let key = resolve_api_key(Path::new("/nonexistent/.gemini_key")).unwrap();
        assert_eq!(key, "env-key");

        remove_env(defaults::API_KEY_ENV);
    }

    #[test]
    fn resolve_api_key_reads_key_file() {
        let _lock = ENV_LOCK.lock().unwrap();
        remove_env(defaults::API_KEY_ENV);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "file-key").unwrap();

        let key = resolve_api_key(file.path()).unwrap();
        assert_eq!(key, "file-key");
    }

    #[test]
    fn resolve_api_key_missing_is_configuration_error() {
        let _lock = ENV_LOCK.lock().unwrap();
        remove_env(defaults::API_KEY_ENV);

        let result = resolve_api_key(Path::new("/nonexistent/.gemini_key"));
        match result {
            Err(e @ TalgreinirError::ApiKeyMissing { .. }) => {
                assert!(e.is_configuration());
            }
            other => panic!("expected ApiKeyMissing, got {:?}", other),
        }
    }

    #[test]
    fn resolve_api_key_empty_file_is_missing() {
        let _lock = ENV_LOCK.lock().unwrap();
        remove_env(defaults::API_KEY_ENV);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "   ").unwrap();

        assert!(matches!(
            resolve_api_key(file.path()),
            Err(TalgreinirError::ApiKeyMissing { .. })
        ));
    }

    #[test]
    fn prompt_contains_instructions_and_input() {
        let prompt = build_prompt("halló heimur");
        assert!(prompt.contains("Icelandic language expert"));
        assert!(prompt.contains("Do NOT add or remove sentences"));
        assert!(prompt.ends_with("halló heimur"));
    }

    #[test]
    fn request_is_deterministic_and_permissively_gated() {
        let request = build_request("texti");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["generationConfig"]["temperature"], 0.0);
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 16384);

        let settings = json["safetySettings"].as_array().unwrap();
        assert_eq!(settings.len(), 4);
        for setting in settings {
            assert_eq!(setting["threshold"], "BLOCK_NONE");
        }
    }

    #[test]
    fn request_schema_requires_all_three_fields() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(
            required,
            vec!["corrected_text", "confidence", "changes_summary"]
        );
    }

    fn wrap_payload(payload: &str) -> GenerateResponse {
        serde_json::from_value(serde_json::json!({
            "candidates": [
                { "content": { "parts": [ { "text": payload } ] } }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn parse_response_extracts_structured_result() {
        let response = wrap_payload(
            r#"{"corrected_text": "Halló, heimur.", "confidence": 0.93, "changes_summary": "Bætti við kommu og punkti."}"#,
        );

        let result = parse_response(response).unwrap();
        assert_eq!(result.corrected_text, "Halló, heimur.");
        assert_eq!(result.confidence, 0.93);
        assert_eq!(result.changes_summary, "Bætti við kommu og punkti.");
    }

    #[test]
    fn parse_response_rejects_empty_candidates() {
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            parse_response(response),
            Err(TalgreinirError::Correction { .. })
        ));
    }

    #[test]
    fn parse_response_rejects_non_json_payload() {
        let response = wrap_payload("this is not json");
        assert!(matches!(
            parse_response(response),
            Err(TalgreinirError::Correction { .. })
        ));
    }

    #[test]
    fn parse_response_rejects_out_of_range_confidence() {
        let response = wrap_payload(
            r#"{"corrected_text": "Texti.", "confidence": 1.5, "changes_summary": ""}"#,
        );
        assert!(matches!(
            parse_response(response),
            Err(TalgreinirError::ConfidenceOutOfRange { value }) if value == 1.5
        ));
    }

    #[test]
    fn corrector_name_is_the_model() {
        let corrector = GeminiCorrector::new("key".to_string(), "gemini-2.5-flash").unwrap();
        assert_eq!(corrector.name(), "gemini-2.5-flash");
    }

    #[test]
    fn base_url_override_strips_trailing_slash() {
        let corrector = GeminiCorrector::new("key".to_string(), "gemini-2.5-flash")
            .unwrap()
            .with_base_url("http://localhost:8080/");
        assert_eq!(corrector.base_url, "http://localhost:8080");
    }
}
