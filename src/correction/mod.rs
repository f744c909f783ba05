//! LLM-based punctuation and grammar correction.

pub mod corrector;
pub mod gemini;
