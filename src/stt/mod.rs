//! Speech-to-text engine interface and implementations.

pub mod engine;
pub mod whisper;
