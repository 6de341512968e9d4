//! Assisted fill - LLM-backed suggestions for the quote form
//!
//! This crate turns a free-text object description into a suggested set of
//! project labels and sections:
//! - Builds a prompt that pins every allowed value (`prompt`)
//! - Sends it to a completion backend (`llm`, `gemini`)
//! - Parses and normalizes the reply against the catalog (`suggestions`)
//!
//! # Safety Principle
//!
//! The model only pre-fills the form. It never prices anything: every number
//! a user sees comes from the deterministic engine in `docquote-core`, and an
//! advisory failure never blocks or alters a calculation.

pub mod gemini;
pub mod llm;
pub mod prompt;
pub mod runtime;
pub mod suggestions;

pub use gemini::GeminiClient;
pub use llm::{AdvisoryError, LlmClient};
pub use runtime::AssistedFill;
pub use suggestions::{SuggestedSection, Suggestion};
