//! # Insight Narrative
//!
//! Answer generation for classified questions:
//!
//! - Canned answers for help and glossary definitions
//! - Per-intent data summaries and prompts
//! - A Gemini-backed text completion client
//! - The narrator that ties prompts and completions together

pub mod canned;
pub mod error;
pub mod gemini;
pub mod narrator;
pub mod prompt;

pub use canned::{definition_answer, HELP_TEXT};
pub use error::{NarrativeError, Result};
pub use gemini::{GeminiClient, TextCompletion};
pub use narrator::{LlmNarrator, NarrativeGenerator};
pub use prompt::{format_money, DataPrompt, PromptBuilder, PromptPlan, DEFAULT_PREAMBLE};
