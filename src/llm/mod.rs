//! Blog-post generation module for Voice-to-Post.
//!
//! This module provides:
//! * [`PostGenerator`]: async trait implemented by all generation backends.
//! * [`ApiPostGenerator`]: OpenAI-compatible REST API backend.
//! * [`PromptBuilder`]: style guide + transcript → chat messages.
//! * [`clean_generated_html`] / [`extract_title`]: output post-processing.
//! * [`LlmError`]: error variants for LLM operations.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use voice_to_post::config::AppConfig;
//! use voice_to_post::llm::{extract_title, ApiPostGenerator, PostGenerator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let generator = ApiPostGenerator::from_config(&config.llm);
//!
//!     let html = generator.generate("so I was thinking about mornings").await.unwrap();
//!     println!("{:?}", extract_title(&html));
//! }
//! ```

pub mod cleanup;
pub mod generator;
pub mod prompt;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use cleanup::{clean_generated_html, extract_title};
pub use generator::{ApiPostGenerator, LlmError, PostGenerator};
pub use prompt::PromptBuilder;

#[cfg(test)]
pub use generator::MockPostGenerator;
