//! Illustration module.
//!
//! * [`ImageGenerator`]: async trait, one base64 image per excerpt.
//! * [`ApiImageGenerator`]: OpenAI-compatible `/v1/images/generations` backend.
//! * [`section_excerpts`]: post HTML → one excerpt per image position.

pub mod generator;
pub mod sections;

pub use generator::{illustration_prompt, ApiImageGenerator, ImageError, ImageGenerator};
pub use sections::{excerpt_for, plain_text, section_excerpts};

#[cfg(test)]
pub use generator::MockImageGenerator;
