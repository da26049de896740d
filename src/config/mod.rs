//! Configuration module for Voice-to-Post.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each external
//! service, `AppPaths` for cross-platform directories, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, ImageConfig, LlmConfig, OutputConfig, TranscriptionConfig};
