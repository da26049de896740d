//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

/// Environment variable consulted when a service has no `api_key` configured.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

// ---------------------------------------------------------------------------
// TranscriptionConfig
// ---------------------------------------------------------------------------

/// Settings for the speech-to-text service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Base URL of an OpenAI-compatible API (`/v1/audio/transcriptions`).
    pub base_url: String,
    /// API key; `None` falls back to `OPENAI_API_KEY`.
    pub api_key: Option<String>,
    /// Transcription model identifier.
    pub model: String,
    /// Largest accepted upload in bytes.
    pub max_upload_bytes: usize,
    /// Maximum seconds to wait for a transcription response.
    pub timeout_secs: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            api_key: None,
            model: "whisper-1".into(),
            max_upload_bytes: 25 * 1024 * 1024,
            timeout_secs: 120,
        }
    }
}

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the blog-post generation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API (`/v1/chat/completions`).
    ///
    /// - Ollama: `http://localhost:11434`
    /// - OpenAI: `https://api.openai.com`
    pub base_url: String,
    /// API key; `None` falls back to `OPENAI_API_KEY`, and is omitted
    /// entirely for local providers.
    pub api_key: Option<String>,
    /// Model identifier sent to the API.
    pub model: String,
    /// Sampling temperature (0.0 – 1.0).
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Maximum seconds to wait for a response before timing out.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            api_key: None,
            model: "gpt-4o".into(),
            temperature: 0.7,
            max_tokens: 4096,
            timeout_secs: 120,
        }
    }
}

// ---------------------------------------------------------------------------
// ImageConfig
// ---------------------------------------------------------------------------

/// Settings for the illustration step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Base URL of an OpenAI-compatible API (`/v1/images/generations`).
    pub base_url: String,
    /// API key; `None` falls back to `OPENAI_API_KEY`.
    pub api_key: Option<String>,
    /// Image model identifier.
    pub model: String,
    /// Requested size, e.g. `"1536x1024"` for a landscape aspect ratio.
    pub size: String,
    /// Requested quality tier.
    pub quality: String,
    /// Pause between sequential image requests in one batch.
    pub request_delay_ms: u64,
    /// Maximum seconds to wait for a single image.
    pub timeout_secs: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            api_key: None,
            model: "gpt-image-1".into(),
            size: "1536x1024".into(),
            quality: "high".into(),
            request_delay_ms: 1_000,
            timeout_secs: 180,
        }
    }
}

// ---------------------------------------------------------------------------
// OutputConfig
// ---------------------------------------------------------------------------

/// Where exported posts are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Export directory; `None` means the platform documents folder.
    pub directory: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { directory: None }
    }
}

impl OutputConfig {
    /// The configured directory, or the platform default.
    pub fn resolve_dir(&self) -> PathBuf {
        self.directory
            .clone()
            .unwrap_or_else(|| AppPaths::new().output_dir)
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use voice_to_post::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Speech-to-text service settings.
    pub transcription: TranscriptionConfig,
    /// Blog-post generation settings.
    pub llm: LlmConfig,
    /// Illustration settings.
    pub image: ImageConfig,
    /// Export settings.
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Fill every unset (or empty) service `api_key` with `key`.
    pub fn apply_api_key(&mut self, key: &str) {
        if key.is_empty() {
            return;
        }
        for slot in [
            &mut self.transcription.api_key,
            &mut self.llm.api_key,
            &mut self.image.api_key,
        ] {
            if slot.as_deref().map_or(true, str::is_empty) {
                *slot = Some(key.to_string());
            }
        }
    }

    /// Apply [`API_KEY_ENV`] if it is set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            self.apply_api_key(&key);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
