//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\voice-to-post\
//!   macOS:   ~/Library/Application Support/voice-to-post/
//!   Linux:   ~/.config/voice-to-post/
//!
//! Output dir (exported posts):
//!   Windows: %USERPROFILE%\Documents\voice-to-post\
//!   macOS:   ~/Documents/voice-to-post/
//!   Linux:   ~/Documents/voice-to-post/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Default directory for exported HTML posts.
    pub output_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "voice-to-post";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let output_dir = dirs::document_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");

        Self {
            config_dir,
            settings_file,
            output_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
