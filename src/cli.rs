//! Command-line arguments for the headless wizard run.
//!
//! Priority resolution: CLI args > config file > platform defaults.

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::config::{AppConfig, AppPaths};

/// Turn a voice note (or a plain-text transcript) into an illustrated blog post.
#[derive(Parser, Debug)]
#[command(name = "voice-to-post", version, about)]
pub struct CliArgs {
    /// Audio file (mp3, wav, webm, m4a, mp4, ogg, flac) or `.txt` transcript.
    pub input: PathBuf,

    /// Directory the finished HTML is written to.
    pub output_dir: Option<PathBuf>,

    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Also copy the finished HTML to the clipboard.
    #[arg(long = "copy")]
    pub copy: bool,
}

impl CliArgs {
    /// Priority: --config flag > platform `settings.toml`.
    pub fn resolve_config_path(&self) -> PathBuf {
        match &self.config {
            Some(path) => path.clone(),
            None => AppPaths::new().settings_file,
        }
    }

    /// Priority: positional argument > `[output] directory` > documents dir.
    pub fn resolve_output_dir(&self, config: &AppConfig) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => config.output.resolve_dir(),
        }
    }

    /// Name of the input file as sent with the upload.
    pub fn input_file_name(&self) -> String {
        self.input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// MIME type implied by `path`'s extension; empty when unknown.
pub fn guess_mime(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "webm" => "audio/webm",
        "m4a" => "audio/m4a",
        "mp4" => "audio/mp4",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "txt" => "text/plain",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positional_arguments() {
        let args = CliArgs::parse_from(["voice-to-post", "note.m4a", "out"]);
        assert_eq!(args.input, PathBuf::from("note.m4a"));
        assert_eq!(args.output_dir, Some(PathBuf::from("out")));
        assert!(!args.copy);
        assert_eq!(args.input_file_name(), "note.m4a");
    }

    #[test]
    fn output_dir_falls_back_to_config() {
        let args = CliArgs::parse_from(["voice-to-post", "note.txt"]);
        let mut config = AppConfig::default();
        config.output.directory = Some(PathBuf::from("/tmp/posts"));
        assert_eq!(args.resolve_output_dir(&config), PathBuf::from("/tmp/posts"));
    }

    #[test]
    fn config_flag_wins() {
        let args = CliArgs::parse_from(["voice-to-post", "-c", "my.toml", "note.txt", "--copy"]);
        assert_eq!(args.resolve_config_path(), PathBuf::from("my.toml"));
        assert!(args.copy);
    }

    #[test]
    fn guesses_mime_from_extension() {
        assert_eq!(guess_mime(Path::new("a/b/Note.MP3")), "audio/mpeg");
        assert_eq!(guess_mime(Path::new("draft.txt")), "text/plain");
        assert_eq!(guess_mime(Path::new("noext")), "");
    }
}
