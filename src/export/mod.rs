//! Delivery of the assembled post: HTML file download and clipboard copy.

pub mod clipboard;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::error::WizardError;

pub use clipboard::copy_html;

/// Filename used when the title yields nothing usable.
pub const FALLBACK_FILE_NAME: &str = "blog-post.html";

/// Errors from exporting the final HTML.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("clipboard unavailable: {0}")]
    ClipboardAccess(String),

    #[error("failed to set clipboard: {0}")]
    ClipboardSet(String),
}

/// Download filename for a post titled `title`.
///
/// Every non-alphanumeric ASCII character becomes `-`, the rest is
/// lowercased.
///
/// ```
/// use voice_to_post::export::file_name;
///
/// assert_eq!(file_name("Morning Light!"), "morning-light-.html");
/// assert_eq!(file_name("   "), "blog-post.html");
/// ```
pub fn file_name(title: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        return FALLBACK_FILE_NAME.to_string();
    }

    let slug: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    format!("{slug}.html")
}

/// Write `html` to `dir/<file_name(title)>`, creating `dir` if needed.
///
/// Returns the path written.
pub fn write_html(dir: &Path, title: &str, html: &str) -> Result<PathBuf, ExportError> {
    require_html(html)?;

    fs::create_dir_all(dir).map_err(|source| ExportError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(file_name(title));
    fs::write(&path, html).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;

    log::info!("export: wrote {}", path.display());
    Ok(path)
}

fn require_html(html: &str) -> Result<(), ExportError> {
    if html.trim().is_empty() {
        return Err(WizardError::MissingInput("No post to export").into());
    }
    Ok(())
}
