//! Clipboard copy of the finished post, backed by the `arboard` crate.
//!
//! A short-lived [`arboard::Clipboard`] handle is created per call;
//! `arboard::Clipboard` is not `Send` on all platforms.

use arboard::Clipboard;

use super::{require_html, ExportError};

/// Place `html` on the system clipboard as plain text.
///
/// # Errors
///
/// [`ExportError::Wizard`] for an empty post, [`ExportError::ClipboardAccess`]
/// if the OS clipboard cannot be opened, [`ExportError::ClipboardSet`] if
/// writing fails.
pub fn copy_html(html: &str) -> Result<(), ExportError> {
    require_html(html)?;

    let mut clipboard =
        Clipboard::new().map_err(|e| ExportError::ClipboardAccess(e.to_string()))?;
    clipboard
        .set_text(html)
        .map_err(|e| ExportError::ClipboardSet(e.to_string()))?;

    log::info!("export: copied {} bytes of HTML to clipboard", html.len());
    Ok(())
}
