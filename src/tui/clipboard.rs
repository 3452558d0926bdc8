//! Copy a feed entry's link to the system clipboard
//!
//! A new `arboard` handle is opened per call; nothing is held between copies.

use anyhow::{Context, Result};
use arboard::Clipboard;

/// Put `text` on the system clipboard
///
/// Fails on headless hosts without a display server.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().context("Clipboard unavailable")?;
    clipboard
        .set_text(text)
        .context("Failed to copy link to clipboard")?;
    Ok(())
}
