//! Terminal clipboard via OSC 52
//!
//! Most modern terminals (and tmux with `set-clipboard on`) accept the
//! OSC 52 escape and place its base64 payload on the system clipboard.

use anyhow::{Result, Context};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use std::io::Write;

/// Escape sequence that sets the clipboard to `text`
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", BASE64.encode(text.as_bytes()))
}

/// Write the clipboard sequence to the given terminal stream
pub fn copy_to<W: Write>(out: &mut W, text: &str) -> Result<()> {
    out.write_all(osc52_sequence(text).as_bytes())
        .context("Failed to write clipboard sequence")?;
    out.flush().context("Failed to flush terminal")?;
    Ok(())
}

/// Place `text` on the clipboard of the controlling terminal
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    copy_to(&mut lock, text)
}
