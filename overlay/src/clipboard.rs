use actnotes_core::{Clipboard, ClipboardError};

/// System clipboard. A fresh handle per copy, so nothing platform-bound is
/// held across threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArboardClipboard;

impl Clipboard for ArboardClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        arboard::Clipboard::new()
            .and_then(|mut cb| cb.set_text(text.to_string()))
            .map_err(|e| ClipboardError(e.to_string()))
    }
}
