use crate::error::ClipboardError;

/// Destination for click-to-copy text
pub trait Clipboard: Send {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}
