//! Text extraction for note HTML fragments.
//!
//! Notes are short fragments (`<b>`, `<a>`, entities). Tags are read with
//! quick-xml without end-name checking, so HTML void elements like `<br>`
//! and loosely nested markup pass.

use quick_xml::Reader;
use quick_xml::escape::unescape_with;
use quick_xml::events::Event;

use crate::error::RenderError;

/// Literal text of an HTML fragment: tags removed, entities decoded.
///
/// Fails on an unterminated tag (`<` with no closing `>`).
pub fn text_content(id: &str, fragment: &str) -> Result<String, RenderError> {
    let mut reader = Reader::from_str(fragment);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    let mut text = String::with_capacity(fragment.len());

    loop {
        let offset = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Text(raw)) => push_unescaped(&mut text, &String::from_utf8_lossy(&raw)),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(quick_xml::Error::Syntax(_)) => {
                return Err(RenderError::UnterminatedTag {
                    id: id.to_string(),
                    offset,
                });
            }
            Err(e) => {
                return Err(RenderError::Malformed {
                    id: id.to_string(),
                    offset,
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(text)
}

/// Append `raw` with entities decoded. Text with a bare `&` or an unknown
/// entity is kept literally.
fn push_unescaped(out: &mut String, raw: &str) {
    match unescape_with(raw, html_entity) {
        Ok(decoded) => out.push_str(&decoded),
        Err(_) => out.push_str(raw),
    }
}

/// HTML entities beyond the XML predefined ones
fn html_entity(name: &str) -> Option<&'static str> {
    match name {
        "nbsp" => Some("\u{a0}"),
        _ => None,
    }
}
