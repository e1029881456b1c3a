//! Payload sanitization for the XML update protocol.
//!
//! Solr rejects update messages containing ASCII control characters, so
//! every outgoing envelope is passed through [`sanitize`] before
//! transmission (callers that can guarantee clean input may opt out).
//! [`clean_xml_string`] is the stricter per-value filter used by the value
//! codec: it drops everything outside the character ranges the XML 1.0
//! specification allows.

use std::borrow::Cow;

/// Control bytes that are illegal in an XML document.
///
/// Tab (0x09), newline (0x0A) and carriage return (0x0D) are XML-legal and
/// are deliberately kept.
fn is_forbidden_ctrl(byte: u8) -> bool {
    matches!(byte, 0x00..=0x08 | 0x0B | 0x0C | 0x0E..=0x1F)
}

/// Strip forbidden ASCII control characters from a text payload.
///
/// Operates on the UTF-8 byte encoding; removing bytes below 0x20 can never
/// split a multi-byte sequence, so the result is decoded back without loss.
/// Clean input is returned unchanged (borrowed), which also makes the
/// function idempotent.
///
/// # Examples
///
/// ```
/// use solander::sanitize::sanitize;
///
/// assert_eq!(sanitize("hello\x00world"), "helloworld");
/// assert_eq!(sanitize("tabs\tand\nnewlines\r"), "tabs\tand\nnewlines\r");
/// ```
pub fn sanitize(text: &str) -> Cow<'_, str> {
    if !text.bytes().any(is_forbidden_ctrl) {
        return Cow::Borrowed(text);
    }

    let cleaned: Vec<u8> = text.bytes().filter(|b| !is_forbidden_ctrl(*b)).collect();
    let decoded = String::from_utf8(cleaned)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());
    Cow::Owned(decoded)
}

/// Whether a character may appear in an XML 1.0 document.
///
/// The standard defines a valid char as:
///
/// `Char ::= #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]`
pub fn is_valid_xml_char(c: char) -> bool {
    let i = c as u32;
    // conditions ordered by presumed frequency
    (0x20..=0xD7FF).contains(&i)
        || i == 0x09
        || i == 0x0A
        || i == 0x0D
        || (0xE000..=0xFFFD).contains(&i)
        || (0x10000..=0x10FFFF).contains(&i)
}

/// Drop every character that is not XML-legal.
///
/// Characters are removed, not escaped: there is no XML representation for
/// them at all.
pub fn clean_xml_string(s: &str) -> String {
    s.chars().filter(|c| is_valid_xml_char(*c)).collect()
}
