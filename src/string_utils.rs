//! UTF-8 and Markup Safe String Utilities
//!
//! Offsets handed to the engine (selections, carets) are byte positions into
//! the serialized markup. They may come from a host that counts differently,
//! so every slice goes through these helpers first:
//!
//! - `floor_char_boundary()` / `ceil_char_boundary()` adjust an index onto a
//!   UTF-8 character boundary.
//! - `snap_forward_out_of_tag()` / `snap_backward_out_of_tag()` move an index
//!   that falls inside `<...>` to the nearest position outside the tag.
//!
//! # Example
//! ```ignore
//! use crate::string_utils::{safe_slice, snap_forward_out_of_tag};
//!
//! let html = "<p>Hei på deg</p>";
//! let start = snap_forward_out_of_tag(html, 1); // 3, just after "<p>"
//! let text = safe_slice(html, start, 13);       // "Hei på deg"
//! ```

// ─────────────────────────────────────────────────────────────────────────────
// Character Boundary Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Returns the largest index that is less than or equal to `index`
/// and is on a UTF-8 character boundary.
///
/// If `index` is greater than the string length, returns the string length.
#[inline]
pub fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let bytes = s.as_bytes();
    let mut i = index;
    while i > 0 && !is_utf8_char_start(bytes[i]) {
        i -= 1;
    }
    i
}

/// Returns the smallest index that is greater than or equal to `index`
/// and is on a UTF-8 character boundary.
#[inline]
pub fn ceil_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let bytes = s.as_bytes();
    let mut i = index;
    while i < bytes.len() && !is_utf8_char_start(bytes[i]) {
        i += 1;
    }
    i
}

/// A byte is a char start if it's NOT a continuation byte (10xxxxxx).
#[inline]
fn is_utf8_char_start(byte: u8) -> bool {
    (byte & 0b11000000) != 0b10000000
}

/// Safely slice a string from `start` to `end`, adjusting indices to
/// valid UTF-8 character boundaries.
///
/// If `start >= end` after adjustment, returns an empty string.
#[inline]
pub fn safe_slice(s: &str, start: usize, end: usize) -> &str {
    let start = floor_char_boundary(s, start);
    let end = ceil_char_boundary(s, end);

    if start >= end {
        return "";
    }

    &s[start..end]
}

// ─────────────────────────────────────────────────────────────────────────────
// Tag Boundary Functions
// ─────────────────────────────────────────────────────────────────────────────

/// If `index` lies strictly inside a tag, returns the start of that tag
/// (the position of its `<`).
fn enclosing_tag_start(s: &str, index: usize) -> Option<usize> {
    let before = &s[..index];
    let open = before.rfind('<')?;
    match before.rfind('>') {
        Some(close) if close > open => None,
        _ => {
            // Only treat it as a tag when it actually closes later on.
            s[index..].find('>').map(|_| open)
        }
    }
}

/// Move `index` forward past the end of the tag it falls inside of.
///
/// Indices already outside a tag are only adjusted to a char boundary.
pub fn snap_forward_out_of_tag(s: &str, index: usize) -> usize {
    let index = ceil_char_boundary(s, index);
    match enclosing_tag_start(s, index) {
        Some(_) => s[index..]
            .find('>')
            .map(|offset| index + offset + 1)
            .unwrap_or(s.len()),
        None => index,
    }
}

/// Move `index` backward to the `<` of the tag it falls inside of.
pub fn snap_backward_out_of_tag(s: &str, index: usize) -> usize {
    let index = floor_char_boundary(s, index);
    enclosing_tag_start(s, index).unwrap_or(index)
}

// ─────────────────────────────────────────────────────────────────────────────
// Escaping
// ─────────────────────────────────────────────────────────────────────────────

/// Escape text for use in element content or a quoted attribute value.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Strip every tag from `s`, leaving only text content.
///
/// Entities are left encoded.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_norwegian() {
        let s = "Hei på deg"; // 'å' at byte 5-6 (2 bytes)
        assert_eq!(floor_char_boundary(s, 5), 5);
        assert_eq!(floor_char_boundary(s, 6), 5);
        assert_eq!(floor_char_boundary(s, 7), 7);
        assert_eq!(floor_char_boundary(s, 100), s.len());
    }

    #[test]
    fn test_ceil_chinese() {
        let s = "你好"; // Each char is 3 bytes
        assert_eq!(ceil_char_boundary(s, 0), 0);
        assert_eq!(ceil_char_boundary(s, 1), 3);
        assert_eq!(ceil_char_boundary(s, 3), 3);
    }

    #[test]
    fn test_safe_slice_emoji() {
        let s = "Hi🎉Bye";
        assert_eq!(safe_slice(s, 2, 6), "🎉");
        assert_eq!(safe_slice(s, 3, 2), "");
    }

    #[test]
    fn test_snap_forward_inside_tag() {
        let html = "<p class=\"x\">Hello</p>";
        assert_eq!(snap_forward_out_of_tag(html, 1), 13);
        assert_eq!(snap_forward_out_of_tag(html, 13), 13);
        assert_eq!(snap_forward_out_of_tag(html, 0), 0);
    }

    #[test]
    fn test_snap_backward_inside_tag() {
        let html = "<p>Hello</p>";
        assert_eq!(snap_backward_out_of_tag(html, 10), 8);
        assert_eq!(snap_backward_out_of_tag(html, 8), 8);
        assert_eq!(snap_backward_out_of_tag(html, 5), 5);
    }

    #[test]
    fn test_snap_ignores_stray_angle_bracket() {
        // "a < b" in text has no closing '>' afterwards
        let html = "a < b";
        assert_eq!(snap_forward_out_of_tag(html, 3), 3);
        assert_eq!(snap_backward_out_of_tag(html, 3), 3);
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>Hello <strong>world</strong></p>"), "Hello world");
        assert_eq!(strip_tags("plain"), "plain");
    }

    #[test]
    fn test_no_panic_on_any_index() {
        let s = "<p>Hei på 你好 🎉</p>";
        for i in 0..=s.len() + 3 {
            let f = snap_forward_out_of_tag(s, i);
            let b = snap_backward_out_of_tag(s, i);
            let _ = &s[..f];
            let _ = &s[..b];
        }
    }
}
