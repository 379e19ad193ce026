//! Lightweight element scanner for the visual view's markup.
//!
//! This is not an HTML parser. It walks tags in document order, pairs
//! open and close tags with a stack, and records byte ranges so that
//! formatting operations can rewrite tags in place without reserializing
//! the rest of the document. Unknown or malformed markup is tolerated:
//! stray close tags are ignored and unclosed elements extend to the end
//! of the document.

use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

/// Elements that never have content or a close tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// A matched element in the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercased tag name
    pub name: String,
    /// Byte range of the open tag, including `<` and `>`
    pub open: Range<usize>,
    /// Byte range of the close tag; `None` when the element is never closed
    pub close: Option<Range<usize>>,
    /// Index of the parent element in the scan output
    pub parent: Option<usize>,
}

impl Element {
    /// Range between the open and close tags.
    pub fn content_range(&self, doc_len: usize) -> Range<usize> {
        let end = self.close.as_ref().map_or(doc_len, |c| c.start);
        self.open.end..end
    }

    /// Range from the start of the open tag to the end of the close tag.
    pub fn outer_range(&self, doc_len: usize) -> Range<usize> {
        let end = self.close.as_ref().map_or(doc_len, |c| c.end);
        self.open.start..end
    }

    /// Whether `pos` falls within the element's content (boundaries inclusive).
    pub fn contains(&self, pos: usize, doc_len: usize) -> bool {
        let content = self.content_range(doc_len);
        !self.is_void() && content.start <= pos && pos <= content.end
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name.as_str())
    }

    /// Text of the open tag.
    pub fn open_tag<'a>(&self, html: &'a str) -> &'a str {
        &html[self.open.clone()]
    }
}

struct Tag {
    name: String,
    range: Range<usize>,
    closing: bool,
    self_closing: bool,
}

/// Find the next tag at or after `from`.
fn next_tag(html: &str, from: usize) -> Option<Tag> {
    let bytes = html.as_bytes();
    let mut pos = from;

    loop {
        let lt = pos + html.get(pos..)?.find('<')?;

        // Comments are skipped whole
        if html[lt..].starts_with("<!--") {
            pos = lt + html[lt..].find("-->")? + 3;
            continue;
        }

        let closing = bytes.get(lt + 1) == Some(&b'/');
        let name_start = if closing { lt + 2 } else { lt + 1 };
        let name_len = html[name_start..]
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'-')
            .count();

        if name_len == 0 || !bytes[name_start].is_ascii_alphabetic() {
            pos = lt + 1;
            continue;
        }

        // Scan to the closing '>' while respecting quoted attribute values
        let mut i = name_start + name_len;
        let mut quote: Option<u8> = None;
        while i < bytes.len() {
            match (quote, bytes[i]) {
                (Some(q), b) if b == q => quote = None,
                (Some(_), _) => {}
                (None, b'"') | (None, b'\'') => quote = Some(bytes[i]),
                (None, b'>') => break,
                _ => {}
            }
            i += 1;
        }
        if i >= bytes.len() {
            return None;
        }

        return Some(Tag {
            name: html[name_start..name_start + name_len].to_ascii_lowercase(),
            range: lt..i + 1,
            closing,
            self_closing: !closing && bytes[i - 1] == b'/',
        });
    }
}

/// Scan all elements in document order.
pub fn scan_elements(html: &str) -> Vec<Element> {
    let mut elements: Vec<Element> = Vec::new();
    let mut stack: Vec<usize> = Vec::new();
    let mut pos = 0;

    while let Some(tag) = next_tag(html, pos) {
        pos = tag.range.end;

        if tag.closing {
            if let Some(depth) = stack.iter().rposition(|&i| elements[i].name == tag.name) {
                // Anything still open inside is implicitly closed here
                for &inner in &stack[depth + 1..] {
                    elements[inner].close = Some(tag.range.start..tag.range.start);
                }
                elements[stack[depth]].close = Some(tag.range);
                stack.truncate(depth);
            }
            continue;
        }

        let is_void = tag.self_closing || VOID_ELEMENTS.contains(&tag.name.as_str());
        let end = tag.range.end;
        elements.push(Element {
            name: tag.name,
            open: tag.range,
            close: if is_void { Some(end..end) } else { None },
            parent: stack.last().copied(),
        });
        if !is_void {
            stack.push(elements.len() - 1);
        }
    }

    elements
}

/// Indices of the elements enclosing `pos`, outermost first.
pub fn ancestors_at(elements: &[Element], pos: usize, doc_len: usize) -> Vec<usize> {
    let mut ancestors: Vec<usize> = (0..elements.len())
        .filter(|&i| elements[i].contains(pos, doc_len))
        .collect();
    ancestors.sort_by_key(|&i| elements[i].open.start);
    ancestors
}

/// Innermost element enclosing `pos` whose name is in `names`.
pub fn innermost_named(
    elements: &[Element],
    pos: usize,
    doc_len: usize,
    names: &[&str],
) -> Option<usize> {
    ancestors_at(elements, pos, doc_len)
        .into_iter()
        .rev()
        .find(|&i| names.contains(&elements[i].name.as_str()))
}

/// One `name=value` attribute with a double-quoted, single-quoted or bare
/// value.
const ATTRIBUTE_PATTERN: &str =
    r#"\s([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>/]+))"#;

static ATTRIBUTE: OnceLock<Option<Regex>> = OnceLock::new();

fn attribute_regex() -> Option<&'static Regex> {
    ATTRIBUTE
        .get_or_init(|| Regex::new(ATTRIBUTE_PATTERN).ok())
        .as_ref()
}

/// Read an attribute value from an open tag.
///
/// Attribute names match case-insensitively. Quoted and unquoted values
/// are both accepted.
pub fn attribute_value(open_tag: &str, attr: &str) -> Option<String> {
    attribute_regex()?
        .captures_iter(open_tag)
        .find(|caps| caps[1].eq_ignore_ascii_case(attr))
        .and_then(|caps| (2..=4).find_map(|group| caps.get(group)))
        .map(|m| m.as_str().to_string())
}
