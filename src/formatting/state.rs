//! Formatting state at the caret, for toolbar state reflection.

use super::apply::{parse_style, TEXT_BLOCKS};
use super::command::Alignment;
use super::elements::{ancestors_at, attribute_value, innermost_named, scan_elements};
use crate::string_utils::snap_forward_out_of_tag;

/// Current formatting state at a caret position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattingState {
    pub is_bold: bool,
    pub is_italic: bool,
    pub is_underline: bool,
    pub is_strikethrough: bool,
    pub is_inline_code: bool,
    pub is_subscript: bool,
    pub is_superscript: bool,
    pub is_link: bool,
    pub is_code_block: bool,
    pub is_blockquote: bool,
    /// Current heading level (None if not in heading)
    pub heading_level: Option<u8>,
    pub is_bullet_list: bool,
    pub is_numbered_list: bool,
    /// Alignment of the innermost block, if set explicitly
    pub alignment: Option<Alignment>,
    /// Nearest explicit text color
    pub foreground_color: Option<String>,
    /// Nearest explicit highlight color
    pub highlight_color: Option<String>,
    /// Nearest explicit font size
    pub font_size: Option<String>,
}

/// Detect the formatting state at a caret position in the markup.
pub fn detect_formatting_state(html: &str, caret: usize) -> FormattingState {
    let caret = snap_forward_out_of_tag(html, caret.min(html.len()));
    let elements = scan_elements(html);
    let len = html.len();
    let mut state = FormattingState::default();

    let ancestors = ancestors_at(&elements, caret, len);
    for &idx in &ancestors {
        let element = &elements[idx];
        match element.name.as_str() {
            "strong" | "b" => state.is_bold = true,
            "em" | "i" => state.is_italic = true,
            "u" => state.is_underline = true,
            "s" | "strike" | "del" => state.is_strikethrough = true,
            "code" => state.is_inline_code = true,
            "sub" => state.is_subscript = true,
            "sup" => state.is_superscript = true,
            "a" => state.is_link = true,
            "pre" => state.is_code_block = true,
            "blockquote" => state.is_blockquote = true,
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                state.heading_level = element.name[1..].parse().ok();
            }
            // Innermost list wins
            "ul" => {
                state.is_bullet_list = true;
                state.is_numbered_list = false;
            }
            "ol" => {
                state.is_numbered_list = true;
                state.is_bullet_list = false;
            }
            _ => {}
        }

        // Ancestors are outermost first, so inner spans overwrite outer ones
        if let Some(style) = attribute_value(element.open_tag(html), "style") {
            for (prop, value) in parse_style(&style) {
                match prop.as_str() {
                    "color" => state.foreground_color = Some(value),
                    "background-color" => state.highlight_color = Some(value),
                    "font-size" => state.font_size = Some(value),
                    _ => {}
                }
            }
        }
    }

    if let Some(block) = innermost_named(&elements, caret, len, TEXT_BLOCKS) {
        state.alignment = attribute_value(elements[block].open_tag(html), "style")
            .and_then(|style| {
                parse_style(&style)
                    .into_iter()
                    .find(|(prop, _)| prop == "text-align")
                    .and_then(|(_, value)| Alignment::from_css(&value))
            });
    }

    state
}
