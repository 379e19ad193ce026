//! Formatting command vocabulary.
//!
//! Every toolbar action the visual view understands is a variant of
//! [`FormatCommand`]. There is no string-keyed dispatch: an unsupported
//! command cannot be expressed.

/// Text alignment applied to the block containing the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// CSS keyword for `text-align`.
    pub fn css_value(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }

    /// Parse a CSS `text-align` keyword.
    pub fn from_css(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" => Some(Alignment::Right),
            "justify" => Some(Alignment::Justify),
            _ => None,
        }
    }
}

/// Formatting commands that can be dispatched to the visual view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatCommand {
    /// Bold text (`<strong>`)
    Bold,
    /// Italic text (`<em>`)
    Italic,
    /// Underlined text (`<u>`)
    Underline,
    /// Strikethrough (`<s>`)
    Strikethrough,
    /// Inline code (`<code>`)
    InlineCode,
    /// Subscript (`<sub>`)
    Subscript,
    /// Superscript (`<sup>`)
    Superscript,
    /// Heading level 1-6
    Heading(u8),
    /// Plain paragraph
    Paragraph,
    /// Blockquote
    Blockquote,
    /// Preformatted code block (`<pre>`)
    CodeBlock,
    /// Bullet list (`<ul>`)
    BulletList,
    /// Numbered list (`<ol>`)
    NumberedList,
    /// Block alignment
    Align(Alignment),
    /// Font size as a CSS length, e.g. `"18px"`
    FontSize(String),
    /// Text color as a CSS color
    ForegroundColor(String),
    /// Background highlight as a CSS color
    HighlightColor(String),
    /// Remove inline formatting from the selection
    ClearFormatting,
    /// Step back in the edit history
    Undo,
    /// Step forward in the edit history
    Redo,
}

impl FormatCommand {
    /// Whether this command walks the history instead of editing markup.
    pub fn is_history(&self) -> bool {
        matches!(self, FormatCommand::Undo | FormatCommand::Redo)
    }

    /// Get the keyboard shortcut label for this command.
    pub fn shortcut_label(&self) -> &'static str {
        match self {
            Self::Bold => "Ctrl+B",
            Self::Italic => "Ctrl+I",
            Self::Underline => "Ctrl+U",
            Self::Strikethrough => "Ctrl+Shift+S",
            Self::InlineCode => "Ctrl+`",
            Self::Subscript => "Ctrl+,",
            Self::Superscript => "Ctrl+.",
            Self::Heading(1) => "Ctrl+Alt+1",
            Self::Heading(2) => "Ctrl+Alt+2",
            Self::Heading(3) => "Ctrl+Alt+3",
            Self::Heading(4) => "Ctrl+Alt+4",
            Self::Heading(5) => "Ctrl+Alt+5",
            Self::Heading(6) => "Ctrl+Alt+6",
            Self::Heading(_) => "Ctrl+Alt+1-6",
            Self::Paragraph => "Ctrl+Alt+0",
            Self::Blockquote => "Ctrl+Shift+B",
            Self::CodeBlock => "Ctrl+Alt+C",
            Self::BulletList => "Ctrl+Shift+8",
            Self::NumberedList => "Ctrl+Shift+7",
            Self::Align(Alignment::Left) => "Ctrl+Shift+L",
            Self::Align(Alignment::Center) => "Ctrl+Shift+E",
            Self::Align(Alignment::Right) => "Ctrl+Shift+R",
            Self::Align(Alignment::Justify) => "Ctrl+Shift+J",
            Self::FontSize(_) | Self::ForegroundColor(_) | Self::HighlightColor(_) => "",
            Self::ClearFormatting => "Ctrl+\\",
            Self::Undo => "Ctrl+Z",
            Self::Redo => "Ctrl+Shift+Z",
        }
    }

    /// Get the display label for this command.
    pub fn label(&self) -> String {
        let name = match self {
            Self::Bold => "Bold",
            Self::Italic => "Italic",
            Self::Underline => "Underline",
            Self::Strikethrough => "Strikethrough",
            Self::InlineCode => "Inline Code",
            Self::Subscript => "Subscript",
            Self::Superscript => "Superscript",
            Self::Heading(n) => return format!("Heading {}", (*n).clamp(1, 6)),
            Self::Paragraph => "Paragraph",
            Self::Blockquote => "Quote",
            Self::CodeBlock => "Code Block",
            Self::BulletList => "Bullet List",
            Self::NumberedList => "Numbered List",
            Self::Align(Alignment::Left) => "Align Left",
            Self::Align(Alignment::Center) => "Align Center",
            Self::Align(Alignment::Right) => "Align Right",
            Self::Align(Alignment::Justify) => "Justify",
            Self::FontSize(size) => return format!("Font Size {}", size),
            Self::ForegroundColor(color) => return format!("Text Color {}", color),
            Self::HighlightColor(color) => return format!("Highlight {}", color),
            Self::ClearFormatting => "Clear Formatting",
            Self::Undo => "Undo",
            Self::Redo => "Redo",
        };
        name.to_string()
    }

    /// Parse a command from its name and optional argument, e.g. `"bold"`,
    /// `("h2", None)` or `("color", Some("#c00"))`.
    ///
    /// Returns `None` for unknown names and for commands missing a required
    /// argument.
    pub fn from_name(name: &str, arg: Option<&str>) -> Option<Self> {
        let arg = arg.map(str::trim).filter(|a| !a.is_empty());
        let command = match name.trim().to_ascii_lowercase().as_str() {
            "bold" => Self::Bold,
            "italic" => Self::Italic,
            "underline" => Self::Underline,
            "strike" | "strikethrough" => Self::Strikethrough,
            "code" => Self::InlineCode,
            "sub" | "subscript" => Self::Subscript,
            "sup" | "superscript" => Self::Superscript,
            "h1" => Self::Heading(1),
            "h2" => Self::Heading(2),
            "h3" => Self::Heading(3),
            "h4" => Self::Heading(4),
            "h5" => Self::Heading(5),
            "h6" => Self::Heading(6),
            "p" | "paragraph" => Self::Paragraph,
            "quote" | "blockquote" => Self::Blockquote,
            "pre" | "codeblock" => Self::CodeBlock,
            "ul" | "bullets" => Self::BulletList,
            "ol" | "numbers" => Self::NumberedList,
            "align" => Self::Align(Alignment::from_css(arg?)?),
            "size" => Self::FontSize(arg?.to_string()),
            "color" => Self::ForegroundColor(arg?.to_string()),
            "highlight" => Self::HighlightColor(arg?.to_string()),
            "clear" => Self::ClearFormatting,
            "undo" => Self::Undo,
            "redo" => Self::Redo,
            _ => return None,
        };
        Some(command)
    }

    /// Get the tooltip text for this command.
    pub fn tooltip(&self) -> String {
        let shortcut = self.shortcut_label();
        if shortcut.is_empty() {
            self.label()
        } else {
            format!("{} ({})", self.label(), shortcut)
        }
    }
}
