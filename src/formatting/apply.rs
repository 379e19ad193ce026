//! Markup Formatting Operations
//!
//! Applies a [`FormatCommand`] to the visual view's markup at a selection.
//! Every operation is a pure function of `(html, selection, command)` and
//! returns the rewritten markup together with the selection mapped into it.
//!
//! Toggles are reversible: when formatting is applied, the returned
//! selection covers the same text as before, so dispatching the same
//! command again with that selection removes it.
//!
//! # Usage
//! ```ignore
//! use crate::formatting::{apply_format, FormatCommand, Selection};
//!
//! let result = apply_format("<p>Hello world</p>", Selection::new(3, 8), &FormatCommand::Bold);
//! assert_eq!(result.html, "<p><strong>Hello</strong> world</p>");
//! ```

use super::command::{Alignment, FormatCommand};
use super::elements::{ancestors_at, attribute_value, innermost_named, scan_elements, Element};
use crate::string_utils::{
    ceil_char_boundary, floor_char_boundary, snap_backward_out_of_tag, snap_forward_out_of_tag,
};
use std::ops::Range;

// ─────────────────────────────────────────────────────────────────────────────
// Selection
// ─────────────────────────────────────────────────────────────────────────────

/// A range in the markup, measured in byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }

    /// Normalize so that `start <= end`.
    pub fn normalized(self) -> Self {
        if self.start <= self.end {
            self
        } else {
            Self::new(self.end, self.start)
        }
    }

    /// Clamp onto `html`: char boundaries, and both ends outside of tags.
    pub fn clamped_to(self, html: &str) -> Self {
        let sel = self.normalized();
        let start = floor_char_boundary(html, sel.start.min(html.len()));
        let end = ceil_char_boundary(html, sel.end.min(html.len()));
        let start = snap_forward_out_of_tag(html, start);
        let end = snap_backward_out_of_tag(html, end);
        if start > end {
            Self::caret(start)
        } else {
            Self::new(start, end)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Format Result
// ─────────────────────────────────────────────────────────────────────────────

/// Result of applying a formatting command.
#[derive(Debug, Clone)]
pub struct FormatResult {
    /// The markup after formatting
    pub html: String,
    /// Selection mapped into the new markup
    pub selection: Selection,
    /// Whether the formatting was applied (vs removed/toggled off)
    pub applied: bool,
}

impl FormatResult {
    fn new(html: String, selection: Selection) -> Self {
        Self {
            html,
            selection,
            applied: true,
        }
    }

    /// Markup left as-is.
    fn unchanged(html: &str, selection: Selection) -> Self {
        Self {
            html: html.to_string(),
            selection,
            applied: false,
        }
    }

    /// Mark that formatting was removed rather than applied.
    fn toggled_off(mut self) -> Self {
        self.applied = false;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Edits
// ─────────────────────────────────────────────────────────────────────────────

/// A replacement of one byte range of the markup.
struct Edit {
    range: Range<usize>,
    text: String,
}

impl Edit {
    fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }

    fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::replace(at..at, text)
    }

    fn delete(range: Range<usize>) -> Self {
        Self::replace(range, "")
    }
}

/// Apply non-overlapping edits and map the selection through them.
fn apply_edits(html: &str, mut edits: Vec<Edit>, selection: Selection) -> (String, Selection) {
    edits.sort_by_key(|e| (e.range.start, e.range.end));

    let mut out = String::with_capacity(html.len() + 32);
    let mut cursor = 0;
    for edit in &edits {
        out.push_str(&html[cursor..edit.range.start]);
        out.push_str(&edit.text);
        cursor = edit.range.end;
    }
    out.push_str(&html[cursor..]);

    let map = |pos: usize| -> usize {
        let mut shift: isize = 0;
        for edit in &edits {
            if edit.range.end <= pos {
                shift += edit.text.len() as isize - edit.range.len() as isize;
            } else if edit.range.start < pos {
                // Inside a replaced range: land after the replacement
                return (edit.range.start as isize + shift) as usize + edit.text.len();
            } else {
                break;
            }
        }
        (pos as isize + shift) as usize
    };

    let mapped = Selection::new(map(selection.start), map(selection.end));
    (out, mapped)
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatch
// ─────────────────────────────────────────────────────────────────────────────

/// Inline formatting element plus the legacy spellings it also recognizes.
struct InlineTag {
    tag: &'static str,
    aliases: &'static [&'static str],
}

impl InlineTag {
    fn names(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.tag).chain(self.aliases.iter().copied())
    }
}

const BOLD: InlineTag = InlineTag { tag: "strong", aliases: &["b"] };
const ITALIC: InlineTag = InlineTag { tag: "em", aliases: &["i"] };
const UNDERLINE: InlineTag = InlineTag { tag: "u", aliases: &[] };
const STRIKE: InlineTag = InlineTag { tag: "s", aliases: &["strike", "del"] };
const CODE: InlineTag = InlineTag { tag: "code", aliases: &[] };
const SUBSCRIPT: InlineTag = InlineTag { tag: "sub", aliases: &[] };
const SUPERSCRIPT: InlineTag = InlineTag { tag: "sup", aliases: &[] };

/// Elements an inline wrapper must never straddle.
const BLOCK_BOUNDARIES: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "div", "li", "blockquote", "td", "th", "ul",
    "ol", "table", "thead", "tbody", "tfoot", "tr", "hr",
];

/// Tags removed by `ClearFormatting`.
pub(crate) const INLINE_FORMATTING: &[&str] = &[
    "strong", "b", "em", "i", "u", "s", "strike", "del", "code", "sub", "sup", "span", "mark",
    "font",
];

/// Blocks that can be renamed in place.
const RETAGGABLE_BLOCKS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "div"];

/// Any block that owns its text, including containers.
pub(crate) const TEXT_BLOCKS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "div", "li", "blockquote", "td", "th",
];

/// Apply a formatting command to markup at a selection.
///
/// History commands (`Undo`/`Redo`) do not touch markup and return it
/// unchanged; the owning view handles them.
pub fn apply_format(html: &str, selection: Selection, command: &FormatCommand) -> FormatResult {
    let sel = selection.clamped_to(html);
    match command {
        FormatCommand::Bold => toggle_inline(html, sel, &BOLD),
        FormatCommand::Italic => toggle_inline(html, sel, &ITALIC),
        FormatCommand::Underline => toggle_inline(html, sel, &UNDERLINE),
        FormatCommand::Strikethrough => toggle_inline(html, sel, &STRIKE),
        FormatCommand::InlineCode => toggle_inline(html, sel, &CODE),
        FormatCommand::Subscript => toggle_inline(html, sel, &SUBSCRIPT),
        FormatCommand::Superscript => toggle_inline(html, sel, &SUPERSCRIPT),
        FormatCommand::Heading(level) => {
            let tag = format!("h{}", (*level).clamp(1, 6));
            set_block_tag(html, sel, &tag, true)
        }
        FormatCommand::Paragraph => set_block_tag(html, sel, "p", false),
        FormatCommand::CodeBlock => set_block_tag(html, sel, "pre", true),
        FormatCommand::Blockquote => toggle_blockquote(html, sel),
        FormatCommand::BulletList => toggle_list(html, sel, "ul"),
        FormatCommand::NumberedList => toggle_list(html, sel, "ol"),
        FormatCommand::Align(alignment) => toggle_alignment(html, sel, *alignment),
        FormatCommand::FontSize(size) => toggle_span_style(html, sel, "font-size", size),
        FormatCommand::ForegroundColor(color) => toggle_span_style(html, sel, "color", color),
        FormatCommand::HighlightColor(color) => {
            toggle_span_style(html, sel, "background-color", color)
        }
        FormatCommand::ClearFormatting => clear_formatting(html, sel),
        FormatCommand::Undo | FormatCommand::Redo => FormatResult::unchanged(html, sel),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inline Formatting
// ─────────────────────────────────────────────────────────────────────────────

/// Split a selection into runs that an inline element can wrap.
///
/// Runs never cross the tags of a block element or of an element that is
/// only partly selected. Whitespace-only runs are dropped.
fn inline_runs(html: &str, elements: &[Element], sel: Selection) -> Vec<Range<usize>> {
    let len = html.len();
    let mut cuts: Vec<Range<usize>> = Vec::new();
    for element in elements {
        let outer = element.outer_range(len);
        let whole = outer.start >= sel.start && outer.end <= sel.end;
        let is_block = BLOCK_BOUNDARIES.contains(&element.name.as_str());
        if whole && !is_block {
            continue;
        }
        let tags = std::iter::once(element.open.clone()).chain(element.close.clone());
        // Implicit closes are empty ranges
        cuts.extend(tags.filter(|tag| {
            !tag.is_empty() && tag.start >= sel.start && tag.end <= sel.end
        }));
    }
    cuts.sort_by_key(|cut| cut.start);

    let mut runs = Vec::new();
    let mut cursor = sel.start;
    for cut in cuts {
        if cut.start > cursor {
            runs.push(cursor..cut.start);
        }
        cursor = cursor.max(cut.end);
    }
    if sel.end > cursor {
        runs.push(cursor..sel.end);
    }
    runs.retain(|run| !html[run.clone()].trim().is_empty());
    runs
}

/// Element whose content is exactly `run` and whose name passes `accept`.
fn exact_wrapper<'a>(
    elements: &'a [Element],
    run: &Range<usize>,
    doc_len: usize,
    accept: impl Fn(&Element) -> bool,
) -> Option<&'a Element> {
    elements.iter().find(|&e| {
        e.close.as_ref().is_some_and(|close| !close.is_empty())
            && e.content_range(doc_len) == *run
            && accept(e)
    })
}

/// Edits removing an element's open and close tags.
fn unwrap_edits(element: &Element) -> Vec<Edit> {
    let mut edits = vec![Edit::delete(element.open.clone())];
    if let Some(close) = &element.close {
        edits.push(Edit::delete(close.clone()));
    }
    edits
}

/// Wrap every run in `open`/`close`, keeping the selection inside the
/// wrappers so the same command can find them again.
fn wrap_runs(
    html: &str,
    sel: Selection,
    runs: &[Range<usize>],
    open: &str,
    close: &str,
    mut edits: Vec<Edit>,
) -> FormatResult {
    for run in runs {
        edits.push(Edit::insert(run.start, open));
        edits.push(Edit::insert(run.end, close));
    }
    let (new_html, mut selection) = apply_edits(html, edits, sel);
    if runs.last().is_some_and(|run| run.end == sel.end) {
        selection.end -= close.len();
    }
    FormatResult::new(new_html, selection)
}

/// Wrap the selection in an inline element, or unwrap it if already wrapped.
fn toggle_inline(html: &str, sel: Selection, tag: &InlineTag) -> FormatResult {
    let elements = scan_elements(html);
    let len = html.len();
    let is_tag = |e: &Element| tag.names().any(|name| name == e.name);

    // Selection is one element including its own tags
    if let Some(element) = elements.iter().find(|&e| {
        is_tag(e)
            && e.open.start == sel.start
            && e.close
                .as_ref()
                .is_some_and(|close| !close.is_empty() && close.end == sel.end)
    }) {
        let (new_html, selection) = apply_edits(html, unwrap_edits(element), sel);
        return FormatResult::new(new_html, selection).toggled_off();
    }

    let runs = inline_runs(html, &elements, sel);
    let targets = if runs.is_empty() {
        vec![sel.start..sel.end]
    } else {
        runs.clone()
    };

    // Every run is exactly an element's content
    let wrappers: Option<Vec<&Element>> = targets
        .iter()
        .map(|run| exact_wrapper(&elements, run, len, is_tag))
        .collect();
    if let Some(wrappers) = wrappers {
        let edits: Vec<Edit> = wrappers.into_iter().flat_map(unwrap_edits).collect();
        let (new_html, selection) = apply_edits(html, edits, sel);
        return FormatResult::new(new_html, selection).toggled_off();
    }

    // Inline formatting needs a selection; runs already inside the element
    // stay as they are
    let runs: Vec<Range<usize>> = runs
        .into_iter()
        .filter(|run| {
            ancestors_at(&elements, run.start, len)
                .into_iter()
                .all(|i| !is_tag(&elements[i]))
        })
        .collect();
    if runs.is_empty() {
        return FormatResult::unchanged(html, sel);
    }

    // Same-tag elements inside a run merge into the new wrapper
    let merged: Vec<Edit> = elements
        .iter()
        .filter(|&e| {
            let outer = e.outer_range(len);
            is_tag(e) && runs.iter().any(|run| outer.start >= run.start && outer.end <= run.end)
        })
        .flat_map(unwrap_edits)
        .collect();

    let open = format!("<{}>", tag.tag);
    let close = format!("</{}>", tag.tag);
    wrap_runs(html, sel, &runs, &open, &close, merged)
}

/// Whether a command value can go into a `style` attribute as-is.
fn is_safe_style_value(value: &str) -> bool {
    !value
        .chars()
        .any(|c| matches!(c, '"' | '\'' | ';' | '<' | '>' | '\\' | '{' | '}') || c.is_control())
}

/// Wrap the selection in a `<span>` carrying one style property.
///
/// An enclosing span for the same property is replaced, or removed when the
/// value matches. Values that could escape the attribute are refused.
fn toggle_span_style(html: &str, sel: Selection, property: &str, value: &str) -> FormatResult {
    let value = value.trim();
    if !is_safe_style_value(value) {
        return FormatResult::unchanged(html, sel);
    }

    let elements = scan_elements(html);
    let len = html.len();
    let single_property = |e: &Element| {
        e.name == "span"
            && attribute_value(e.open_tag(html), "style")
                .map(|style| parse_style(&style))
                .is_some_and(|decls| decls.len() == 1 && decls[0].0 == property)
    };

    let runs = inline_runs(html, &elements, sel);
    let targets = if runs.is_empty() {
        vec![sel.start..sel.end]
    } else {
        runs.clone()
    };
    let wrappers: Option<Vec<&Element>> = targets
        .iter()
        .map(|run| exact_wrapper(&elements, run, len, single_property))
        .collect();

    if let Some(wrappers) = wrappers {
        let removing = wrappers.iter().all(|span| {
            attribute_value(span.open_tag(html), "style")
                .map(|style| parse_style(&style))
                .is_some_and(|decls| decls[0].1 == value)
        }) || value.is_empty();
        let edits: Vec<Edit> = if removing {
            wrappers.into_iter().flat_map(unwrap_edits).collect()
        } else {
            wrappers
                .into_iter()
                .map(|span| Edit::replace(span.open.clone(), span_open(property, value)))
                .collect()
        };
        let (new_html, selection) = apply_edits(html, edits, sel);
        let result = FormatResult::new(new_html, selection);
        return if removing { result.toggled_off() } else { result };
    }

    if value.is_empty() || runs.is_empty() {
        return FormatResult::unchanged(html, sel);
    }

    wrap_runs(html, sel, &runs, &span_open(property, value), "</span>", Vec::new())
}

fn span_open(property: &str, value: &str) -> String {
    format!(r#"<span style="{}: {};">"#, property, value)
}

fn is_inline_formatting(element: &Element) -> bool {
    INLINE_FORMATTING.contains(&element.name.as_str()) && element.close.is_some()
}

/// Remove inline formatting elements inside the selection.
///
/// Wrappers whose content is exactly the selection are removed as well.
fn clear_formatting(html: &str, sel: Selection) -> FormatResult {
    let elements = scan_elements(html);

    let (mut start, mut end) = (sel.start, sel.end);
    while let Some(wrapper) = elements
        .iter()
        .find(|e| is_inline_formatting(e) && e.content_range(html.len()) == (start..end))
    {
        let outer = wrapper.outer_range(html.len());
        start = outer.start;
        end = outer.end;
    }

    let mut edits = Vec::new();
    for element in elements.iter().filter(|e| is_inline_formatting(e)) {
        let outer = element.outer_range(html.len());
        if outer.start >= start && outer.end <= end {
            edits.push(Edit::delete(element.open.clone()));
            if let Some(close) = &element.close {
                edits.push(Edit::delete(close.clone()));
            }
        }
    }

    if edits.is_empty() {
        return FormatResult::unchanged(html, sel);
    }

    let (new_html, selection) = apply_edits(html, edits, Selection::new(start, end));
    FormatResult::new(new_html, selection)
}

// ─────────────────────────────────────────────────────────────────────────────
// Block Formatting
// ─────────────────────────────────────────────────────────────────────────────

/// What a block-level command operates on.
enum BlockTarget {
    /// An existing element (index into the scan)
    Element(usize),
    /// A run of markup with no enclosing block of its own
    Run(Range<usize>),
}

/// Resolve the block a block-level command applies to.
///
/// Renameable blocks are targeted directly; inside containers (list items,
/// cells, quotes) or at the top level, the surrounding run of markup is.
fn block_target(html: &str, elements: &[Element], pos: usize) -> BlockTarget {
    let len = html.len();
    if let Some(idx) = innermost_named(elements, pos, len, TEXT_BLOCKS) {
        if RETAGGABLE_BLOCKS.contains(&elements[idx].name.as_str()) {
            return BlockTarget::Element(idx);
        }
        return BlockTarget::Run(elements[idx].content_range(len));
    }

    // Top level: bounded by neighbouring top-level blocks
    let top_blocks = elements.iter().filter(|e| {
        e.parent.is_none()
            && (TEXT_BLOCKS.contains(&e.name.as_str())
                || matches!(e.name.as_str(), "ul" | "ol" | "table" | "hr" | "img"))
    });
    let mut run_start = 0;
    let mut run_end = len;
    for block in top_blocks {
        let outer = block.outer_range(len);
        if outer.end <= pos {
            run_start = run_start.max(outer.end);
        } else if outer.start >= pos {
            run_end = run_end.min(outer.start);
        }
    }
    BlockTarget::Run(run_start..run_end)
}

/// Rename an element's open and close tags, keeping attributes.
fn retag_edits(html: &str, element: &Element, tag: &str) -> Vec<Edit> {
    let open_tag = element.open_tag(html);
    let attrs = &open_tag[1 + element.name.len()..];
    let mut edits = vec![Edit::replace(
        element.open.clone(),
        format!("<{}{}", tag, attrs),
    )];
    if let Some(close) = &element.close {
        edits.push(Edit::replace(close.clone(), format!("</{}>", tag)));
    }
    edits
}

/// Set the block type. With `toggle`, applying the current type reverts to `<p>`.
fn set_block_tag(html: &str, sel: Selection, tag: &str, toggle: bool) -> FormatResult {
    let elements = scan_elements(html);

    match block_target(html, &elements, sel.start) {
        BlockTarget::Element(idx) => {
            let element = &elements[idx];
            if element.name == tag {
                if !toggle {
                    return FormatResult::unchanged(html, sel);
                }
                let (new_html, selection) = apply_edits(html, retag_edits(html, element, "p"), sel);
                return FormatResult::new(new_html, selection).toggled_off();
            }
            let (new_html, selection) = apply_edits(html, retag_edits(html, element, tag), sel);
            FormatResult::new(new_html, selection)
        }
        BlockTarget::Run(run) => {
            if run.is_empty() {
                return FormatResult::unchanged(html, sel);
            }
            let edits = vec![
                Edit::insert(run.start, format!("<{}>", tag)),
                Edit::insert(run.end, format!("</{}>", tag)),
            ];
            let (new_html, selection) = apply_edits(html, edits, sel);
            FormatResult::new(new_html, selection)
        }
    }
}

/// Wrap the current block in a blockquote, or unwrap the enclosing one.
fn toggle_blockquote(html: &str, sel: Selection) -> FormatResult {
    let elements = scan_elements(html);
    let len = html.len();

    if let Some(idx) = innermost_named(&elements, sel.start, len, TEXT_BLOCKS) {
        let block = &elements[idx];
        let quote = if block.name == "blockquote" {
            Some(idx)
        } else {
            block
                .parent
                .filter(|&p| elements[p].name == "blockquote")
        };

        if let Some(quote) = quote {
            let quote = &elements[quote];
            let mut edits = vec![Edit::delete(quote.open.clone())];
            if let Some(close) = &quote.close {
                edits.push(Edit::delete(close.clone()));
            }
            let (new_html, selection) = apply_edits(html, edits, sel);
            return FormatResult::new(new_html, selection).toggled_off();
        }
    }

    let range = match block_target(html, &elements, sel.start) {
        BlockTarget::Element(idx) => elements[idx].outer_range(len),
        BlockTarget::Run(run) if !run.is_empty() => run,
        BlockTarget::Run(_) => return FormatResult::unchanged(html, sel),
    };
    let edits = vec![
        Edit::insert(range.start, "<blockquote>"),
        Edit::insert(range.end, "</blockquote>"),
    ];
    let (new_html, selection) = apply_edits(html, edits, sel);
    FormatResult::new(new_html, selection)
}

/// Whether a list item holds exactly one block element and nothing else.
fn li_wraps_single_block(html: &str, elements: &[Element], li: usize) -> bool {
    let len = html.len();
    let content = elements[li].content_range(len);
    let children: Vec<&Element> = elements.iter().filter(|e| e.parent == Some(li)).collect();
    match children.as_slice() {
        [only] if RETAGGABLE_BLOCKS.contains(&only.name.as_str()) => {
            let outer = only.outer_range(len);
            html[content.start..outer.start].trim().is_empty()
                && html[outer.end..content.end].trim().is_empty()
        }
        _ => false,
    }
}

/// Turn the selected blocks into a list of `list_tag`, switch the list type,
/// or unwrap the list when it already has that type.
fn toggle_list(html: &str, sel: Selection, list_tag: &str) -> FormatResult {
    let elements = scan_elements(html);
    let len = html.len();

    // Already inside a list item
    if let Some(li) = innermost_named(&elements, sel.start, len, &["li"]) {
        if let Some(list) = elements[li]
            .parent
            .filter(|&p| matches!(elements[p].name.as_str(), "ul" | "ol"))
        {
            let list_el = &elements[list];
            if list_el.name != list_tag {
                let (new_html, selection) =
                    apply_edits(html, retag_edits(html, list_el, list_tag), sel);
                return FormatResult::new(new_html, selection);
            }

            let mut edits = vec![Edit::delete(list_el.open.clone())];
            if let Some(close) = &list_el.close {
                edits.push(Edit::delete(close.clone()));
            }
            for (idx, item) in elements.iter().enumerate() {
                if item.parent != Some(list) || item.name != "li" {
                    continue;
                }
                let unwrap_only = li_wraps_single_block(html, &elements, idx);
                let (open_text, close_text) = if unwrap_only { ("", "") } else { ("<p>", "</p>") };
                edits.push(Edit::replace(item.open.clone(), open_text));
                if let Some(close) = &item.close {
                    edits.push(Edit::replace(close.clone(), close_text));
                }
            }
            let (new_html, selection) = apply_edits(html, edits, sel);
            return FormatResult::new(new_html, selection).toggled_off();
        }
    }

    let first = match block_target(html, &elements, sel.start) {
        BlockTarget::Element(idx) => idx,
        BlockTarget::Run(run) => {
            if run.is_empty() {
                return FormatResult::unchanged(html, sel);
            }
            let edits = vec![
                Edit::insert(run.start, format!("<{}><li>", list_tag)),
                Edit::insert(run.end, format!("</li></{}>", list_tag)),
            ];
            let (new_html, selection) = apply_edits(html, edits, sel);
            return FormatResult::new(new_html, selection);
        }
    };

    // Sibling blocks touched by the selection become items of one list
    let parent = elements[first].parent;
    let first_start = elements[first].open.start;
    let mut blocks: Vec<usize> = (0..elements.len())
        .filter(|&i| {
            let e = &elements[i];
            let outer = e.outer_range(len);
            e.parent == parent
                && RETAGGABLE_BLOCKS.contains(&e.name.as_str())
                && outer.start >= first_start
                && outer.start < sel.end.max(first_start + 1)
        })
        .collect();
    if blocks.is_empty() {
        blocks.push(first);
    }

    let last = *blocks.last().unwrap_or(&first);
    let mut edits = Vec::new();
    for &idx in &blocks {
        let block = &elements[idx];
        let is_first = idx == blocks[0];
        let is_last = idx == last;
        let list_open = if is_first { format!("<{}>", list_tag) } else { String::new() };
        let list_close = if is_last { format!("</{}>", list_tag) } else { String::new() };

        if block.name == "p" {
            edits.push(Edit::replace(block.open.clone(), format!("{}<li>", list_open)));
            match &block.close {
                Some(close) => {
                    edits.push(Edit::replace(close.clone(), format!("</li>{}", list_close)))
                }
                None => edits.push(Edit::insert(len, format!("</li>{}", list_close))),
            }
        } else {
            let outer = block.outer_range(len);
            edits.push(Edit::insert(outer.start, format!("{}<li>", list_open)));
            edits.push(Edit::insert(outer.end, format!("</li>{}", list_close)));
        }
    }

    let (new_html, selection) = apply_edits(html, edits, sel);
    FormatResult::new(new_html, selection)
}

// ─────────────────────────────────────────────────────────────────────────────
// Alignment
// ─────────────────────────────────────────────────────────────────────────────

/// Parse a `style` attribute into `(property, value)` pairs.
pub(crate) fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim().to_ascii_lowercase();
            let value = value.trim().to_string();
            (!prop.is_empty()).then_some((prop, value))
        })
        .collect()
}

fn render_style(decls: &[(String, String)]) -> String {
    decls
        .iter()
        .map(|(prop, value)| format!("{}: {};", prop, value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rewrite an open tag with a new `style` attribute (removed when empty).
fn with_style(open_tag: &str, name_len: usize, decls: &[(String, String)]) -> String {
    let body = open_tag
        .trim_start_matches('<')
        .trim_end_matches('>')
        .trim_end_matches('/');
    let self_closing = open_tag.trim_end_matches('>').ends_with('/');
    let name = &body[..name_len];

    let mut attrs = String::new();
    let mut rest = body[name_len..].trim();
    // Re-emit every attribute except style
    while !rest.is_empty() {
        let key_len = rest
            .find(|c: char| c == '=' || c.is_ascii_whitespace())
            .unwrap_or(rest.len());
        let key = &rest[..key_len];
        let mut after = rest[key_len..].trim_start();
        let mut attr = key.to_string();
        if let Some(value_part) = after.strip_prefix('=') {
            let value_part = value_part.trim_start();
            let value_len = match value_part.chars().next() {
                Some(q @ ('"' | '\'')) => {
                    value_part[1..].find(q).map_or(value_part.len(), |e| e + 2)
                }
                _ => value_part
                    .find(|c: char| c.is_ascii_whitespace())
                    .unwrap_or(value_part.len()),
            };
            attr.push('=');
            attr.push_str(&value_part[..value_len]);
            after = value_part[value_len..].trim_start();
        }
        if !key.eq_ignore_ascii_case("style") && !key.is_empty() {
            attrs.push(' ');
            attrs.push_str(&attr);
        }
        if key.is_empty() {
            break;
        }
        rest = after;
    }

    if !decls.is_empty() {
        attrs.push_str(&format!(r#" style="{}""#, render_style(decls)));
    }
    let closer = if self_closing { " />" } else { ">" };
    format!("<{}{}{}", name, attrs, closer)
}

/// Set `text-align` on the current block; the same alignment twice removes it.
fn toggle_alignment(html: &str, sel: Selection, alignment: Alignment) -> FormatResult {
    let elements = scan_elements(html);
    let len = html.len();
    let value = alignment.css_value();

    match innermost_named(&elements, sel.start, len, TEXT_BLOCKS) {
        Some(idx) => {
            let element = &elements[idx];
            let open_tag = element.open_tag(html);
            let mut decls = attribute_value(open_tag, "style")
                .map(|s| parse_style(&s))
                .unwrap_or_default();

            let current = decls.iter().position(|(p, _)| p == "text-align");
            let removing = match current {
                Some(pos) if decls[pos].1.eq_ignore_ascii_case(value) => {
                    decls.remove(pos);
                    true
                }
                Some(pos) => {
                    decls[pos].1 = value.to_string();
                    false
                }
                None => {
                    decls.push(("text-align".to_string(), value.to_string()));
                    false
                }
            };

            let new_open = with_style(open_tag, element.name.len(), &decls);
            let edits = vec![Edit::replace(element.open.clone(), new_open)];
            let (new_html, selection) = apply_edits(html, edits, sel);
            let result = FormatResult::new(new_html, selection);
            if removing {
                result.toggled_off()
            } else {
                result
            }
        }
        None => match block_target(html, &elements, sel.start) {
            BlockTarget::Run(run) if !run.is_empty() => {
                let edits = vec![
                    Edit::insert(run.start, format!(r#"<p style="text-align: {};">"#, value)),
                    Edit::insert(run.end, "</p>"),
                ];
                let (new_html, selection) = apply_edits(html, edits, sel);
                FormatResult::new(new_html, selection)
            }
            _ => FormatResult::unchanged(html, sel),
        },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sel_of(html: &str, needle: &str) -> Selection {
        let start = html.find(needle).expect("needle present");
        Selection::new(start, start + needle.len())
    }

    fn selected<'a>(result: &'a FormatResult) -> &'a str {
        &result.html[result.selection.start..result.selection.end]
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inline Formatting Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_bold_with_selection() {
        let html = "<p>Hello world</p>";
        let result = apply_format(html, sel_of(html, "Hello"), &FormatCommand::Bold);
        assert_eq!(result.html, "<p><strong>Hello</strong> world</p>");
        assert_eq!(selected(&result), "Hello");
        assert!(result.applied);
    }

    #[test]
    fn test_bold_toggle_is_reversible() {
        let html = "<p>Hello world</p>";
        let on = apply_format(html, sel_of(html, "Hello"), &FormatCommand::Bold);
        let off = apply_format(&on.html, on.selection, &FormatCommand::Bold);
        assert_eq!(off.html, html);
        assert_eq!(off.selection, sel_of(html, "Hello"));
        assert!(!off.applied);
    }

    #[test]
    fn test_bold_without_selection() {
        let html = "<p>Hello</p>";
        let result = apply_format(html, Selection::caret(5), &FormatCommand::Bold);
        assert_eq!(result.html, html);
        assert!(!result.applied);
    }

    #[test]
    fn test_unwrap_legacy_bold_tag() {
        let html = "<p><b>Hello</b></p>";
        let result = apply_format(html, sel_of(html, "Hello"), &FormatCommand::Bold);
        assert_eq!(result.html, "<p>Hello</p>");
    }

    #[test]
    fn test_unwrap_when_selection_includes_tags() {
        let html = "<p><em>Hello</em> world</p>";
        let result = apply_format(html, sel_of(html, "<em>Hello</em>"), &FormatCommand::Italic);
        assert_eq!(result.html, "<p>Hello world</p>");
    }

    #[test]
    fn test_every_inline_toggle_reverses() {
        let html = "<p>Some text here</p>";
        for command in [
            FormatCommand::Bold,
            FormatCommand::Italic,
            FormatCommand::Underline,
            FormatCommand::Strikethrough,
            FormatCommand::InlineCode,
            FormatCommand::Subscript,
            FormatCommand::Superscript,
        ] {
            let on = apply_format(html, sel_of(html, "text"), &command);
            assert_ne!(on.html, html, "{:?} should apply", command);
            let off = apply_format(&on.html, on.selection, &command);
            assert_eq!(off.html, html, "{:?} should reverse", command);
        }
    }

    #[test]
    fn test_selection_inside_tag_is_snapped() {
        // Start falls inside "<p>", end inside "</p>"
        let html = "<p>Hello</p>";
        let result = apply_format(html, Selection::new(1, 10), &FormatCommand::Bold);
        assert_eq!(result.html, "<p><strong>Hello</strong></p>");
    }

    #[test]
    fn test_reversed_selection() {
        let html = "<p>Hello</p>";
        let result = apply_format(html, Selection::new(8, 3), &FormatCommand::Italic);
        assert_eq!(result.html, "<p><em>Hello</em></p>");
    }

    #[test]
    fn test_bold_across_paragraphs_wraps_each_block() {
        let html = "<p>a</p><p>b</p>";
        let on = apply_format(html, sel_of(html, "a</p><p>b"), &FormatCommand::Bold);
        assert_eq!(on.html, "<p><strong>a</strong></p><p><strong>b</strong></p>");

        let off = apply_format(&on.html, on.selection, &FormatCommand::Bold);
        assert_eq!(off.html, html);
        assert_eq!(off.selection, sel_of(html, "a</p><p>b"));
        assert!(!off.applied);
    }

    #[test]
    fn test_italic_across_list_items() {
        let html = "<ul><li>One</li>\n<li>Two</li></ul>";
        let result = apply_format(html, sel_of(html, "ne</li>\n<li>Tw"), &FormatCommand::Italic);
        assert_eq!(
            result.html,
            "<ul><li>O<em>ne</em></li>\n<li><em>Tw</em>o</li></ul>"
        );
    }

    #[test]
    fn test_bold_does_not_straddle_partial_element() {
        let html = "<p>a <em>b c</em></p>";
        let result = apply_format(html, sel_of(html, "a <em>b"), &FormatCommand::Bold);
        assert_eq!(result.html, "<p><strong>a </strong><em><strong>b</strong> c</em></p>");
    }

    #[test]
    fn test_bold_over_separate_elements_merges() {
        let html = "<p><strong>a</strong> b <strong>c</strong></p>";
        let sel = sel_of(html, "<strong>a</strong> b <strong>c</strong>");
        let result = apply_format(html, sel, &FormatCommand::Bold);
        assert_eq!(result.html, "<p><strong>a b c</strong></p>");
        assert_eq!(selected(&result), "a b c");
        assert!(result.applied);
    }

    #[test]
    fn test_bold_inside_bold_is_left_alone() {
        let html = "<p><strong>Bold text</strong></p>";
        let result = apply_format(html, sel_of(html, "Bold"), &FormatCommand::Bold);
        assert_eq!(result.html, html);
        assert!(!result.applied);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Span Style Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_foreground_color() {
        let html = "<p>Red text</p>";
        let cmd = FormatCommand::ForegroundColor("#ff0000".to_string());
        let on = apply_format(html, sel_of(html, "Red"), &cmd);
        assert_eq!(on.html, r##"<p><span style="color: #ff0000;">Red</span> text</p>"##);

        let off = apply_format(&on.html, on.selection, &cmd);
        assert_eq!(off.html, html);
        assert!(!off.applied);
    }

    #[test]
    fn test_color_change_replaces_span() {
        let html = "<p>Red text</p>";
        let on = apply_format(
            html,
            sel_of(html, "Red"),
            &FormatCommand::ForegroundColor("red".to_string()),
        );
        let changed = apply_format(
            &on.html,
            on.selection,
            &FormatCommand::ForegroundColor("blue".to_string()),
        );
        assert_eq!(changed.html, r#"<p><span style="color: blue;">Red</span> text</p>"#);
        assert_eq!(selected(&changed), "Red");
    }

    #[test]
    fn test_font_size_and_highlight_nest() {
        let html = "<p>Big</p>";
        let sized = apply_format(
            html,
            sel_of(html, "Big"),
            &FormatCommand::FontSize("24px".into()),
        );
        let lit = apply_format(
            &sized.html,
            sized.selection,
            &FormatCommand::HighlightColor("yellow".into()),
        );
        assert_eq!(
            lit.html,
            r#"<p><span style="font-size: 24px;"><span style="background-color: yellow;">Big</span></span></p>"#
        );
    }

    #[test]
    fn test_color_across_paragraphs_wraps_each_block() {
        let html = "<p>a</p><p>b</p>";
        let cmd = FormatCommand::ForegroundColor("red".to_string());
        let on = apply_format(html, sel_of(html, "a</p><p>b"), &cmd);
        assert_eq!(
            on.html,
            r#"<p><span style="color: red;">a</span></p><p><span style="color: red;">b</span></p>"#
        );
        let off = apply_format(&on.html, on.selection, &cmd);
        assert_eq!(off.html, html);
    }

    #[test]
    fn test_style_value_cannot_escape_attribute() {
        let html = "<p>Red</p>";
        for value in [
            r#"red" onmouseover="alert(1)"#,
            "red; background: url(x)",
            "red</span><script>",
        ] {
            let cmd = FormatCommand::ForegroundColor(value.to_string());
            let result = apply_format(html, sel_of(html, "Red"), &cmd);
            assert_eq!(result.html, html, "{:?} should be refused", value);
            assert!(!result.applied);
        }

        let cmd = FormatCommand::FontSize("1.5em".to_string());
        assert!(apply_format(html, sel_of(html, "Red"), &cmd).applied);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Block Formatting Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_heading_from_paragraph() {
        let html = "<p>Title</p>";
        let result = apply_format(html, Selection::caret(4), &FormatCommand::Heading(2));
        assert_eq!(result.html, "<h2>Title</h2>");
    }

    #[test]
    fn test_heading_same_level_toggles_off() {
        let html = "<h1>Title</h1>";
        let result = apply_format(html, Selection::caret(5), &FormatCommand::Heading(1));
        assert_eq!(result.html, "<p>Title</p>");
        assert!(!result.applied);
    }

    #[test]
    fn test_heading_keeps_attributes() {
        let html = r#"<p style="text-align: center;">Title</p>"#;
        let result = apply_format(html, sel_of(html, "Title"), &FormatCommand::Heading(3));
        assert_eq!(result.html, r#"<h3 style="text-align: center;">Title</h3>"#);
        assert_eq!(selected(&result), "Title");
    }

    #[test]
    fn test_heading_on_bare_text() {
        let html = "Plain text";
        let result = apply_format(html, Selection::caret(2), &FormatCommand::Heading(1));
        assert_eq!(result.html, "<h1>Plain text</h1>");
    }

    #[test]
    fn test_paragraph_is_not_a_toggle() {
        let html = "<p>Body</p>";
        let result = apply_format(html, Selection::caret(4), &FormatCommand::Paragraph);
        assert_eq!(result.html, html);
        assert!(!result.applied);
    }

    #[test]
    fn test_code_block_toggle() {
        let html = "<p>let x = 1;</p>";
        let on = apply_format(html, Selection::caret(5), &FormatCommand::CodeBlock);
        assert_eq!(on.html, "<pre>let x = 1;</pre>");
        let off = apply_format(&on.html, on.selection, &FormatCommand::CodeBlock);
        assert_eq!(off.html, html);
    }

    #[test]
    fn test_blockquote_toggle() {
        let html = "<p>A quote</p>";
        let on = apply_format(html, sel_of(html, "quote"), &FormatCommand::Blockquote);
        assert_eq!(on.html, "<blockquote><p>A quote</p></blockquote>");
        assert_eq!(selected(&on), "quote");
        let off = apply_format(&on.html, on.selection, &FormatCommand::Blockquote);
        assert_eq!(off.html, html);
        assert!(!off.applied);
    }

    #[test]
    fn test_bullet_list_toggle() {
        let html = "<p>Hello</p>";
        let on = apply_format(html, sel_of(html, "Hello"), &FormatCommand::BulletList);
        assert_eq!(on.html, "<ul><li>Hello</li></ul>");
        assert_eq!(selected(&on), "Hello");

        let off = apply_format(&on.html, on.selection, &FormatCommand::BulletList);
        assert_eq!(off.html, html);
        assert_eq!(off.selection, sel_of(html, "Hello"));
    }

    #[test]
    fn test_list_type_switch() {
        let html = "<ul><li>One</li><li>Two</li></ul>";
        let result = apply_format(html, sel_of(html, "Two"), &FormatCommand::NumberedList);
        assert_eq!(result.html, "<ol><li>One</li><li>Two</li></ol>");
    }

    #[test]
    fn test_list_spanning_paragraphs() {
        let html = "<p>One</p><p>Two</p><p>Three</p>";
        let start = html.find("One").unwrap();
        let end = html.find("Two").unwrap() + 3;
        let result = apply_format(html, Selection::new(start, end), &FormatCommand::NumberedList);
        assert_eq!(result.html, "<ol><li>One</li><li>Two</li></ol><p>Three</p>");
    }

    #[test]
    fn test_list_around_heading_is_reversible() {
        let html = "<h2>Item</h2>";
        let on = apply_format(html, sel_of(html, "Item"), &FormatCommand::BulletList);
        assert_eq!(on.html, "<ul><li><h2>Item</h2></li></ul>");
        let off = apply_format(&on.html, on.selection, &FormatCommand::BulletList);
        assert_eq!(off.html, html);
    }

    #[test]
    fn test_alignment_toggle() {
        let html = "<p>Centered</p>";
        let cmd = FormatCommand::Align(Alignment::Center);
        let on = apply_format(html, Selection::caret(5), &cmd);
        assert_eq!(on.html, r#"<p style="text-align: center;">Centered</p>"#);

        let off = apply_format(&on.html, on.selection, &cmd);
        assert_eq!(off.html, html);
        assert!(!off.applied);
    }

    #[test]
    fn test_alignment_replaces_and_keeps_other_styles() {
        let html = r#"<p class="lead" style="color: red; text-align: left;">X</p>"#;
        let result = apply_format(
            html,
            sel_of(html, "X"),
            &FormatCommand::Align(Alignment::Right),
        );
        assert_eq!(
            result.html,
            r#"<p class="lead" style="color: red; text-align: right;">X</p>"#
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Clear Formatting Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_clear_formatting_inside_selection() {
        let html = "<p><strong>Bold</strong> and <em>italic</em></p>";
        let result = apply_format(
            html,
            sel_of(html, "<strong>Bold</strong> and <em>italic</em>"),
            &FormatCommand::ClearFormatting,
        );
        assert_eq!(result.html, "<p>Bold and italic</p>");
    }

    #[test]
    fn test_clear_formatting_grows_over_exact_wrappers() {
        let html = r#"<p><strong><span style="color: red;">Hi</span></strong> there</p>"#;
        let result = apply_format(html, sel_of(html, "Hi"), &FormatCommand::ClearFormatting);
        assert_eq!(result.html, "<p>Hi there</p>");
        assert_eq!(selected(&result), "Hi");
    }

    #[test]
    fn test_clear_formatting_keeps_partial_elements() {
        let html = "<p><strong>Bold text</strong></p>";
        let result = apply_format(html, sel_of(html, "Bold"), &FormatCommand::ClearFormatting);
        assert_eq!(result.html, html);
        assert!(!result.applied);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Robustness
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_history_commands_leave_markup() {
        let html = "<p>x</p>";
        assert_eq!(apply_format(html, Selection::caret(3), &FormatCommand::Undo).html, html);
    }

    #[test]
    fn test_no_panic_on_any_selection() {
        let html = "<p>Hei på <strong>deg</strong> 你好</p><ul><li>🎉</li></ul>";
        let commands = [
            FormatCommand::Bold,
            FormatCommand::Heading(2),
            FormatCommand::Blockquote,
            FormatCommand::BulletList,
            FormatCommand::Align(Alignment::Center),
            FormatCommand::ForegroundColor("red".into()),
            FormatCommand::ClearFormatting,
        ];
        for i in (0..=html.len() + 2).step_by(3) {
            for j in (i..=html.len() + 2).step_by(5) {
                for command in &commands {
                    let _ = apply_format(html, Selection::new(i, j), command);
                }
            }
        }
    }
}
