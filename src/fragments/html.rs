//! HTML serialization of fragments.
//!
//! Fragments are inserted into the document as literal HTML. Styling is
//! inline so the stored markup renders the same wherever the host shows it.

use super::{CellKind, StructuredFragment, TableFragment};
use crate::string_utils::html_escape;
use serde::{Deserialize, Serialize};

/// `rel` for links opening a new browsing context: no opener, no referrer.
const LINK_REL: &str = "noopener noreferrer";

/// Inline styles used when serializing fragments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FragmentStyles {
    /// Style of the `<div>` that centers inserted images
    pub image_container: String,
    /// Style of the `<img>` itself
    pub image: String,
    /// Style of the `<table>` element
    pub table: String,
    /// Style shared by header and body cells
    pub table_cell: String,
    /// Extra style for header cells
    pub table_header: String,
    /// Style of inserted horizontal rules
    pub horizontal_rule: String,
}

impl Default for FragmentStyles {
    fn default() -> Self {
        Self {
            image_container: "text-align: center; margin: 16px 0;".to_string(),
            image: "max-width: 100%; height: auto;".to_string(),
            table: "border-collapse: collapse; width: 100%;".to_string(),
            table_cell: "border: 1px solid #ddd; padding: 8px;".to_string(),
            table_header: "background-color: #f5f5f5; font-weight: bold;".to_string(),
            horizontal_rule: "border: none; border-top: 1px solid #ddd; margin: 16px 0;"
                .to_string(),
        }
    }
}

impl StructuredFragment {
    /// Serialize the fragment to the HTML inserted into the document.
    pub fn to_html(&self, styles: &FragmentStyles) -> String {
        match self {
            StructuredFragment::Link { href, text } => format!(
                r#"<a href="{}" target="_blank" rel="{}">{}</a>"#,
                html_escape(href),
                LINK_REL,
                html_escape(text)
            ),
            StructuredFragment::Table(table) => table_html(table, styles),
            StructuredFragment::Image { src, alt } => format!(
                r#"<div style="{}"><img src="{}" alt="{}" style="{}" /></div>"#,
                html_escape(&styles.image_container),
                html_escape(src),
                html_escape(alt),
                html_escape(&styles.image)
            ),
            StructuredFragment::HorizontalRule => {
                format!(r#"<hr style="{}" />"#, html_escape(&styles.horizontal_rule))
            }
        }
    }
}

fn table_html(table: &TableFragment, styles: &FragmentStyles) -> String {
    let mut html = format!(r#"<table style="{}">"#, html_escape(&styles.table));
    let cell_style = html_escape(&styles.table_cell);
    let header_style = html_escape(&format!("{} {}", styles.table_cell, styles.table_header));

    let (head, body) = table.rows().split_at(table.row_count().min(1));
    let sections = [("thead", head), ("tbody", body)];
    for (section, rows) in sections {
        if rows.is_empty() {
            continue;
        }
        html.push_str(&format!("<{}>", section));
        for row in rows {
            html.push_str("<tr>");
            for cell in row {
                let (tag, style) = match cell.kind {
                    CellKind::Header => ("th", header_style.as_str()),
                    CellKind::Body => ("td", cell_style.as_str()),
                };
                html.push_str(&format!(
                    r#"<{tag} style="{style}">{}</{tag}>"#,
                    html_escape(&cell.content)
                ));
            }
            html.push_str("</tr>");
        }
        html.push_str(&format!("</{}>", section));
    }

    html.push_str("</table>");
    html
}
