//! Outline rendering
//!
//! Converts an outline into nested list markup and computes where it
//! lands on the page: the full list appended into the outline container,
//! plus a copy of each section's child list inserted directly after the
//! section heading itself.
//!
//! Applying the computed edits to the same page twice duplicates every
//! inserted list. That is the contract, not a guarded case.

use crate::outline::{Outline, OutlineEntry};
use crate::page::{Edit, Page};
use anyhow::Result;

/// Render the full nested outline list
pub fn render_outline_list(entries: &[OutlineEntry]) -> String {
    let mut out = String::from("<ul class=\"toc-outline\">");
    for entry in entries {
        out.push_str("<li>");
        out.push_str(&render_link(entry));
        if !entry.children.is_empty() {
            out.push_str(&render_child_list(entry));
        }
        out.push_str("</li>");
    }
    out.push_str("</ul>");
    out
}

/// Render one section's child list.
///
/// The same markup nests inside the full outline list and is inserted
/// inline after the section heading, so the inline copy is literal.
pub fn render_child_list(entry: &OutlineEntry) -> String {
    let mut out = String::from("<ul class=\"toc-sublist\">");
    for child in &entry.children {
        out.push_str("<li>");
        out.push_str(&render_link(child));
        out.push_str("</li>");
    }
    out.push_str("</ul>");
    out
}

fn render_link(entry: &OutlineEntry) -> String {
    format!(
        "<a href=\"#{}\">{}</a>",
        entry.identifier,
        escape_label(&entry.title)
    )
}

/// Compute the outline's insertion edits: the full list into the
/// container, then one inline child-list copy after each section heading
/// that has children, in document order.
pub fn outline_edits(page: &Page, outline: &Outline, container_id: &str) -> Result<Vec<Edit>> {
    let mut edits = Vec::new();
    edits.push(
        page.append_into_container_edit(container_id, &render_outline_list(&outline.entries))?,
    );
    for entry in &outline.entries {
        if !entry.children.is_empty() {
            edits.push(page.insert_after_edit(entry.element, &render_child_list(entry)));
        }
    }
    Ok(edits)
}

/// Escape angle brackets in label text. Labels come from page markup
/// with tags stripped, so entities are already encoded and `&` passes
/// through unchanged.
fn escape_label(s: &str) -> String {
    s.replace('<', "&lt;").replace('>', "&gt;")
}
