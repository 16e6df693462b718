//! Report page scanning and splicing
//!
//! Locates level-2/level-3 headings and designated containers in page
//! text, and expresses every mutation as a positional edit applied in a
//! single splice pass.
//!
//! Global invariants enforced:
//! - Scanning never mutates the page text
//! - Edits splice in one deterministic pass; edits at equal positions
//!   keep collection order
//! - Heading order is document order (byte offset)

use crate::outline::HeadingLevel;
use anyhow::{bail, Context, Result};
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

fn section_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<h2(\s[^>]*)?>(.*?)</h2\s*>").unwrap())
}

fn subsection_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<h3(\s[^>]*)?>(.*?)</h3\s*>").unwrap())
}

fn id_attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // the attribute span always starts with whitespace, so anchoring on
    // it keeps "data-id" and friends from matching
    RE.get_or_init(|| Regex::new(r#"(?is)(?:^|\s)id\s*=\s*"([^"]*)""#).unwrap())
}

fn open_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<([a-z][a-z0-9]*)(\s[^>]*)?>").unwrap())
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").unwrap())
}

/// A heading element located in the page
#[derive(Debug, Clone)]
pub struct HeadingElement {
    pub level: HeadingLevel,
    /// Inner text with markup stripped and surrounding whitespace trimmed
    pub text: String,
    /// End of the opening tag's attribute span (just before `>`)
    attrs_end: usize,
    /// Value range of an existing `id` attribute, replaced on assignment
    existing_id: Option<Range<usize>>,
    /// Offset one past the closing tag
    end: usize,
}

/// One positional mutation of the page text.
///
/// Constructed only through [`Page`] methods so offsets always refer to
/// the scanned text.
#[derive(Debug, Clone)]
pub struct Edit {
    at: usize,
    delete: usize,
    insert: String,
}

/// A scanned report page: the original text plus the located headings.
#[derive(Debug)]
pub struct Page {
    html: String,
    headings: Vec<HeadingElement>,
}

impl Page {
    /// Scan page text for level-2 and level-3 headings.
    ///
    /// Headings are matched case-insensitively, attributes and inner
    /// markup allowed. Scanning never fails; a page without headings
    /// simply has none.
    pub fn scan(html: String) -> Page {
        let mut headings = Vec::new();

        for (level, re) in [
            (HeadingLevel::Section, section_re()),
            (HeadingLevel::Subsection, subsection_re()),
        ] {
            for caps in re.captures_iter(&html) {
                let whole = match caps.get(0) {
                    Some(m) => m,
                    None => continue,
                };
                let attrs = caps.get(1);
                let inner = match caps.get(2) {
                    Some(m) => m,
                    None => continue,
                };
                // "<h2" is 3 bytes; a tag without attributes gets its
                // id inserted right after the tag name
                let attrs_end = attrs.map_or(whole.start() + 3, |m| m.end());
                let existing_id = attrs.and_then(|m| {
                    id_attr_re().captures(m.as_str()).and_then(|c| c.get(1)).map(|g| {
                        let base = m.start();
                        base + g.start()..base + g.end()
                    })
                });
                headings.push(HeadingElement {
                    level,
                    text: strip_tags(inner.as_str()),
                    attrs_end,
                    existing_id,
                    end: whole.end(),
                });
            }
        }

        // Section and subsection matches are disjoint, so sorting by the
        // attribute span restores document order
        headings.sort_by_key(|h| h.attrs_end);

        Page { html, headings }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// Headings in document order; `element` indices refer into this slice
    pub fn headings(&self) -> &[HeadingElement] {
        &self.headings
    }

    /// Edit assigning `id` to the given heading element, overwriting any
    /// existing `id` attribute.
    pub fn assign_id_edit(&self, element: usize, id: &str) -> Edit {
        let heading = &self.headings[element];
        match &heading.existing_id {
            Some(range) => Edit {
                at: range.start,
                delete: range.end - range.start,
                insert: id.to_string(),
            },
            None => Edit {
                at: heading.attrs_end,
                delete: 0,
                insert: format!(r#" id="{}""#, id),
            },
        }
    }

    /// Edit inserting `markup` immediately after the heading element
    pub fn insert_after_edit(&self, element: usize, markup: &str) -> Edit {
        Edit {
            at: self.headings[element].end,
            delete: 0,
            insert: markup.to_string(),
        }
    }

    /// Edit appending `markup` at the end of the container with the given
    /// element id (immediately before its closing tag).
    ///
    /// The container must not nest elements of its own tag name. A page
    /// without the container is an error, as is a container that never
    /// closes.
    pub fn append_into_container_edit(&self, container_id: &str, markup: &str) -> Result<Edit> {
        let (tag, open_end) = self
            .find_container_open(container_id)
            .with_context(|| format!("container element with id \"{}\" not found", container_id))?;

        let close_re = Regex::new(&format!(r"(?i)</{}\s*>", regex::escape(&tag)))
            .context("container closing-tag pattern")?;
        let close = close_re.find_at(&self.html, open_end).with_context(|| {
            format!("closing tag for container \"{}\" not found", container_id)
        })?;

        Ok(Edit {
            at: close.start(),
            delete: 0,
            insert: markup.to_string(),
        })
    }

    fn find_container_open(&self, id: &str) -> Option<(String, usize)> {
        for caps in open_tag_re().captures_iter(&self.html) {
            let attrs = match caps.get(2) {
                Some(m) => m,
                None => continue,
            };
            let found = id_attr_re()
                .captures(attrs.as_str())
                .and_then(|c| c.get(1))
                .is_some_and(|g| g.as_str() == id);
            if found {
                let tag = caps[1].to_ascii_lowercase();
                return caps.get(0).map(|whole| (tag, whole.end()));
            }
        }
        None
    }

    /// Apply edits in one splice pass and return the finished text.
    ///
    /// Edits sort by position (stable, so equal positions keep
    /// collection order); overlapping deletions are rejected.
    pub fn apply(&self, mut edits: Vec<Edit>) -> Result<String> {
        edits.sort_by_key(|e| e.at);

        let inserted: usize = edits.iter().map(|e| e.insert.len()).sum();
        let mut out = String::with_capacity(self.html.len() + inserted);
        let mut cursor = 0usize;

        for edit in &edits {
            if edit.at < cursor {
                bail!("overlapping edits at byte {}", edit.at);
            }
            if edit.at + edit.delete > self.html.len() {
                bail!("edit out of range at byte {}", edit.at);
            }
            out.push_str(&self.html[cursor..edit.at]);
            out.push_str(&edit.insert);
            cursor = edit.at + edit.delete;
        }
        out.push_str(&self.html[cursor..]);

        Ok(out)
    }
}

/// Strip markup from heading inner text; entities pass through unchanged
fn strip_tags(inner: &str) -> String {
    tag_re().replace_all(inner, "").trim().to_string()
}
