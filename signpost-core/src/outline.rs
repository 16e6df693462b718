//! Heading indexing and outline construction
//!
//! Global invariants enforced:
//! - Numbering is strictly sequential in document order
//! - The sub-counter resets at every new top-level heading
//! - Identifier derivation is a pure function of the heading text
//! - Building an outline never fails

/// Heading level recognized by the indexer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    /// A level-2 heading, opening a numbered section
    Section,
    /// A level-3 heading, numbered within the current section
    Subsection,
}

impl HeadingLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeadingLevel::Section => "section",
            HeadingLevel::Subsection => "subsection",
        }
    }
}

/// A heading scanned from a report page, ready for indexing
#[derive(Debug, Clone)]
pub struct Heading {
    pub level: HeadingLevel,
    /// Display text with markup stripped
    pub text: String,
    /// Anchor identifier derived from the text
    pub identifier: String,
    /// Index of the source element in the scanned page
    pub element: usize,
}

impl Heading {
    pub fn new(level: HeadingLevel, text: String, element: usize) -> Self {
        let identifier = derive_identifier(&text);
        Heading {
            level,
            text,
            identifier,
            element,
        }
    }
}

/// One numbered line of the table of contents
#[derive(Debug, Clone)]
pub struct OutlineEntry {
    /// Numbered label, e.g. `"2.3. Storage"`
    pub title: String,
    /// Anchor target (without the leading `#`)
    pub identifier: String,
    /// Child entries; non-empty only for top-level entries
    pub children: Vec<OutlineEntry>,
    /// Index of the source heading element, used for inline insertion
    pub element: usize,
}

/// The outline of one page: top-level entries plus the count of
/// sub-headings that were dropped for lack of a preceding section.
#[derive(Debug, Clone, Default)]
pub struct Outline {
    pub entries: Vec<OutlineEntry>,
    pub orphaned: usize,
}

impl Outline {
    /// Total number of sub-entries across all top-level entries
    pub fn subsection_count(&self) -> usize {
        self.entries.iter().map(|e| e.children.len()).sum()
    }
}

/// Derive an anchor identifier from heading text.
///
/// Every character outside `[A-Za-z0-9_]` becomes an underscore and the
/// result is lowercased. Empty text yields an empty identifier, which is
/// accepted.
pub fn derive_identifier(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Build the numbered outline from headings in document order.
///
/// A section heading opens entry `"{n}. {text}"` and resets the
/// sub-counter. A subsection heading becomes `"{n}.{m}. {text}"` under
/// the most recently opened section; with no open section it is dropped
/// from the outline and counted as orphaned.
pub fn build_outline(headings: &[Heading]) -> Outline {
    let mut entries: Vec<OutlineEntry> = Vec::new();
    let mut orphaned = 0usize;
    let mut top = 0usize;
    let mut sub = 0usize;

    for heading in headings {
        match heading.level {
            HeadingLevel::Section => {
                top += 1;
                sub = 0;
                entries.push(OutlineEntry {
                    title: format!("{}. {}", top, heading.text),
                    identifier: heading.identifier.clone(),
                    children: Vec::new(),
                    element: heading.element,
                });
            }
            HeadingLevel::Subsection => {
                sub += 1;
                match entries.last_mut() {
                    Some(parent) => parent.children.push(OutlineEntry {
                        title: format!("{}.{}. {}", top, sub, heading.text),
                        identifier: heading.identifier.clone(),
                        children: Vec::new(),
                        element: heading.element,
                    }),
                    None => orphaned += 1,
                }
            }
        }
    }

    Outline { entries, orphaned }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headings(input: &[(HeadingLevel, &str)]) -> Vec<Heading> {
        input
            .iter()
            .enumerate()
            .map(|(i, (level, text))| Heading::new(*level, text.to_string(), i))
            .collect()
    }

    #[test]
    fn test_identifier_replaces_non_word_characters() {
        assert_eq!(derive_identifier("Server Health!!"), "server_health__");
    }

    #[test]
    fn test_identifier_is_idempotent() {
        let once = derive_identifier("Server Health!!");
        assert_eq!(derive_identifier(&once), once);
    }

    #[test]
    fn test_identifier_accepts_empty_text() {
        assert_eq!(derive_identifier(""), "");
    }

    #[test]
    fn test_identifier_maps_non_ascii_to_underscore() {
        assert_eq!(derive_identifier("Café #2"), "caf___2");
    }

    #[test]
    fn test_top_level_count_matches_section_count() {
        let outline = build_outline(&headings(&[
            (HeadingLevel::Subsection, "early"),
            (HeadingLevel::Section, "one"),
            (HeadingLevel::Subsection, "a"),
            (HeadingLevel::Section, "two"),
            (HeadingLevel::Subsection, "b"),
            (HeadingLevel::Subsection, "c"),
            (HeadingLevel::Section, "three"),
        ]));
        assert_eq!(outline.entries.len(), 3);
    }

    #[test]
    fn test_numbering_resets_sub_counter() {
        let outline = build_outline(&headings(&[
            (HeadingLevel::Section, "A"),
            (HeadingLevel::Subsection, "B"),
            (HeadingLevel::Subsection, "C"),
            (HeadingLevel::Section, "D"),
            (HeadingLevel::Subsection, "E"),
        ]));

        assert_eq!(outline.entries.len(), 2);
        assert_eq!(outline.entries[0].title, "1. A");
        let first: Vec<&str> = outline.entries[0]
            .children
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(first, vec!["1.1. B", "1.2. C"]);
        assert_eq!(outline.entries[1].title, "2. D");
        let second: Vec<&str> = outline.entries[1]
            .children
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(second, vec!["2.1. E"]);
    }

    #[test]
    fn test_subsection_before_any_section_is_dropped() {
        let outline = build_outline(&headings(&[
            (HeadingLevel::Subsection, "stray"),
            (HeadingLevel::Section, "first"),
        ]));

        assert_eq!(outline.orphaned, 1);
        assert_eq!(outline.entries.len(), 1);
        assert!(outline.entries[0].children.is_empty());
        assert!(!outline
            .entries
            .iter()
            .any(|e| e.title.contains("stray") || e.children.iter().any(|c| c.title.contains("stray"))));
    }

    #[test]
    fn test_children_keep_document_order() {
        let outline = build_outline(&headings(&[
            (HeadingLevel::Section, "s"),
            (HeadingLevel::Subsection, "z"),
            (HeadingLevel::Subsection, "a"),
        ]));
        let titles: Vec<&str> = outline.entries[0]
            .children
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(titles, vec!["1.1. z", "1.2. a"]);
    }

    #[test]
    fn test_empty_heading_text_degrades_to_empty_identifier() {
        let outline = build_outline(&headings(&[(HeadingLevel::Section, "")]));
        assert_eq!(outline.entries[0].identifier, "");
        assert_eq!(outline.entries[0].title, "1. ");
    }
}
