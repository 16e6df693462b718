//! Outcome reporting
//!
//! Global invariants enforced:
//! - Deterministic output ordering
//! - Byte-for-byte identical output across runs

use serde::{Deserialize, Serialize};

/// Summary of finishing one report page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageOutcome {
    pub file: String,
    /// Top-level outline entries (level-2 headings)
    pub sections: usize,
    /// Sub-entries attached to a section
    pub subsections: usize,
    /// Sub-headings dropped for lack of a preceding section
    pub orphaned_subsections: usize,
    /// Heading identifiers assigned
    pub anchors: usize,
    /// Whether a severity chart was rendered into the page
    pub chart_rendered: bool,
}

/// Sort outcomes deterministically (by file path)
pub fn sort_outcomes(mut outcomes: Vec<PageOutcome>) -> Vec<PageOutcome> {
    outcomes.sort_by(|a, b| a.file.cmp(&b.file));
    outcomes
}

/// Render outcomes as text output
pub fn render_text(outcomes: &[PageOutcome]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<40} {:>8} {:>12} {:>8} {:>7} {:>5}\n",
        "FILE", "SECTIONS", "SUBSECTIONS", "ORPHANED", "ANCHORS", "CHART"
    ));

    for outcome in outcomes {
        output.push_str(&format!(
            "{:<40} {:>8} {:>12} {:>8} {:>7} {:>5}\n",
            truncate_or_pad(&outcome.file, 40),
            outcome.sections,
            outcome.subsections,
            outcome.orphaned_subsections,
            outcome.anchors,
            if outcome.chart_rendered { "yes" } else { "no" },
        ));
    }

    output
}

/// Render outcomes as JSON output
pub fn render_json(outcomes: &[PageOutcome]) -> String {
    serde_json::to_string_pretty(outcomes).unwrap_or_else(|_| "[]".to_string())
}

/// Truncate or pad string to fixed width
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.len() > width {
        format!("{}...", &s[..width.saturating_sub(3)])
    } else {
        format!("{:<width$}", s, width = width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(file: &str) -> PageOutcome {
        PageOutcome {
            file: file.to_string(),
            sections: 2,
            subsections: 3,
            orphaned_subsections: 0,
            anchors: 5,
            chart_rendered: true,
        }
    }

    #[test]
    fn test_outcomes_sort_by_file() {
        let sorted = sort_outcomes(vec![outcome("b.html"), outcome("a.html")]);
        let files: Vec<&str> = sorted.iter().map(|o| o.file.as_str()).collect();
        assert_eq!(files, vec!["a.html", "b.html"]);
    }

    #[test]
    fn test_text_output_is_stable() {
        let outcomes = vec![outcome("a.html")];
        assert_eq!(render_text(&outcomes), render_text(&outcomes));
        assert!(render_text(&outcomes).contains("a.html"));
    }

    #[test]
    fn test_json_round_trips() {
        let outcomes = vec![outcome("a.html")];
        let parsed: Vec<PageOutcome> = serde_json::from_str(&render_json(&outcomes)).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].file, "a.html");
        assert!(parsed[0].chart_rendered);
    }
}
