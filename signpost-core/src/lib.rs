//! Signpost core library - finishes static HTML report pages
//!
//! Finishing a page means scanning its level-2/level-3 headings,
//! assigning anchor identifiers, inserting a numbered table of contents
//! (plus inline per-section copies), and rendering the severity pie
//! chart from the accompanying telemetry data object.

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Finishing is a single deterministic pass per page
// - No global mutable state; charts render only through an initialized renderer
// - No randomness, clocks, threads, or async
// - Identical input yields byte-for-byte identical output

pub mod chart;
pub mod config;
pub mod data;
pub mod outline;
pub mod page;
pub mod report;
pub mod toc;

pub use chart::{ChartOptions, ChartRenderer};
pub use config::ResolvedConfig;
pub use data::{load_report_data, server_risk_dataset, severity_dataset, ReportData};
pub use report::{render_json, render_text, sort_outcomes, PageOutcome};

use anyhow::{Context, Result};
use outline::{build_outline, Heading};
use page::Page;
use std::path::{Path, PathBuf};

/// A finished page: the completed text plus its outcome counters
#[derive(Debug)]
pub struct FinishedPage {
    pub html: String,
    pub sections: usize,
    pub subsections: usize,
    pub orphaned_subsections: usize,
    pub anchors: usize,
    pub chart_rendered: bool,
}

/// Where finished pages are written
#[derive(Debug, Clone, Copy)]
pub enum OutputTarget<'a> {
    /// Overwrite the source page
    InPlace,
    /// Mirror the page's path relative to `root` under `out_dir`
    OutDir { root: &'a Path, out_dir: &'a Path },
}

/// Finish one page: scan, index, insert the outline, draw the chart.
///
/// All inputs are explicit; nothing is read from ambient state. Passing
/// `None` for `data` skips the chart step. Finishing the returned text a
/// second time duplicates the inserted lists (documented behavior of the
/// outline insertion, see [`toc`]).
pub fn finish_page(
    html: String,
    data: Option<&ReportData>,
    config: &ResolvedConfig,
    charts: &ChartRenderer,
) -> Result<FinishedPage> {
    let page = Page::scan(html);

    let headings: Vec<Heading> = page
        .headings()
        .iter()
        .enumerate()
        .map(|(i, h)| Heading::new(h.level, h.text.clone(), i))
        .collect();
    let outline = build_outline(&headings);

    let mut edits = Vec::with_capacity(headings.len() + outline.entries.len() + 2);
    for heading in &headings {
        edits.push(page.assign_id_edit(heading.element, &heading.identifier));
    }
    edits.extend(toc::outline_edits(&page, &outline, &config.toc_container)?);

    let chart_rendered = match data {
        Some(data) => {
            let dataset = severity_dataset(&data.telemetry);
            let svg = charts.render_severity_pie(&dataset)?;
            edits.push(page.append_into_container_edit(&config.chart_container, &svg)?);
            true
        }
        None => false,
    };

    let sections = outline.entries.len();
    let subsections = outline.subsection_count();
    let orphaned_subsections = outline.orphaned;
    let anchors = headings.len();
    let html = page.apply(edits)?;

    Ok(FinishedPage {
        html,
        sections,
        subsections,
        orphaned_subsections,
        anchors,
        chart_rendered,
    })
}

/// Finish one page file and write the result to the output target
pub fn finish_file(
    path: &Path,
    data: Option<&ReportData>,
    config: &ResolvedConfig,
    charts: &ChartRenderer,
    target: OutputTarget<'_>,
) -> Result<PageOutcome> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read page: {}", path.display()))?;

    let finished = finish_page(raw, data, config, charts)
        .with_context(|| format!("failed to finish page: {}", path.display()))?;

    let out_path = match target {
        OutputTarget::InPlace => path.to_path_buf(),
        OutputTarget::OutDir { root, out_dir } => {
            let rel = match path.strip_prefix(root) {
                Ok(rel) => rel.to_path_buf(),
                Err(_) => PathBuf::from(
                    path.file_name().map(|n| n.to_os_string()).unwrap_or_default(),
                ),
            };
            out_dir.join(rel)
        }
    };

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory: {}", parent.display()))?;
    }
    std::fs::write(&out_path, &finished.html)
        .with_context(|| format!("failed to write finished page: {}", out_path.display()))?;

    Ok(PageOutcome {
        file: path.display().to_string(),
        sections: finished.sections,
        subsections: finished.subsections,
        orphaned_subsections: finished.orphaned_subsections,
        anchors: finished.anchors,
        chart_rendered: finished.chart_rendered,
    })
}

/// Check if a file is a report page by extension
fn is_report_page(filename: &str) -> bool {
    let lower = filename.to_ascii_lowercase();
    lower.ends_with(".html") || lower.ends_with(".htm")
}

/// Returns true for directory names that should not be traversed
fn is_skipped_dir(name: &str) -> bool {
    name.starts_with('.')
        || name == "node_modules"
        || name == "dist"
        || name == "build"
        || name == "coverage"
}

/// Collect report pages from a path (file or directory)
///
/// Directories are walked recursively, skipping hidden directories and
/// vendored/output trees. Results sort for deterministic order.
pub fn collect_report_pages(path: &Path) -> Result<Vec<PathBuf>> {
    let mut pages = Vec::new();

    if path.is_file() {
        if let Some(filename) = path.file_name().and_then(|n| n.to_str()) {
            if is_report_page(filename) {
                pages.push(path.to_path_buf());
            }
        }
    } else if path.is_dir() {
        collect_report_pages_recursive(path, &mut pages)?;
    }

    pages.sort();

    Ok(pages)
}

/// Process one directory entry, pushing report pages or recursing into dirs
fn process_dir_entry(
    path: PathBuf,
    metadata: std::fs::Metadata,
    pages: &mut Vec<PathBuf>,
) -> Result<()> {
    use std::ffi::OsStr;

    if metadata.is_symlink() {
        return Ok(());
    }

    if metadata.is_dir() {
        if let Some(name) = path.file_name().and_then(|n: &OsStr| n.to_str()) {
            if is_skipped_dir(name) {
                return Ok(());
            }
        }
        collect_report_pages_recursive(&path, pages)?;
    } else if metadata.is_file() {
        if let Some(filename) = path.file_name().and_then(|n: &OsStr| n.to_str()) {
            if is_report_page(filename) {
                pages.push(path);
            }
        }
    }

    Ok(())
}

/// Recursively collect report pages from a directory
fn collect_report_pages_recursive(dir: &Path, pages: &mut Vec<PathBuf>) -> Result<()> {
    for entry_result in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let entry = entry_result?;
        let path = entry.path();
        let metadata = std::fs::symlink_metadata(&path)
            .with_context(|| format!("Failed to read metadata: {}", path.display()))?;
        process_dir_entry(path, metadata, pages)?;
    }

    Ok(())
}
