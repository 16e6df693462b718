//! End-to-end finishing tests over the repository fixtures

use signpost_core::{
    finish_page, load_report_data, ChartRenderer, ReportData, ResolvedConfig,
};
use std::fs;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture_page() -> String {
    let path = fixture_path("report.html");
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

fn fixture_data() -> ReportData {
    load_report_data(&fixture_path("data.json")).expect("fixture data parses")
}

fn default_setup() -> (ResolvedConfig, ChartRenderer) {
    let config = ResolvedConfig::default_config().expect("defaults resolve");
    let charts = ChartRenderer::new(&config.chart).expect("default chart options are valid");
    (config, charts)
}

#[test]
fn test_finishes_the_fixture_report() {
    let (config, charts) = default_setup();
    let data = fixture_data();

    let finished = finish_page(fixture_page(), Some(&data), &config, &charts).unwrap();

    // One top-level entry per level-2 heading
    assert_eq!(finished.sections, 3);
    assert_eq!(finished.subsections, 3);
    assert_eq!(finished.orphaned_subsections, 0);
    assert_eq!(finished.anchors, 6);
    assert!(finished.chart_rendered);

    // Anchors land on the headings
    assert!(finished.html.contains("<h2 id=\"overview\">Overview</h2>"));
    assert!(finished
        .html
        .contains("<h2 id=\"server_health__\">Server Health!!</h2>"));
    assert!(finished.html.contains("<h3 id=\"raw_counts\">Raw Counts</h3>"));

    // The container holds the full numbered outline
    assert!(finished.html.contains("<nav id=\"toc\"><ul class=\"toc-outline\">"));
    assert!(finished
        .html
        .contains("<a href=\"#server_health__\">2. Server Health!!</a>"));
    assert!(finished.html.contains("<a href=\"#scope\">1.1. Scope</a>"));

    // Sections with children get an inline copy of their child list
    assert!(finished.html.contains(
        "<h2 id=\"overview\">Overview</h2><ul class=\"toc-sublist\">\
         <li><a href=\"#scope\">1.1. Scope</a></li>\
         <li><a href=\"#method\">1.2. Method</a></li></ul>"
    ));
    // A section without children gets none
    assert!(!finished
        .html
        .contains("<h2 id=\"server_health__\">Server Health!!</h2><ul"));

    // The severity chart renders into its container
    let chart_at = finished.html.find("id=\"severity_chart\"").unwrap();
    let svg_at = finished.html.find("<svg").unwrap();
    assert!(svg_at > chart_at);
}

#[test]
fn test_skipping_data_skips_the_chart() {
    let (config, charts) = default_setup();
    let finished = finish_page(fixture_page(), None, &config, &charts).unwrap();
    assert!(!finished.chart_rendered);
    assert!(!finished.html.contains("<svg"));
}

#[test]
fn test_finishing_twice_duplicates_inserted_lists() {
    let (config, charts) = default_setup();
    let data = fixture_data();

    let once = finish_page(fixture_page(), Some(&data), &config, &charts).unwrap();
    let outlines_once = once.html.matches("class=\"toc-outline\"").count();
    let sublists_once = once.html.matches("class=\"toc-sublist\"").count();
    assert_eq!(outlines_once, 1);
    // Overview and Appendix each nest one sublist in the outline and
    // carry one inline copy
    assert_eq!(sublists_once, 4);

    let twice = finish_page(once.html, Some(&data), &config, &charts).unwrap();
    assert_eq!(twice.html.matches("class=\"toc-outline\"").count(), 2 * outlines_once);
    assert_eq!(twice.html.matches("class=\"toc-sublist\"").count(), 2 * sublists_once);
}

#[test]
fn test_orphaned_subsection_is_counted_but_not_rendered() {
    let (config, charts) = default_setup();
    let page = "<div id=\"toc\"></div><h3>Stray</h3><h2>First</h2>".to_string();

    let finished = finish_page(page, None, &config, &charts).unwrap();

    assert_eq!(finished.sections, 1);
    assert_eq!(finished.subsections, 0);
    assert_eq!(finished.orphaned_subsections, 1);
    // The stray heading still gets an anchor, but no outline entry
    assert!(finished.html.contains("<h3 id=\"stray\">Stray</h3>"));
    assert!(!finished.html.contains("Stray</a>"));
}

#[test]
fn test_missing_toc_container_fails_with_its_id() {
    let (config, charts) = default_setup();
    let err = finish_page("<h2>Alone</h2>".to_string(), None, &config, &charts).unwrap_err();
    assert!(format!("{:#}", err).contains("toc"));
}

#[test]
fn test_missing_chart_container_fails_only_when_data_is_given() {
    let (config, charts) = default_setup();
    let page = "<div id=\"toc\"></div><h2>Only</h2>";
    let data = fixture_data();

    assert!(finish_page(page.to_string(), None, &config, &charts).is_ok());
    let err = finish_page(page.to_string(), Some(&data), &config, &charts).unwrap_err();
    assert!(format!("{:#}", err).contains("severity_chart"));
}

#[test]
fn test_finished_output_is_deterministic() {
    let (config, charts) = default_setup();
    let data = fixture_data();

    let a = finish_page(fixture_page(), Some(&data), &config, &charts).unwrap();
    let b = finish_page(fixture_page(), Some(&data), &config, &charts).unwrap();
    assert_eq!(a.html, b.html);
}
