//! Configuration file support for Signpost
//!
//! Loads project-specific configuration from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.signpostrc.json` in project root
//! 3. `signpost.config.json` in project root
//!
//! All fields are optional. CLI flags take precedence over config file
//! values.

use crate::chart::{self, ChartOptions};
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default exclude patterns applied when no config is specified
const DEFAULT_EXCLUDES: &[&str] = &[
    "**/node_modules/**",
    "**/dist/**",
    "**/build/**",
    "**/coverage/**",
    "**/.signpost/**",
];

/// Default container element id for the outline list
pub const DEFAULT_TOC_CONTAINER: &str = "toc";
/// Default container element id for the severity chart
pub const DEFAULT_CHART_CONTAINER: &str = "severity_chart";

/// Signpost configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignpostConfig {
    /// Glob patterns for pages to include (default: all report pages)
    #[serde(default)]
    pub include: Vec<String>,

    /// Glob patterns for pages to exclude (default: vendored and output trees)
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Container element ids
    #[serde(default)]
    pub selectors: Option<SelectorConfig>,

    /// Chart geometry and palette
    #[serde(default)]
    pub chart: Option<ChartSectionConfig>,
}

/// Container element ids for the two insertion targets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectorConfig {
    /// Outline container id (default: "toc")
    pub toc: Option<String>,
    /// Chart container id (default: "severity_chart")
    pub chart: Option<String>,
}

/// Chart geometry and palette overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChartSectionConfig {
    /// Donut hole ratio (default: 0.4)
    pub hole: Option<f64>,
    /// Chart width in pixels (default: 640)
    pub width: Option<u32>,
    /// Chart height in pixels (default: 360)
    pub height: Option<u32>,
    /// Wedge colors as `#rrggbb` strings
    pub palette: Option<Vec<String>>,
}

/// Resolved configuration with compiled glob patterns
#[derive(Debug)]
pub struct ResolvedConfig {
    /// Compiled include patterns (empty means include all)
    pub include: Option<GlobSet>,
    /// Compiled exclude patterns
    pub exclude: GlobSet,
    /// Outline container element id
    pub toc_container: String,
    /// Chart container element id
    pub chart_container: String,
    /// Chart geometry and palette
    pub chart: ChartOptions,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl SignpostConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(ref c) = self.chart {
            if let Some(hole) = c.hole {
                if !(0.0..1.0).contains(&hole) {
                    anyhow::bail!(
                        "chart.hole must be in [0.0, 1.0) (got {})",
                        hole
                    );
                }
            }
            for (name, value) in [("width", c.width), ("height", c.height)] {
                if let Some(v) = value {
                    if !(64..=4096).contains(&v) {
                        anyhow::bail!("chart.{} must be in 64..=4096 (got {})", name, v);
                    }
                }
            }
            if let Some(ref palette) = c.palette {
                if palette.is_empty() {
                    anyhow::bail!("chart.palette must not be empty");
                }
                for color in palette {
                    chart::parse_color(color)
                        .with_context(|| format!("chart.palette entry \"{}\"", color))?;
                }
            }
        }

        if let Some(ref s) = self.selectors {
            for (name, value) in [("toc", &s.toc), ("chart", &s.chart)] {
                if let Some(id) = value {
                    if id.is_empty() {
                        anyhow::bail!("selectors.{} must not be empty", name);
                    }
                }
            }
        }

        // Validate globs compile
        for pattern in self.include.iter().chain(self.exclude.iter()) {
            Glob::new(pattern).with_context(|| format!("invalid glob pattern \"{}\"", pattern))?;
        }

        Ok(())
    }

    /// Resolve into a usable configuration with compiled globs
    pub fn resolve(&self, config_path: Option<PathBuf>) -> Result<ResolvedConfig> {
        self.validate()?;

        let include = if self.include.is_empty() {
            None
        } else {
            Some(build_globset(&self.include)?)
        };

        let exclude = if self.exclude.is_empty() {
            let defaults: Vec<String> = DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect();
            build_globset(&defaults)?
        } else {
            build_globset(&self.exclude)?
        };

        let defaults = ChartOptions::default();
        let chart = match &self.chart {
            Some(c) => ChartOptions {
                width: c.width.unwrap_or(defaults.width),
                height: c.height.unwrap_or(defaults.height),
                hole: c.hole.unwrap_or(defaults.hole),
                inset_left: defaults.inset_left,
                inset_top: defaults.inset_top,
                palette: c.palette.clone().unwrap_or(defaults.palette),
            },
            None => defaults,
        };

        let (toc_container, chart_container) = match &self.selectors {
            Some(s) => (
                s.toc.clone().unwrap_or_else(|| DEFAULT_TOC_CONTAINER.to_string()),
                s.chart
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CHART_CONTAINER.to_string()),
            ),
            None => (
                DEFAULT_TOC_CONTAINER.to_string(),
                DEFAULT_CHART_CONTAINER.to_string(),
            ),
        };

        Ok(ResolvedConfig {
            include,
            exclude,
            toc_container,
            chart_container,
            chart,
            config_path,
        })
    }
}

impl ResolvedConfig {
    /// Resolved defaults with no config file
    pub fn default_config() -> Result<ResolvedConfig> {
        SignpostConfig::default().resolve(None)
    }

    /// Whether a page path passes the include/exclude filters
    pub fn should_include(&self, path: &Path) -> bool {
        if self.exclude.is_match(path) {
            return false;
        }
        match &self.include {
            Some(include) => include.is_match(path),
            None => true,
        }
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(
            Glob::new(pattern).with_context(|| format!("invalid glob pattern \"{}\"", pattern))?,
        );
    }
    builder.build().context("failed to compile glob patterns")
}

/// Load configuration for a project root, resolving the search order
pub fn load_and_resolve(project_root: &Path, explicit: Option<&Path>) -> Result<ResolvedConfig> {
    let candidate = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => [".signpostrc.json", "signpost.config.json"]
            .iter()
            .map(|name| project_root.join(name))
            .find(|p| p.is_file()),
    };

    match candidate {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config file: {}", path.display()))?;
            let config: SignpostConfig = serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse config file: {}", path.display()))?;
            config.resolve(Some(path))
        }
        None => ResolvedConfig::default_config(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> SignpostConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_defaults_resolve() {
        let resolved = ResolvedConfig::default_config().unwrap();
        assert_eq!(resolved.toc_container, "toc");
        assert_eq!(resolved.chart_container, "severity_chart");
        assert!((resolved.chart.hole - 0.4).abs() < f64::EPSILON);
        assert!(resolved.config_path.is_none());
    }

    #[test]
    fn test_hole_out_of_range_is_rejected() {
        let config = parse(r#"{"chart":{"hole":1.5}}"#);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("chart.hole"));
    }

    #[test]
    fn test_bad_palette_entry_is_rejected() {
        let config = parse(r##"{"chart":{"palette":["#123456","nope"]}}"##);
        let err = config.validate().unwrap_err();
        assert!(format!("{:#}", err).contains("nope"));
    }

    #[test]
    fn test_invalid_glob_is_rejected() {
        let config = parse(r#"{"exclude":["[unclosed"]}"#);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("[unclosed"));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result: std::result::Result<SignpostConfig, _> =
            serde_json::from_str(r#"{"selctors":{}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_selector_overrides_apply() {
        let config = parse(r#"{"selectors":{"toc":"contents"}}"#);
        let resolved = config.resolve(None).unwrap();
        assert_eq!(resolved.toc_container, "contents");
        assert_eq!(resolved.chart_container, "severity_chart");
    }

    #[test]
    fn test_default_excludes_filter_vendored_trees() {
        let resolved = ResolvedConfig::default_config().unwrap();
        assert!(!resolved.should_include(Path::new("site/node_modules/pkg/index.html")));
        assert!(resolved.should_include(Path::new("site/report.html")));
    }

    #[test]
    fn test_include_patterns_narrow_the_set() {
        let config = parse(r#"{"include":["reports/**"]}"#);
        let resolved = config.resolve(None).unwrap();
        assert!(resolved.should_include(Path::new("reports/a.html")));
        assert!(!resolved.should_include(Path::new("docs/a.html")));
    }
}
