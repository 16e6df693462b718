//! Severity chart rendering
//!
//! Draws the severity pie chart through the `plotters` charting library
//! (SVG backend). The drawer hands the dataset to the library as-is:
//! degenerate data (empty rows, zero totals) fails or degrades according
//! to the library's own semantics.
//!
//! Readiness contract: rendering is only reachable through a
//! successfully constructed [`ChartRenderer`], so a chart can never be
//! drawn before initialization has completed. The pipeline constructs
//! the renderer once per run and passes it down explicitly.

use crate::data::ChartDataset;
use anyhow::{anyhow, bail, Result};
use plotters::prelude::*;

/// Default wedge palette, matching the report stylesheet's severity
/// band colors plus two spares for long label sets.
pub const DEFAULT_PALETTE: &[&str] = &[
    "#ef4444", "#f97316", "#eab308", "#22c55e", "#3b82f6", "#8b5cf6",
];

pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 360;
pub const DEFAULT_HOLE: f64 = 0.4;
pub const DEFAULT_INSET_LEFT: u32 = 10;
pub const DEFAULT_INSET_TOP: u32 = 30;

/// Chart geometry and styling options
#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    /// Donut hole radius as a fraction of the pie radius, `0.0 <= h < 1.0`
    pub hole: f64,
    /// Left inset of the chart area, in pixels
    pub inset_left: u32,
    /// Top inset of the chart area, in pixels
    pub inset_top: u32,
    /// Wedge colors as `#rrggbb` strings, cycled over the rows
    pub palette: Vec<String>,
}

impl Default for ChartOptions {
    fn default() -> Self {
        ChartOptions {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            hole: DEFAULT_HOLE,
            inset_left: DEFAULT_INSET_LEFT,
            inset_top: DEFAULT_INSET_TOP,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Parse a `#rrggbb` color string
pub fn parse_color(s: &str) -> Result<RGBColor> {
    let hex = s
        .strip_prefix('#')
        .ok_or_else(|| anyhow!("color \"{}\" must start with '#'", s))?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("color \"{}\" must be six hex digits", s);
    }
    let channel = |at: usize| u8::from_str_radix(&hex[at..at + 2], 16).unwrap_or(0);
    Ok(RGBColor(channel(0), channel(2), channel(4)))
}

/// A ready severity-chart renderer: validated geometry and a parsed
/// palette. Construct once, render any number of charts.
#[derive(Debug)]
pub struct ChartRenderer {
    width: u32,
    height: u32,
    hole: f64,
    inset_left: u32,
    inset_top: u32,
    colors: Vec<RGBColor>,
}

impl ChartRenderer {
    /// Validate options and ready the renderer.
    ///
    /// This is the explicit initialization step: rendering methods live
    /// on the returned value only.
    pub fn new(options: &ChartOptions) -> Result<Self> {
        if !(64..=4096).contains(&options.width) || !(64..=4096).contains(&options.height) {
            bail!(
                "chart size {}x{} out of range (64..=4096 per side)",
                options.width,
                options.height
            );
        }
        if !(0.0..1.0).contains(&options.hole) {
            bail!(
                "chart hole ratio {} out of range (0.0 inclusive to 1.0 exclusive)",
                options.hole
            );
        }
        if options.inset_left >= options.width || options.inset_top >= options.height {
            bail!("chart insets leave no drawing area");
        }
        if options.palette.is_empty() {
            bail!("chart palette must not be empty");
        }
        let colors = options
            .palette
            .iter()
            .map(|c| parse_color(c))
            .collect::<Result<Vec<_>>>()?;

        Ok(ChartRenderer {
            width: options.width,
            height: options.height,
            hole: options.hole,
            inset_left: options.inset_left,
            inset_top: options.inset_top,
            colors,
        })
    }

    /// Render the severity dataset as a pie chart, returning SVG markup.
    ///
    /// Wedges keep row order; colors cycle through the palette. Library
    /// errors propagate with no interpretation.
    pub fn render_severity_pie(&self, dataset: &ChartDataset) -> Result<String> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height))
                .into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| anyhow!("failed to fill chart background: {}", e))?;

            let plot_w = self.width - self.inset_left;
            let plot_h = self.height - self.inset_top;
            let center = (
                (self.inset_left + plot_w / 2) as i32,
                (self.inset_top + plot_h / 2) as i32,
            );
            let radius = f64::from(plot_w.min(plot_h)) * 0.375;

            let sizes: Vec<f64> = dataset.rows.iter().map(|(_, value)| *value).collect();
            let labels: Vec<String> = dataset.rows.iter().map(|(label, _)| label.clone()).collect();
            let colors: Vec<RGBColor> = (0..dataset.rows.len())
                .map(|i| self.colors[i % self.colors.len()])
                .collect();

            let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
            pie.start_angle(-90.0);
            pie.label_style(("sans-serif", 14).into_font());
            root.draw(&pie)
                .map_err(|e| anyhow!("failed to draw severity chart: {}", e))?;

            if self.hole > 0.0 {
                let hole_px = (radius * self.hole).round() as i32;
                root.draw(&Circle::new(center, hole_px, WHITE.filled()))
                    .map_err(|e| anyhow!("failed to draw chart hole: {}", e))?;
            }

            root.present()
                .map_err(|e| anyhow!("failed to finalize severity chart: {}", e))?;
        }
        Ok(svg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(rows: &[(&str, f64)]) -> ChartDataset {
        ChartDataset {
            columns: ["Severity", "Count"],
            rows: rows
                .iter()
                .map(|(label, value)| (label.to_string(), *value))
                .collect(),
        }
    }

    #[test]
    fn test_parse_color_roundtrip() {
        assert_eq!(parse_color("#ef4444").unwrap(), RGBColor(0xef, 0x44, 0x44));
        assert!(parse_color("ef4444").is_err());
        assert!(parse_color("#ef44").is_err());
        assert!(parse_color("#ef44zz").is_err());
    }

    #[test]
    fn test_new_rejects_out_of_range_hole() {
        let options = ChartOptions {
            hole: 1.0,
            ..ChartOptions::default()
        };
        let err = ChartRenderer::new(&options).unwrap_err();
        assert!(err.to_string().contains("hole"));
    }

    #[test]
    fn test_new_rejects_bad_palette() {
        let options = ChartOptions {
            palette: vec!["red".to_string()],
            ..ChartOptions::default()
        };
        assert!(ChartRenderer::new(&options).is_err());
    }

    #[test]
    fn test_new_rejects_empty_palette() {
        let options = ChartOptions {
            palette: Vec::new(),
            ..ChartOptions::default()
        };
        assert!(ChartRenderer::new(&options).is_err());
    }

    #[test]
    fn test_render_produces_svg_with_labels() {
        let renderer = ChartRenderer::new(&ChartOptions::default()).unwrap();
        let svg = renderer
            .render_severity_pie(&dataset(&[("Low", 2.0), ("High", 1.0)]))
            .unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Low"));
        assert!(svg.contains("High"));
    }

    #[test]
    fn test_palette_cycles_over_many_rows() {
        let options = ChartOptions {
            palette: vec!["#112233".to_string()],
            ..ChartOptions::default()
        };
        let renderer = ChartRenderer::new(&options).unwrap();
        let rows: Vec<(String, f64)> = (0..8).map(|i| (format!("s{}", i), 1.0)).collect();
        let dataset = ChartDataset {
            columns: ["Severity", "Count"],
            rows,
        };
        assert!(renderer.render_severity_pie(&dataset).is_ok());
    }
}
