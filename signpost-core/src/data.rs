//! Report data model
//!
//! Serde model of the telemetry data object consumed by the chart
//! drawer. Field names follow the exporter's wire format (`Name`,
//! `Telemetry`, `projected_risk`); unknown fields are ignored so newer
//! exporters keep working.
//!
//! Global invariants enforced:
//! - Severity labels keep exporter order (insertion-ordered map)
//! - Dataset construction never fails and never re-sorts rows

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The data object supplied alongside a report page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData {
    pub telemetry: TelemetrySummary,
    #[serde(default)]
    pub servers: Vec<ServerRecord>,
}

/// Severity roll-up across all servers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySummary {
    /// Severity label to total count, in exporter order
    pub all: IndexMap<String, u64>,
}

/// One server entry of the data object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Telemetry")]
    pub telemetry: ServerTelemetry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerTelemetry {
    pub projected_risk: f64,
}

/// A two-column chart dataset: column labels plus ordered rows
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDataset {
    pub columns: [&'static str; 2],
    pub rows: Vec<(String, f64)>,
}

/// Build the severity dataset fed to the pie chart:
/// `("Severity", "Count")` over `telemetry.all` in map order.
pub fn severity_dataset(telemetry: &TelemetrySummary) -> ChartDataset {
    ChartDataset {
        columns: ["Severity", "Count"],
        rows: telemetry
            .all
            .iter()
            .map(|(label, count)| (label.clone(), *count as f64))
            .collect(),
    }
}

/// Build the server-risk dataset: `("Server", "Risk")` over the server
/// list in input order.
///
/// Constructed for API consumers; the pipeline renders no chart from it.
pub fn server_risk_dataset(servers: &[ServerRecord]) -> ChartDataset {
    ChartDataset {
        columns: ["Server", "Risk"],
        rows: servers
            .iter()
            .map(|s| (s.name.clone(), s.telemetry.projected_risk))
            .collect(),
    }
}

/// Load a report data object from a JSON file
pub fn load_report_data(path: &Path) -> Result<ReportData> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read data file: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse data file: {}", path.display()))
}
