//! Signpost CLI - static report page finishing tool

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic outcome ordering
// - Identical input yields byte-for-byte identical output

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use signpost_core::config;
use signpost_core::{
    collect_report_pages, finish_file, load_report_data, render_json, render_text, sort_outcomes,
    ChartRenderer, OutputTarget, PageOutcome, ReportData,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "signpost")]
#[command(
    about = "Finishes static HTML report pages: heading anchors, numbered outline, severity chart"
)]
#[command(version = env!("SIGNPOST_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Finish report pages (a single page or a directory of pages)
    Render {
        /// Path to a report page or a directory to scan
        path: PathBuf,

        /// Path to the telemetry data object (JSON); omit to skip charts
        #[arg(long)]
        data: Option<PathBuf>,

        /// Output format for the outcome summary
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Write finished pages under this directory (default: <root>/.signpost)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Overwrite the source pages instead of writing to an output directory
        #[arg(long)]
        in_place: bool,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Validate or display configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without rendering
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            path,
            data,
            format,
            out_dir,
            in_place,
            config: config_path,
        } => {
            // Normalize path to absolute
            let normalized_path = if path.is_relative() {
                std::env::current_dir()?.join(&path)
            } else {
                path
            };

            if !normalized_path.exists() {
                anyhow::bail!("Path does not exist: {}", normalized_path.display());
            }
            if in_place && out_dir.is_some() {
                anyhow::bail!("--in-place and --out-dir are mutually exclusive");
            }

            // Project root anchors config discovery and relative output paths
            let project_root = if normalized_path.is_dir() {
                normalized_path.clone()
            } else {
                normalized_path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| normalized_path.clone())
            };

            let resolved_config = config::load_and_resolve(&project_root, config_path.as_deref())
                .context("failed to load configuration")?;

            if let Some(config_path) = &resolved_config.config_path {
                eprintln!("Using config: {}", config_path.display());
            }

            let report_data: Option<ReportData> =
                data.as_deref().map(load_report_data).transpose()?;

            // Explicit chart initialization: rendering is only reachable
            // once this has completed
            let charts = ChartRenderer::new(&resolved_config.chart)?;

            let pages: Vec<PathBuf> = if normalized_path.is_file() {
                vec![normalized_path.clone()]
            } else {
                collect_report_pages(&normalized_path)?
                    .into_iter()
                    .filter(|p| resolved_config.should_include(p))
                    .collect()
            };

            if pages.is_empty() {
                println!("No report pages found under {}", normalized_path.display());
                return Ok(());
            }

            let default_out = project_root.join(".signpost");
            let target = if in_place {
                OutputTarget::InPlace
            } else {
                OutputTarget::OutDir {
                    root: &project_root,
                    out_dir: out_dir.as_deref().unwrap_or(&default_out),
                }
            };

            let progress = ProgressBar::new(pages.len() as u64);
            progress.set_style(
                ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                    .context("invalid progress template")?,
            );

            let results: Vec<anyhow::Result<PageOutcome>> = pages
                .par_iter()
                .map(|page| {
                    let outcome = finish_file(
                        page,
                        report_data.as_ref(),
                        &resolved_config,
                        &charts,
                        target,
                    );
                    progress.inc(1);
                    outcome
                })
                .collect();
            progress.finish_and_clear();

            let mut outcomes = Vec::new();
            let mut skipped = 0usize;
            for result in results {
                match result {
                    Ok(outcome) => outcomes.push(outcome),
                    Err(e) => {
                        eprintln!("warning: skipping page: {:#}", e);
                        skipped += 1;
                    }
                }
            }
            let outcomes = sort_outcomes(outcomes);

            match format {
                OutputFormat::Text => {
                    print!("{}", render_text(&outcomes));
                }
                OutputFormat::Json => {
                    println!("{}", render_json(&outcomes));
                }
            }

            if skipped > 0 {
                eprintln!("Skipped {} page(s) due to finishing errors", skipped);
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref());

                match resolved {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref())
                    .context("failed to load configuration")?;

                println!("Configuration:");
                if let Some(ref p) = resolved.config_path {
                    println!("  Source: {}", p.display());
                } else {
                    println!("  Source: defaults (no config file found)");
                }
                println!();
                println!("Selectors:");
                println!("  toc: {}", resolved.toc_container);
                println!("  chart: {}", resolved.chart_container);
                println!();
                println!("Chart:");
                println!("  size: {}x{}", resolved.chart.width, resolved.chart.height);
                println!("  hole: {}", resolved.chart.hole);
                println!("  palette: {}", resolved.chart.palette.join(", "));
                println!();
                println!("Filters:");
                println!(
                    "  include: {}",
                    if resolved.include.is_some() {
                        "custom patterns"
                    } else {
                        "all pages"
                    }
                );
                println!(
                    "  exclude: active ({} patterns)",
                    if resolved.config_path.is_some() {
                        "custom"
                    } else {
                        "default"
                    }
                );
            }
        },
    }

    Ok(())
}
