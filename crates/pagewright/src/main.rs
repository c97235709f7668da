//! Pagewright CLI - builds a static site from a directory of plain-text files.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use pagewright_static::SiteBuilder;

mod config;

#[derive(Parser)]
#[command(name = "pagewright")]
#[command(about = "Static site generator for plain-text content directories")]
#[command(version)]
pub struct Cli {
    /// Site display name
    #[arg(long)]
    sitename: Option<String>,

    /// Records per listing page (0 disables pagination)
    #[arg(long)]
    paginatedby: Option<usize>,

    /// Path to site.toml config file
    #[arg(short, long, default_value = "site.toml")]
    config: PathBuf,

    /// Content directory
    #[arg(long)]
    content: Option<PathBuf>,

    /// Template directory (built-in templates when unset)
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Static assets directory
    #[arg(long = "static-dir")]
    static_dir: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Render detail pages in parallel
    #[arg(long)]
    parallel: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let file_config = config::load_config(&cli.config)?;
    let builder = SiteBuilder::new(config::resolve(&cli, file_config))?;

    let settings = builder.config();
    tracing::info!(
        "Building {} from {} into {}...",
        settings.site_title,
        settings.content_dir.display(),
        settings.output_dir.display()
    );

    let report = builder.build()?;

    tracing::info!(
        "Built {} listing and {} detail pages across {} categories in {}ms",
        report.listing_pages,
        report.detail_pages,
        report.categories,
        report.duration_ms
    );
    if report.skipped > 0 {
        tracing::warn!("Skipped {} unusable content files", report.skipped);
    }
    tracing::info!("Copied {} static files", report.assets);
    tracing::info!("Output: {}", report.output_dir.display());

    Ok(())
}
