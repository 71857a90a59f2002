use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use clubfeed::config::Config;
use clubfeed::site::build_site;

#[derive(Parser, Debug)]
#[command(
    name = "clubfeed",
    about = "Builds a static fan site from the club's RSS feeds and YouTube channels"
)]
struct Args {
    /// Configuration file (missing file means defaults)
    #[arg(long, value_name = "PATH", default_value = "clubfeed.toml")]
    config: PathBuf,

    /// Output directory for the generated site
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Directory holding the downloaded feeds
    #[arg(long, value_name = "DIR")]
    feeds_dir: Option<PathBuf>,

    /// Build from cached feeds without downloading
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG overrides; progress is shown at info by default
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    if let Some(output) = args.output {
        config.build.output_dir = output;
    }
    if let Some(feeds_dir) = args.feeds_dir {
        config.build.feeds_dir = feeds_dir;
    }
    if args.offline {
        config.fetch.enabled = false;
    }

    let report = build_site(&config, Utc::now().date_naive())
        .await
        .context("Site build failed")?;

    println!(
        "Generated {} ({} news, {} photos, {} agenda, {} videos{})",
        config.build.output_dir.join("index.html").display(),
        report.news,
        report.photos,
        report.agenda,
        report.videos,
        if report.sitemap { ", sitemap" } else { "" }
    );
    Ok(())
}
