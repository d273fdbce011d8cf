mod app;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use poolview::config::{PoolConfig, PoolOptions};
use poolview::monitor::parse_feed;
use poolview::pool::PoolLayout;
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::{FeedSource, PoolViewApp};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON file with layout constants and pool options.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay a recorded JSON-lines monitor feed instead of simulating a cluster.
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Number of hosts in the simulated cluster.
    #[arg(long, default_value_t = 14)]
    hosts: u32,

    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Only show hosts whose platform matches this regex.
    #[arg(long)]
    platform_filter: Option<String>,

    #[arg(long)]
    clients_attract_hosts: bool,

    /// Show full host names instead of the part before the first dot.
    #[arg(long)]
    keep_domains: bool,

    #[arg(long)]
    hide_job_lines: bool,
}

impl Args {
    fn apply(&self, options: &mut PoolOptions) {
        if let Some(filter) = &self.platform_filter {
            options.platform_filter = Some(filter.clone());
        }
        options.clients_attract_hosts |= self.clients_attract_hosts;
        options.suppress_domain &= !self.keep_domains;
        options.show_job_lines &= !self.hide_job_lines;
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("poolview=info")),
        )
        .init();

    let mut config = match &args.config {
        Some(path) => PoolConfig::load(path)
            .with_context(|| format!("failed to load pool config from {}", path.display()))?,
        None => PoolConfig::default(),
    };
    args.apply(&mut config.options);

    let source = match &args.replay {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read feed {}", path.display()))?;
            let events = parse_feed(&raw)
                .with_context(|| format!("failed to parse feed {}", path.display()))?;
            FeedSource::replay(events)
        }
        None => FeedSource::synthetic(args.hosts, args.seed),
    };
    let layout = PoolLayout::new(config, args.seed).context("invalid pool options")?;
    info!(source = %source.describe(), seed = args.seed, "starting pool view");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1280.0, 820.0]),
        ..Default::default()
    };

    eframe::run_native(
        "poolview",
        options,
        Box::new(move |cc| Ok(Box::new(PoolViewApp::new(cc, layout, source)))),
    )
    .map_err(|error| anyhow!("failed to run the pool view: {error}"))
}
