use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use strikerbot_fixture_scraper::{
    config::{ScraperConfig, MAX_HORIZON_HOURS},
    pipeline::{run_and_write, run_pass, write_status, StatusReport},
    snapshot::{save_snapshot, SnapshotFetcher},
    web::{self, AppState},
};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse the latest snapshot and write fixtures, players and status JSON
    Parse {
        /// Snapshot HTML to read
        #[arg(short, long)]
        snapshot: Option<PathBuf>,
        /// Directory for the JSON outputs
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
        /// Look-ahead window in hours
        #[arg(long, value_parser = clap::value_parser!(i64).range(1..=MAX_HORIZON_HOURS))]
        horizon: Option<i64>,
    },
    /// Download a fresh snapshot, then parse it
    Fetch {
        /// Dashboard URL to download
        #[arg(short, long)]
        url: Option<String>,
        /// Only save the snapshot
        #[arg(long)]
        no_parse: bool,
    },
    /// Serve the status page and JSON endpoints
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn parse_and_report(config: &ScraperConfig) -> Result<()> {
    let report = run_and_write(config, Local::now());
    if !report.is_success() {
        anyhow::bail!(
            "Extraction pass failed: {}",
            report.error_message.unwrap_or_default()
        );
    }
    info!(
        "Live: {} | Upcoming: {} | Total in window: {}",
        report.live_matches, report.upcoming_matches, report.fixtures_count
    );
    Ok(())
}

async fn fetch(config: &ScraperConfig, url: &str, no_parse: bool) -> Result<()> {
    let fetcher = SnapshotFetcher::new(&config.scraping)?;
    let html = match fetcher.fetch(url).await {
        Ok(html) => html,
        Err(e) => {
            let report = StatusReport::failure(e.to_string(), &config.window, Utc::now());
            if let Err(write_err) = write_status(&config.output.dir, &report) {
                error!("Could not write error status: {}", write_err);
            }
            return Err(e).with_context(|| format!("Failed to fetch {}", url));
        }
    };

    save_snapshot(&html, &config.snapshot, Local::now())?;

    if no_parse {
        return Ok(());
    }
    parse_and_report(config)
}

async fn serve(config: ScraperConfig) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port)
        .parse()
        .context("Invalid web host or port")?;

    let now = Local::now();
    let initial_report = match run_pass(&config, now) {
        Ok(output) => output.report,
        Err(e) => StatusReport::failure(e.to_string(), &config.window, now.with_timezone(&Utc)),
    };

    let state = AppState::new(config, initial_report);
    let shutdown_rx = web::serve(state, addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tokio::select! {
        _ = shutdown_rx => info!("Shutdown requested"),
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }
    Ok(())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("strikerbot_fixture_scraper=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ScraperConfig::from_env();

    match cli.command {
        Commands::Parse {
            snapshot,
            out_dir,
            horizon,
        } => {
            if let Some(snapshot) = snapshot {
                config.snapshot.path = snapshot;
            }
            if let Some(out_dir) = out_dir {
                config.output.dir = out_dir;
            }
            if let Some(horizon) = horizon {
                config.window.horizon_hours = horizon;
            }
            parse_and_report(&config)?;
        }
        Commands::Fetch { url, no_parse } => {
            let url = url.unwrap_or_else(|| config.scraping.url.clone());
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(fetch(&config, &url, no_parse))?;
        }
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.web.port = port;
            }
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(serve(config))?;
        }
    }

    Ok(())
}
