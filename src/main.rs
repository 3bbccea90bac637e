use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubi_m3u::{config::Config, pipeline::Orchestrator};

#[derive(Parser)]
#[command(name = "tubi-m3u")]
#[command(version)]
#[command(about = "Harvest the Tubi live catalog into M3U playlists and XMLTV guides")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Country codes to harvest (overrides config file)
    #[arg(long, value_name = "CC", num_args = 1..)]
    countries: Vec<String>,

    /// Directory for generated files (overrides config file)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("tubi_m3u={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tubi-m3u v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    if !cli.countries.is_empty() {
        config.regions = cli.countries;
    }
    if let Some(output_dir) = cli.output_dir {
        config.output.directory = output_dir;
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    let regions = config.region_list();
    info!(
        "Regions: {}",
        regions
            .iter()
            .map(|r| r.code())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let orchestrator = Orchestrator::from_config(&config)?;
    tokio::select! {
        summary = orchestrator.run(&regions) => {
            if summary.succeeded() == 0 {
                error!("No region produced output");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; regions still in flight were abandoned");
        }
    }
    Ok(())
}
