use anyhow::Result;
use clap::Parser;
use tracing::info;

use tickmon::application::monitor::MarketMonitor;
use tickmon::application::sink::LogSink;
use tickmon::infrastructure::gateio::{
    build_http_client, GateioFuturesSource, GateioSpotSource, MarketDataSource,
};
use tickmon::infrastructure::store::FileStore;
use tickmon::shared::config::{AppConfig, ConfigLoader};
use tickmon::shared::types::SourceKind;

#[derive(Parser, Debug)]
#[command(version, about = "Gate.io ticker & funding-rate anomaly monitor")]
struct Args {
    /// Path to config file (optional)
    #[arg(long)]
    config: Option<String>,

    /// Endpoint family to poll: spot or futures
    #[arg(long)]
    source: Option<String>,

    /// Instruments to track (comma-separated, replaces the persisted set)
    #[arg(long)]
    instruments: Option<String>,

    /// Polling interval in seconds
    #[arg(long)]
    interval: Option<u64>,

    /// Directory for persisted history/config
    #[arg(long)]
    state_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    // Load base configuration from file if provided
    let mut app_cfg = if let Some(config_path) = &args.config {
        ConfigLoader::load_config(config_path)?
    } else {
        AppConfig::default()
    };

    // CLI args override the config file
    if let Some(source) = &args.source {
        app_cfg.source = match source.as_str() {
            "spot" => SourceKind::Spot,
            "futures" => SourceKind::Futures,
            other => anyhow::bail!("Unknown source '{}', expected spot or futures", other),
        };
    }
    if let Some(state_dir) = args.state_dir {
        app_cfg.state_dir = state_dir;
    }

    let store = FileStore::new(&app_cfg.state_dir)
        .map_err(|e| anyhow::anyhow!("Failed to open state dir: {}", e))?;
    let http_client = build_http_client(app_cfg.request_timeout_secs)?;

    let source: Box<dyn MarketDataSource> = match app_cfg.source {
        SourceKind::Spot => Box::new(GateioSpotSource::new(
            http_client,
            app_cfg.base_url.clone(),
        )),
        SourceKind::Futures => Box::new(GateioFuturesSource::new(
            http_client,
            app_cfg.base_url.clone(),
        )),
    };

    let (mut monitor, handle) = MarketMonitor::new(app_cfg, source, store, Box::new(LogSink));

    let instruments = args
        .instruments
        .map(|raw| raw.split(',').map(|s| s.trim().to_string()).collect());
    monitor
        .apply_overrides(instruments, args.interval)
        .map_err(|e| anyhow::anyhow!("Invalid override: {}", e))?;

    let monitor_task = tokio::spawn(monitor.run());

    tokio::signal::ctrl_c().await?;
    info!("Interrupt received, shutting down");
    handle.shutdown().await;

    monitor_task
        .await?
        .map_err(|e| anyhow::anyhow!("Monitor failed: {}", e))?;
    Ok(())
}
