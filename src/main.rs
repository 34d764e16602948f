//! `noaa-current` binary: polls api.weather.gov and prints each presentation
//! event as one JSON line on stdout.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use noaa_current::{
    Aggregator, NoaaClient, NoaaCurrentConfig, PeerBus, PresentationChannel, PresentationEvent,
    Runtime, Schedule, SystemClock, telemetry,
};

#[derive(Debug, Parser)]
#[command(name = "noaa-current", version, about = "Current weather conditions from NOAA")]
struct Cli {
    /// Configuration file, defaults to the user config directory
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Never fetch; only react to payloads pushed by peers
    #[arg(long)]
    notifications_only: bool,
}

async fn print_events(mut events: broadcast::Receiver<PresentationEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!("Failed to serialize presentation event: {}", e),
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Printer lagged, skipped {} events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = NoaaCurrentConfig::load_from_path(cli.config)
        .with_context(|| "Failed to load configuration")?;
    if cli.notifications_only {
        config.notifications_only = true;
    }

    telemetry::init(&config.logging, cli.verbose);

    let client = NoaaClient::new(&config.api).with_context(|| "Failed to build NOAA client")?;
    let bus = PeerBus::default();
    let presentation = PresentationChannel::default();
    let printer = tokio::spawn(print_events(presentation.subscribe()));

    let aggregator = Aggregator::new(&config, Arc::new(SystemClock), bus.clone(), presentation)
        .with_context(|| "Invalid location or display settings")?;
    let mut runtime = Runtime::new(client, aggregator, Schedule::from_config(&config), &bus);

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        if shutdown_tx.send(()).is_err() {
            debug!("Runtime already stopped");
        }
    });

    info!(
        "Tracking {:?} as '{}'",
        config.location_point()?,
        config.instance_name
    );
    runtime.run(shutdown_rx).await;

    drop(runtime);
    printer.abort();
    Ok(())
}
