use anyhow::Result;
use capture_relay::config::{Args, Config};
use capture_relay::history::HistorySuppressor;
use capture_relay::server::RelayServer;
use capture_relay_common::InternalBus;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    info!("Capture Relay v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_args(args)?;
    let features: Vec<&str> = config
        .capabilities
        .features()
        .iter()
        .map(|feature| feature.as_str())
        .collect();
    info!("Base URL: {}", config.base_url);
    info!("Host features: [{}]", features.join(", "));
    info!(
        "Toolbar action: {:?}",
        config.capabilities.action_fallback(&config.base_url)
    );
    if HistorySuppressor::new(&config.capabilities, config.base_url.as_str()).is_some() {
        info!("Extension pages are kept out of history");
    }

    let server = RelayServer::bind(&config, InternalBus::new()).await?;
    info!("Listening on ws://{}", server.local_addr()?);

    tokio::select! {
        result = server.run() => {
            error!("Relay server exited: {:?}", result);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C, shutting down gracefully...");
        }
    }

    Ok(())
}
