//! Command-line arguments and the validated configuration built from them

use anyhow::{Context, Result, anyhow};
use capture_relay_common::RuntimeCapabilities;
use capture_relay_common::validation::validate_base_url;
use clap::Parser;
use std::net::SocketAddr;
use url::Url;

/// CLI arguments for the relay
#[derive(Parser, Debug)]
#[command(name = "scrapbook-relay")]
#[command(about = "Background command relay for the page capture extension", long_about = None)]
#[command(version)]
pub struct Args {
    /// Address to accept WebSocket connections on
    #[arg(short, long, env = "SCRAPBOOK_RELAY_LISTEN", default_value = "127.0.0.1:9180")]
    pub listen: String,

    /// Extension root URL reported by getBaseUrl
    #[arg(
        short,
        long,
        env = "SCRAPBOOK_RELAY_BASE_URL",
        default_value = "moz-extension://webscrapbook/"
    )]
    pub base_url: String,

    /// Comma-separated host features (all when omitted)
    #[arg(long, env = "SCRAPBOOK_RELAY_FEATURES")]
    pub features: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Configuration for the relay
#[derive(Debug, Clone)]
pub struct Config {
    /// Socket address the listener binds to
    pub listen_addr: SocketAddr,

    /// Extension root URL, always ending in "/"
    pub base_url: String,

    /// Host features probed at startup
    pub capabilities: RuntimeCapabilities,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        let listen_addr: SocketAddr = args
            .listen
            .parse()
            .with_context(|| format!("Invalid listen address: {}", args.listen))?;

        validate_base_url(&args.base_url)?;
        let base_url = Url::parse(&args.base_url)
            .with_context(|| format!("Invalid base URL: {}", args.base_url))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("Base URL cannot hold extension paths: {}", base_url));
        }

        let capabilities = match args.features.as_deref() {
            Some(list) => RuntimeCapabilities::parse_list(list)?,
            None => RuntimeCapabilities::all(),
        };

        Ok(Self {
            listen_addr,
            base_url: args.base_url,
            capabilities,
        })
    }
}
