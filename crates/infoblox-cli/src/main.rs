//! Infoblox CLI
//!
//! Manages HOST records on an Infoblox appliance through WAPI. Connection
//! settings come from flags or the matching `INFOBLOX_*` environment
//! variables; results are printed to stdout as JSON, logs go to stderr.

mod commands;
mod error;

use anyhow::Result;
use clap::Parser;
use commands::Command;
use infoblox_client::config::{DEFAULT_MAX_RESULTS, DEFAULT_TIMEOUT_SECS, DEFAULT_WAPI_VERSION};
use infoblox_client::{InfobloxClient, InfobloxConfig};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Command-line access to Infoblox HOST records
#[derive(Parser, Debug)]
#[command(name = "infoblox", version, about, long_about = None)]
struct Cli {
    /// Appliance URL, e.g. https://gm.example.com
    #[arg(long, env = "INFOBLOX_URL")]
    url: String,

    #[arg(long, env = "INFOBLOX_USERNAME")]
    username: String,

    #[arg(long, env = "INFOBLOX_PASSWORD", hide_env_values = true)]
    password: String,

    #[arg(long, env = "INFOBLOX_WAPI_VERSION", default_value = DEFAULT_WAPI_VERSION)]
    wapi_version: String,

    /// Skip TLS certificate verification (self-signed appliances)
    #[arg(long)]
    insecure: bool,

    #[arg(long, env = "INFOBLOX_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Result cap for searches, also the page size with `find --all`
    #[arg(long, env = "INFOBLOX_MAX_RESULTS", default_value_t = DEFAULT_MAX_RESULTS)]
    max_results: u32,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn config(&self) -> InfobloxConfig {
        let mut config = InfobloxConfig::new(&self.url, &self.username, &self.password);
        config.wapi_version = self.wapi_version.clone();
        config.verify_tls = !self.insecure;
        config.timeout_secs = self.timeout_secs;
        config.max_results = self.max_results;
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();

    info!("Connecting to {}", config.wapi_url());
    debug!("Configuration: {:?}", config);

    let client = InfobloxClient::new(&config)?;
    let output = commands::run(&client, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
