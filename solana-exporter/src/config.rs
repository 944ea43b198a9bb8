//! Command-line configuration.
//!
//! Flags override `exporter::ExporterConfig::default()`; each flag can also
//! be given through the environment variable shown in `--help`.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use exporter::{Commitment, ExporterConfig};

#[derive(Parser, Debug)]
#[command(name = "solana-exporter")]
#[command(about = "Exports Solana leader slot production and node gauges to Prometheus")]
pub struct Cli {
    /// Solana RPC URI (including protocol and path).
    #[arg(long = "rpc-uri", alias = "rpcURI", env = "SOLANA_RPC_URL")]
    pub rpc_uri: String,

    /// Listen address for the /metrics endpoint.
    #[arg(long, env = "EXPORTER_LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub addr: SocketAddr,

    /// Seconds between slot watcher ticks.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_secs: u64,

    /// Per-request RPC timeout in seconds.
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,

    /// Commitment level for epoch info and leader schedules.
    #[arg(long, default_value = "finalized")]
    pub commitment: Commitment,
}

impl Cli {
    pub fn into_config(self) -> ExporterConfig {
        let mut cfg = ExporterConfig::default();
        cfg.rpc.url = self.rpc_uri;
        cfg.rpc.timeout = Duration::from_secs(self.timeout_secs);
        cfg.watcher.interval = Duration::from_secs(self.interval_secs);
        cfg.watcher.commitment = self.commitment;
        cfg.metrics.listen_addr = self.addr;
        cfg
    }
}
