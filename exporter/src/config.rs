//! Top-level configuration for the exporter.
//!
//! This module aggregates configuration for:
//!
//! - the Solana RPC endpoint (URL + per-call timeout),
//! - the slot watcher (`WatcherConfig`),
//! - the metrics exporter (listen address).
//!
//! Binaries build an `ExporterConfig` from defaults and override fields
//! from CLI flags or environment variables.

use std::net::SocketAddr;
use std::time::Duration;

pub use crate::watcher::WatcherConfig;

/// Configuration for the Solana JSON-RPC client.
#[derive(Clone, Debug)]
pub struct RpcConfig {
    /// RPC URI including protocol and path, e.g. `"http://127.0.0.1:8899"`.
    pub url: String,
    /// Deadline for each individual RPC call.
    pub timeout: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8899".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Configuration for the Prometheus metrics exporter.
#[derive(Clone, Debug)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP server to.
    pub listen_addr: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

/// Top-level configuration for the exporter.
#[derive(Clone, Debug, Default)]
pub struct ExporterConfig {
    pub rpc: RpcConfig,
    pub watcher: WatcherConfig,
    pub metrics: MetricsConfig,
}
