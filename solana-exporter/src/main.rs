// solana-exporter/src/main.rs

//! Exporter binary.
//!
//! Wires the `exporter` crate together:
//!
//! - one shared JSON-RPC client for the configured node,
//! - the slot watcher as a background task,
//! - the Prometheus exporter on `/metrics` (with scrape-time node gauges).
//!
//! The process exits non-zero if the watcher hits a fatal inconsistency or
//! the metrics server fails, and exits cleanly on Ctrl-C.

mod config;

use std::sync::Arc;

use clap::Parser;
use tokio::signal;

use exporter::{
    DefaultFieldMapper, DefaultSlotWatcher, HttpRpcClient, MetricsRegistry, default_fields,
    run_prometheus_http_server,
};

use config::Cli;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "solana_exporter=info,exporter=info".to_string()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let cfg = cli.into_config();

    // ---------------------------
    // RPC client
    // ---------------------------

    let rpc = Arc::new(
        HttpRpcClient::new(cfg.rpc.url.clone(), cfg.rpc.timeout)
            .map_err(|e| format!("failed to create RPC client: {e}"))?,
    );
    tracing::info!(url = %cfg.rpc.url, timeout = ?cfg.rpc.timeout, "using Solana RPC");

    // ---------------------------
    // Metrics
    // ---------------------------

    let metrics = Arc::new(
        MetricsRegistry::new()
            .map_err(|e| format!("failed to initialise metrics registry: {e}"))?,
    );

    let mapper: Arc<DefaultFieldMapper> = Arc::new(
        DefaultFieldMapper::register(rpc.clone(), default_fields(), metrics.registry())
            .map_err(|e| format!("failed to register node gauges: {e}"))?
            .with_deadline(cfg.rpc.timeout),
    );
    tracing::info!(fields = mapper.fields().count(), "registered scrape-time node gauges");

    // ---------------------------
    // Slot watcher + exporter
    // ---------------------------

    let watcher = DefaultSlotWatcher::new(
        cfg.watcher.clone(),
        rpc.clone(),
        Arc::new(metrics.slots.clone()),
    );
    let mut watcher_task = tokio::spawn(watcher.run());

    let addr = cfg.metrics.listen_addr;
    let mut server_task = tokio::spawn(run_prometheus_http_server(metrics.clone(), mapper, addr));

    let result = tokio::select! {
        res = &mut watcher_task => match res {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(format!("slot watcher: {e}")),
            Err(e) => Err(format!("slot watcher task failed: {e}")),
        },
        res = &mut server_task => match res {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(format!("metrics HTTP server error: {e}")),
            Err(e) => Err(format!("metrics server task failed: {e}")),
        },
        _ = shutdown_signal() => Ok(()),
    };

    watcher_task.abort();
    server_task.abort();
    result
}

/// Waits for Ctrl-C and returns, used for graceful shutdown.
async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
