//! Exporter library crate.
//!
//! This crate provides the building blocks for a Prometheus exporter that
//! watches a Solana node and accounts for every leader slot:
//!
//! - a JSON-RPC gateway with a structured error taxonomy (`rpc`),
//! - the slot reconciliation loop and leader schedule cache (`watcher`),
//! - Prometheus metrics, the sink seam and the `/metrics` server (`metrics`),
//! - table-driven scrape-time node gauges (`collectors`),
//! - and a top-level configuration (`config`).
//!
//! The `solana-exporter` binary composes these pieces.

pub mod collectors;
pub mod config;
pub mod metrics;
pub mod rpc;
pub mod watcher;

// Re-export top-level configuration types.
pub use config::{ExporterConfig, MetricsConfig, RpcConfig, WatcherConfig};

// Re-export the RPC gateway and its HTTP implementation.
pub use rpc::{Commitment, EpochInfo, HttpRpcClient, RpcError, RpcGateway};

// Re-export the slot watcher.
pub use watcher::{AbortReason, LeaderSchedule, SlotWatcher, TickOutcome, WatchError};

// Re-export metrics registry, sink and exporter.
pub use metrics::{
    MetricsRegistry, MetricsSink, SlotMetrics, SlotStatus, WatchGauge, run_prometheus_http_server,
};

pub use collectors::{FieldMapper, FieldSpec, default_fields};

/// Slot watcher wired to the HTTP gateway and Prometheus metrics.
pub type DefaultSlotWatcher =
    SlotWatcher<std::sync::Arc<HttpRpcClient>, std::sync::Arc<SlotMetrics>>;

/// Field mapper wired to the HTTP gateway.
pub type DefaultFieldMapper = FieldMapper<std::sync::Arc<HttpRpcClient>>;
