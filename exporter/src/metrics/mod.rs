//! Metrics and instrumentation for the exporter.
//!
//! This module defines the Prometheus metrics written by the slot watcher,
//! the [`MetricsSink`] seam the watcher writes through, and a small HTTP
//! exporter that serves `/metrics` in Prometheus text format.
//!
//! Typical usage:
//!
//! ```ignore
//! use std::sync::Arc;
//! use exporter::metrics::{MetricsRegistry, run_prometheus_http_server};
//!
//! let registry = Arc::new(MetricsRegistry::new()?);
//! let mapper = Arc::new(FieldMapper::register(rpc.clone(), default_fields(), registry.registry())?);
//!
//! tokio::spawn(run_prometheus_http_server(registry.clone(), mapper, addr));
//!
//! // The watcher writes through the sink:
//! let sink = Arc::new(registry.slots.clone());
//! ```

pub mod prometheus;
pub mod sink;

pub use prometheus::{MetricsRegistry, SlotMetrics, run_prometheus_http_server};
pub use sink::{MetricsSink, SlotStatus, WatchGauge};
