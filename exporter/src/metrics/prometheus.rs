//! Prometheus-backed metrics and HTTP exporter.
//!
//! This module defines a [`MetricsRegistry`] that owns a Prometheus
//! registry (namespaced `solana_`) and the strongly-typed slot metrics
//! written by the watcher, and an async HTTP exporter that serves
//! `/metrics` using `hyper`.

use std::{convert::Infallible, net::SocketAddr, sync::Arc};

use bytes::Bytes;
use http_body_util::Full;
use hyper::{
    Method, Request, Response, StatusCode, body::Incoming, header, server::conn::http1,
    service::service_fn,
};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use prometheus::{self, Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use super::sink::{MetricsSink, SlotStatus, WatchGauge};
use crate::collectors::FieldMapper;
use crate::rpc::RpcGateway;

const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Metrics written by the slot watcher.
///
/// Gauges mirror the last successful `getEpochInfo`; the counter vec is
/// keyed by `(status, nodekey)` and only ever grows.
#[derive(Clone)]
pub struct SlotMetrics {
    pub confirmed_transactions_total: IntGauge,
    pub confirmed_slot_height: IntGauge,
    pub confirmed_epoch_number: IntGauge,
    pub confirmed_epoch_first_slot: IntGauge,
    pub confirmed_epoch_last_slot: IntGauge,
    pub leader_slots_total: IntCounterVec,
}

impl SlotMetrics {
    /// Registers slot metrics into the given `Registry`.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let gauge = |name: &str, help: &str| -> Result<IntGauge, prometheus::Error> {
            let g = IntGauge::with_opts(Opts::new(name, help))?;
            registry.register(Box::new(g.clone()))?;
            Ok(g)
        };

        let confirmed_transactions_total = gauge(
            "confirmed_transactions_total",
            "Total number of transactions processed since genesis (max confirmation)",
        )?;
        let confirmed_slot_height = gauge(
            "confirmed_slot_height",
            "Last confirmed slot height processed by watcher routine (max confirmation)",
        )?;
        let confirmed_epoch_number =
            gauge("confirmed_epoch_number", "Current epoch (max confirmation)")?;
        let confirmed_epoch_first_slot = gauge(
            "confirmed_epoch_first_slot",
            "Current epoch's first slot (max confirmation)",
        )?;
        let confirmed_epoch_last_slot = gauge(
            "confirmed_epoch_last_slot",
            "Current epoch's last slot (max confirmation)",
        )?;

        let leader_slots_total = IntCounterVec::new(
            Opts::new(
                "leader_slots_total",
                "Number of leader slots per leader, grouped by skip status (max confirmation)",
            ),
            &["status", "nodekey"],
        )?;
        registry.register(Box::new(leader_slots_total.clone()))?;

        Ok(Self {
            confirmed_transactions_total,
            confirmed_slot_height,
            confirmed_epoch_number,
            confirmed_epoch_first_slot,
            confirmed_epoch_last_slot,
            leader_slots_total,
        })
    }

    fn gauge(&self, gauge: WatchGauge) -> &IntGauge {
        match gauge {
            WatchGauge::TransactionCount => &self.confirmed_transactions_total,
            WatchGauge::SlotHeight => &self.confirmed_slot_height,
            WatchGauge::EpochNumber => &self.confirmed_epoch_number,
            WatchGauge::EpochFirstSlot => &self.confirmed_epoch_first_slot,
            WatchGauge::EpochLastSlot => &self.confirmed_epoch_last_slot,
        }
    }
}

impl MetricsSink for SlotMetrics {
    fn set_gauge(&self, gauge: WatchGauge, value: u64) {
        // Slots fit in i64 for the foreseeable lifetime of any cluster.
        self.gauge(gauge)
            .set(i64::try_from(value).unwrap_or(i64::MAX));
    }

    fn inc_leader_slot(&self, status: SlotStatus, leader: &str) {
        self.leader_slots_total
            .with_label_values(&[status.as_label(), leader])
            .inc();
    }
}

/// Wrapper around a Prometheus registry and the slot metrics.
///
/// This is the main handle you pass around in the exporter. It can be
/// wrapped in an [`Arc`] and shared across tasks.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,
    pub slots: SlotMetrics,
}

impl MetricsRegistry {
    /// Creates a new `MetricsRegistry` with a fresh `solana`-prefixed
    /// `Registry` and registers the slot metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("solana".to_string()), None)?;
        let slots = SlotMetrics::register(&registry)?;
        Ok(Self { registry, slots })
    }

    /// Underlying registry, for registering additional collectors.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in this registry into the Prometheus text format.
    pub fn gather_text(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!("failed to encode Prometheus metrics: {e}");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

/// Runs an HTTP server that exposes Prometheus metrics.
///
/// The server listens on `addr` and serves:
///
/// - `GET /metrics`: refreshes the scrape-time node gauges through
///   `mapper`, then renders the whole registry in text format;
/// - `GET /health`: plain `ok` for liveness probes.
///
/// All other paths return 404. The slot watcher's metrics are never
/// touched here; scrapes only read them.
pub async fn run_prometheus_http_server<G>(
    metrics: Arc<MetricsRegistry>,
    mapper: Arc<FieldMapper<G>>,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    G: RpcGateway + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("metrics exporter listening on http://{addr}/metrics");

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let metrics = metrics.clone();
        let mapper = mapper.clone();

        tokio::spawn(async move {
            let svc = service_fn(move |req| {
                let metrics = metrics.clone();
                let mapper = mapper.clone();
                handle_request(req, metrics, mapper)
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, svc).await {
                tracing::debug!("prometheus HTTP connection error: {err}");
            }
        });
    }
}

async fn handle_request<G: RpcGateway>(
    req: Request<Incoming>,
    metrics: Arc<MetricsRegistry>,
    mapper: Arc<FieldMapper<G>>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let response = match (req.method(), req.uri().path()) {
        (&Method::GET, "/metrics") => {
            mapper.refresh().await;
            text_response(StatusCode::OK, metrics.gather_text(), TEXT_CONTENT_TYPE)
        }
        (&Method::GET, "/health") => text_response(StatusCode::OK, "ok".to_string(), "text/plain"),
        _ => text_response(StatusCode::NOT_FOUND, "not found".to_string(), "text/plain"),
    };
    Ok(response)
}

fn text_response(status: StatusCode, body: String, content_type: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static(content_type),
    );
    response
}
