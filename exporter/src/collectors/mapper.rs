//! Table-driven RPC -> gauge mapper refreshed on every scrape.

use std::collections::HashMap;
use std::time::Duration;

use futures::future::join_all;
use prometheus::{Gauge, GaugeVec, Opts, Registry};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time;
use tracing::{debug, warn};

use super::table::{FieldKind, FieldSpec};
use crate::rpc::{RpcError, RpcGateway};

/// Label value used when a labelled field could not be read.
pub const ERROR_LABEL: &str = "error";

/// Label value used when the node did not answer within the deadline.
pub const TIMEOUT_LABEL: &str = "timeout";

/// Per-call deadline applied when none is configured.
pub const DEFAULT_CALL_DEADLINE: Duration = Duration::from_secs(5);

enum BoundMetric {
    Value(Gauge),
    Label(GaugeVec),
}

struct BoundField {
    spec: FieldSpec,
    metric: BoundMetric,
}

/// What one refresh learned about a single field.
enum Reading<'a> {
    Found(&'a Value),
    /// The call succeeded but the pointer matched nothing.
    Missing,
    Failed(&'a RpcError),
}

impl BoundField {
    /// Writes `reading` into the metric.
    ///
    /// For labelled gauges `current` is the label value published by the
    /// previous refresh. The new series is set before the old one is
    /// removed, so a concurrent gather never sees the family empty.
    fn apply(&self, reading: Reading<'_>, current: &mut Option<String>) {
        match &self.metric {
            BoundMetric::Value(gauge) => {
                let value = match reading {
                    Reading::Found(value) => numeric(value),
                    Reading::Missing | Reading::Failed(_) => None,
                };
                gauge.set(value.unwrap_or(-1.0));
            }
            BoundMetric::Label(vec) => {
                let (text, value) = match reading {
                    Reading::Found(value) => match label_text(value) {
                        Some(text) => (text, 1.0),
                        None => (ERROR_LABEL.to_string(), 0.0),
                    },
                    Reading::Missing => (ERROR_LABEL.to_string(), 0.0),
                    Reading::Failed(e) => (failure_label(e), 0.0),
                };

                vec.with_label_values(&[text.as_str()]).set(value);
                let previous = current.replace(text);
                if let Some(previous) = previous {
                    if current.as_deref() != Some(previous.as_str()) {
                        let _ = vec.remove_label_values(&[previous.as_str()]);
                    }
                }
            }
        }
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn label_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Label carried by a labelled gauge whose call failed.
///
/// A node-reported error keeps its message (e.g. `getHealth` answering
/// "Node is unhealthy"); transport-level failures collapse to a fixed value.
fn failure_label(error: &RpcError) -> String {
    match error {
        _ if error.is_timeout() => TIMEOUT_LABEL.to_string(),
        RpcError::Rpc { message, .. } => message.clone(),
        _ => ERROR_LABEL.to_string(),
    }
}

/// Copies one field of each configured RPC result into a gauge.
///
/// Every distinct method in the table is called once per [`refresh`], all
/// concurrently and each bounded by the call deadline, so a refresh takes
/// about as long as the slowest single call. On failure, numeric gauges
/// read `-1` and labelled gauges carry a single failure series, so a scrape
/// always returns every metric.
///
/// [`refresh`]: FieldMapper::refresh
pub struct FieldMapper<G> {
    rpc: G,
    fields: Vec<BoundField>,
    /// Distinct methods in table order.
    methods: Vec<&'static str>,
    deadline: Duration,
    /// Published label value per field. Held for the whole refresh.
    labels: Mutex<Vec<Option<String>>>,
}

impl<G: RpcGateway> FieldMapper<G> {
    /// Creates one gauge per field and registers it into `registry`.
    pub fn register(
        rpc: G,
        fields: Vec<FieldSpec>,
        registry: &Registry,
    ) -> Result<Self, prometheus::Error> {
        let mut bound = Vec::with_capacity(fields.len());
        let mut methods = Vec::new();
        for spec in fields {
            let opts = Opts::new(spec.name, spec.help);
            let metric = match spec.kind {
                FieldKind::Value => {
                    let gauge = Gauge::with_opts(opts)?;
                    registry.register(Box::new(gauge.clone()))?;
                    BoundMetric::Value(gauge)
                }
                FieldKind::Label(label) => {
                    let vec = GaugeVec::new(opts, &[label])?;
                    registry.register(Box::new(vec.clone()))?;
                    BoundMetric::Label(vec)
                }
            };
            if !methods.contains(&spec.method) {
                methods.push(spec.method);
            }
            bound.push(BoundField { spec, metric });
        }

        let labels = Mutex::new(vec![None; bound.len()]);
        Ok(Self {
            rpc,
            fields: bound,
            methods,
            deadline: DEFAULT_CALL_DEADLINE,
            labels,
        })
    }

    /// Sets the deadline applied to each RPC call of a refresh.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().map(|f| &f.spec)
    }

    /// Calls every method in the table and updates the gauges.
    ///
    /// A scrape that arrives while another refresh is running waits for it
    /// and returns without calling the node again.
    pub async fn refresh(&self) {
        let mut labels = match self.labels.try_lock() {
            Ok(labels) => labels,
            Err(_) => {
                let _in_flight = self.labels.lock().await;
                return;
            }
        };

        let calls = self.methods.iter().map(|&method| async move {
            let result = match time::timeout(self.deadline, self.rpc.call_value(method)).await {
                Ok(result) => result,
                Err(_) => Err(RpcError::Timeout {
                    method: method.to_string(),
                    timeout: self.deadline,
                }),
            };
            if let Err(e) = &result {
                warn!("failed to fetch {method}: {e}");
            }
            (method, result)
        });
        let results: HashMap<&'static str, Result<Value, RpcError>> =
            join_all(calls).await.into_iter().collect();

        for (field, current) in self.fields.iter().zip(labels.iter_mut()) {
            let reading = match results.get(field.spec.method) {
                Some(Ok(result)) => match result.pointer(field.spec.pointer) {
                    Some(value) => Reading::Found(value),
                    None => {
                        debug!(
                            method = field.spec.method,
                            pointer = field.spec.pointer,
                            "field unavailable"
                        );
                        Reading::Missing
                    }
                },
                Some(Err(e)) => Reading::Failed(e),
                None => Reading::Missing,
            };
            field.apply(reading, current);
        }
    }
}
