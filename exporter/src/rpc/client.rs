//! HTTP-based Solana JSON-RPC client.
//!
//! Every call is a single JSON-RPC 2.0 `POST` to the node's RPC URL:
//!
//! ```json
//! { "jsonrpc": "2.0", "id": 1, "method": "getEpochInfo", "params": [{"commitment": "finalized"}] }
//! ```
//!
//! and the response is either
//!
//! ```json
//! { "jsonrpc": "2.0", "id": 1, "result": { ... } }
//! ```
//!
//! or an error object `{ "code": -32004, "message": "..." }` under `error`.
//! Failures are mapped onto [`RpcError`] so callers can log them uniformly.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::error::RpcError;
use super::gateway::RpcGateway;
use super::types::{Commitment, EpochInfo, RawLeaderSchedule};

/// JSON-RPC client for a single Solana node.
///
/// The underlying `reqwest::Client` is pooled and cheap to share; wrap the
/// whole client in an `Arc` to hand it to both the slot watcher and the
/// scrape-time field mapper.
pub struct HttpRpcClient {
    url: String,
    client: Client,
    timeout: Duration,
    request_id: AtomicU64,
}

impl HttpRpcClient {
    /// Constructs a client for `url` (including scheme and path) with a
    /// per-request `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        Self::with_builder(url, timeout, Client::builder())
    }

    fn with_builder(
        url: impl Into<String>,
        timeout: Duration,
        builder: ClientBuilder,
    ) -> Result<Self, RpcError> {
        let client = builder
            .timeout(timeout)
            .build()
            .map_err(|e| RpcError::Transport {
                method: "<client>".to_string(),
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            url: url.into(),
            client,
            timeout,
            request_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issues one JSON-RPC request and decodes its `result` as `R`.
    pub async fn call<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<R, RpcError> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        let resp = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(method, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RpcError::Transport {
                method: method.to_string(),
                message: format!("node returned HTTP status {status}"),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| self.transport_error(method, e))?;

        tracing::trace!(method, body = %String::from_utf8_lossy(&body), "rpc response");

        decode_response(method, &body)
    }

    fn transport_error(&self, method: &str, err: reqwest::Error) -> RpcError {
        if err.is_timeout() {
            RpcError::Timeout {
                method: method.to_string(),
                timeout: self.timeout,
            }
        } else {
            RpcError::Transport {
                method: method.to_string(),
                message: err.to_string(),
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    /// Missing and `null` both decode to `Value::Null`.
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Splits a raw response body into `result` or a structured error.
fn decode_response<R: DeserializeOwned>(method: &str, body: &[u8]) -> Result<R, RpcError> {
    let envelope: JsonRpcResponse = serde_json::from_slice(body)
        .map_err(|e| RpcError::decode(method, format!("invalid JSON-RPC envelope: {e}")))?;

    if let Some(err) = envelope.error {
        return Err(RpcError::Rpc {
            method: method.to_string(),
            code: err.code,
            message: err.message,
        });
    }

    serde_json::from_value(envelope.result)
        .map_err(|e| RpcError::decode(method, format!("unexpected result shape: {e}")))
}

impl RpcGateway for HttpRpcClient {
    async fn get_epoch_info(&self, commitment: Commitment) -> Result<EpochInfo, RpcError> {
        self.call("getEpochInfo", json!([{ "commitment": commitment }]))
            .await
    }

    async fn get_leader_schedule(
        &self,
        slot: u64,
        commitment: Commitment,
    ) -> Result<Option<RawLeaderSchedule>, RpcError> {
        self.call(
            "getLeaderSchedule",
            json!([slot, { "commitment": commitment }]),
        )
        .await
    }

    async fn get_confirmed_blocks(&self, start: u64, end: u64) -> Result<Vec<u64>, RpcError> {
        self.call("getConfirmedBlocks", json!([start, end])).await
    }

    async fn call_value(&self, method: &str) -> Result<Value, RpcError> {
        self.call(method, json!([])).await
    }
}
