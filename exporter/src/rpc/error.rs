use std::time::Duration;

/// Errors returned by a single JSON-RPC call.
///
/// The slot watcher treats every variant the same way (log, abort the
/// tick, retry on the next one); the split exists for logs and tests.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// No usable response: connection failure or non-2xx HTTP status.
    #[error("{method}: transport error: {message}")]
    Transport { method: String, message: String },

    /// The per-call deadline expired before the node answered.
    #[error("{method}: timed out after {timeout:?}")]
    Timeout { method: String, timeout: Duration },

    /// The body was not a JSON-RPC envelope, or `result` had the wrong shape.
    #[error("{method}: failed to decode response: {message}")]
    Decode { method: String, message: String },

    /// The node answered with a JSON-RPC error object.
    #[error("{method}: RPC error {code}: {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },
}

impl RpcError {
    pub fn decode(method: &str, message: impl Into<String>) -> Self {
        RpcError::Decode {
            method: method.to_string(),
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RpcError::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_method_and_code() {
        let err = RpcError::Rpc {
            method: "getConfirmedBlocks".to_string(),
            code: -32004,
            message: "Block not available for slot 42".to_string(),
        };

        let text = err.to_string();
        assert!(text.contains("getConfirmedBlocks"));
        assert!(text.contains("-32004"));
        assert!(!err.is_timeout());
    }

    #[test]
    fn timeout_is_classified() {
        let err = RpcError::Timeout {
            method: "getEpochInfo".to_string(),
            timeout: Duration::from_secs(5),
        };
        assert!(err.is_timeout());
        assert!(err.to_string().contains("5s"));
    }
}
