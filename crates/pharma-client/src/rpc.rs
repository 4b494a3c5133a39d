//! JSON-RPC 2.0 transport to the ledger node.
//!
//! The same endpoint serves wallet requests (`eth_requestAccounts`,
//! `net_version`) and contract traffic (`eth_call`, `eth_sendTransaction`).
//! Signing is delegated to the node; this client holds no keys.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;
use url::Url;

/// JSON-RPC error code for a request the user declined in the wallet.
pub const USER_REJECTED_CODE: i64 = 4001;

/// JSON-RPC error code for an unsupported method.
pub const METHOD_NOT_FOUND_CODE: i64 = -32601;

/// Errors from a single JSON-RPC exchange.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// The node could not be reached.
    #[error("transport error calling {method}: {source}")]
    Transport {
        method: String,
        source: reqwest::Error,
    },
    /// The node answered with a non-2xx HTTP status.
    #[error("{method} returned HTTP {status}: {body}")]
    Http {
        method: String,
        status: u16,
        body: String,
    },
    /// The node answered with a JSON-RPC error object.
    #[error("{method} failed with code {code}: {message}")]
    Node {
        method: String,
        code: i64,
        message: String,
    },
    /// The response was not a JSON-RPC envelope.
    #[error("malformed response to {method}: {reason}")]
    Malformed { method: String, reason: String },
}

impl RpcError {
    /// The JSON-RPC error code, if the node returned one.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Node { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether the user declined the request in the wallet.
    pub fn is_user_rejection(&self) -> bool {
        self.code() == Some(USER_REJECTED_CODE)
    }

    /// Whether the endpoint itself is unreachable or unhealthy.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Http { .. })
    }
}

/// A JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcTransport {
    http: reqwest::Client,
    url: Url,
    next_id: Arc<AtomicU64>,
}

impl RpcTransport {
    pub fn new(http: reqwest::Client, url: Url) -> Self {
        Self {
            http,
            url,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Send a request and return its `result` member.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });

        tracing::debug!(method, id, endpoint = %self.url, "JSON-RPC request");

        let resp = self
            .http
            .post(self.url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcError::Transport {
                method: method.to_string(),
                source: e,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RpcError::Http {
                method: method.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = resp.json().await.map_err(|e| RpcError::Malformed {
            method: method.to_string(),
            reason: e.to_string(),
        })?;

        if let Some(error) = json.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown RPC error")
                .to_string();
            return Err(RpcError::Node {
                method: method.to_string(),
                code,
                message,
            });
        }

        json.get("result").cloned().ok_or_else(|| RpcError::Malformed {
            method: method.to_string(),
            reason: "response missing 'result' field".to_string(),
        })
    }
}

/// Parse a JSON-RPC hex quantity (`"0x1a"`) into `u64`.
pub fn parse_quantity(value: &Value) -> Option<u64> {
    value
        .as_str()
        .and_then(|s| s.strip_prefix("0x"))
        .and_then(|s| u64::from_str_radix(s, 16).ok())
}
