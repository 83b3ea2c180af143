use crate::error::{ProtocolError, ResponseError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Serialize)]
pub struct Request<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: Value,
    pub id: u64,
}

impl<'a> Request<'a> {
    pub fn new(method: &'a str, params: Value, id: u64) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
            id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorObject {
    code: Option<i64>,
    #[serde(default)]
    message: Option<Value>,
}

impl ErrorObject {
    fn message(self) -> String {
        match self.message {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
        }
    }
}

/// Extracts the `result` of a JSON-RPC response body, or classifies its
/// `error` object. A `result` of `null` is a valid (empty) success.
pub fn decode_response(body: &[u8]) -> Result<Value> {
    let envelope: Value = serde_json::from_slice(body).map_err(ProtocolError::InvalidJson)?;
    let mut envelope = match envelope {
        Value::Object(map) => map,
        other => {
            return Err(ProtocolError::Malformed(format!("expected an object, got {other}")).into())
        }
    };

    match envelope.remove("error") {
        Some(Value::Null) | None => {}
        Some(error) => {
            let error: ErrorObject = serde_json::from_value(error)
                .map_err(|e| ProtocolError::Malformed(format!("invalid error object: {e}")))?;
            let code = error
                .code
                .ok_or_else(|| ProtocolError::Malformed("error object has no code".to_string()))?;
            return Err(ResponseError::new(code, error.message()).into());
        }
    }

    envelope
        .remove("result")
        .ok_or_else(|| ProtocolError::Malformed("neither result nor error present".to_string()).into())
}

/// One JSON-RPC endpoint on the device, reached over a pooled HTTPS client.
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: String,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(endpoint: String, verify_tls: bool) -> Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(!verify_tls)
            .build()?;
        Ok(Self {
            http,
            endpoint,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends exactly one request and returns the decoded `result`.
    pub async fn call(&self, method: &str, params: Value, timeout: Duration) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!("-> {method} (id {id})");
        let resp = self
            .http
            .post(&self.endpoint)
            .timeout(timeout)
            .json(&Request::new(method, params, id))
            .send()
            .await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        debug!("<- {method} (id {id}) {status}, {} bytes", body.len());
        decode_response(&body)
    }
}
