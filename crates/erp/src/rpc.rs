//! Odoo JSON-RPC transport.
//!
//! Every call is a `POST {url}/jsonrpc` envelope addressed to either the
//! `common` service (login) or the `object` service (`execute_kw`).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ErpError;

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcFault>,
}

#[derive(Debug, Deserialize)]
struct RpcFault {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<RpcFaultData>,
}

#[derive(Debug, Deserialize)]
struct RpcFaultData {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

const SESSION_EXPIRED_CODE: i64 = 100;

impl RpcFault {
    fn into_error(self) -> ErpError {
        let name = self.data.as_ref().and_then(|data| data.name.clone());
        let message = self
            .data
            .and_then(|data| data.message)
            .filter(|message| !message.is_empty())
            .unwrap_or(self.message);

        let rejected = self.code == SESSION_EXPIRED_CODE
            || name.as_deref().is_some_and(|name| {
                name.ends_with("AccessDenied") || name.contains("SessionExpired")
            });

        if rejected {
            ErpError::SessionRejected(message)
        } else {
            ErpError::Remote { name, message }
        }
    }
}

#[derive(Debug)]
pub struct JsonRpcTransport {
    http: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    next_id: AtomicU64,
}

impl JsonRpcTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ErpError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| ErpError::Transport(error.to_string()))?;
        Ok(Self::with_client(http, base_url, timeout))
    }

    pub fn with_client(http: reqwest::Client, base_url: &str, timeout: Duration) -> Self {
        Self {
            http,
            endpoint: format!("{}/jsonrpc", base_url.trim_end_matches('/')),
            timeout,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn call(&self, service: &str, method: &str, args: Value) -> Result<Value, ErpError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "method": "call",
            "params": {"service": service, "method": method, "args": args},
            "id": id,
        });

        let response = self.http.post(&self.endpoint).json(&body).send().await.map_err(|error| {
            if error.is_timeout() {
                ErpError::Timeout(self.timeout)
            } else {
                ErpError::from(error)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ErpError::Transport(format!(
                "{service}.{method} returned HTTP {}",
                status.as_u16()
            )));
        }

        let payload: RpcResponse = response.json().await?;
        match (payload.result, payload.error) {
            (_, Some(fault)) => Err(fault.into_error()),
            (Some(result), None) => Ok(result),
            (None, None) => Err(ErpError::Decode(format!(
                "{service}.{method} response has neither result nor error"
            ))),
        }
    }
}
