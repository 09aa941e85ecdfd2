use std::time::Duration;

use aria_core::config::ErpConfig;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::error::ErpError;
use crate::gateway::RecordSource;
use crate::query::{SearchDomain, SearchOptions};
use crate::rpc::JsonRpcTransport;
use crate::session::{SessionCache, SessionId};

/// Authenticated connection to one Odoo database.
#[derive(Debug)]
pub struct OdooClient {
    transport: JsonRpcTransport,
    database: String,
    username: String,
    password: SecretString,
    sessions: SessionCache,
}

impl OdooClient {
    pub fn from_config(config: &ErpConfig) -> Result<Self, ErpError> {
        let transport =
            JsonRpcTransport::new(&config.url, Duration::from_secs(config.timeout_secs))?;
        Ok(Self::new(
            transport,
            config.database.clone(),
            config.username.clone(),
            config.password.clone(),
        ))
    }

    pub fn new(
        transport: JsonRpcTransport,
        database: String,
        username: String,
        password: SecretString,
    ) -> Self {
        Self { transport, database, username, password, sessions: SessionCache::new() }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Returns the cached session, logging in on first use.
    pub async fn authenticate(&self) -> Result<SessionId, ErpError> {
        self.sessions.get_or_authenticate(|| self.login()).await
    }

    async fn login(&self) -> Result<SessionId, ErpError> {
        let args = json!([self.database, self.username, self.password.expose_secret(), {}]);
        let result = match self.transport.call("common", "authenticate", args).await {
            Ok(result) => result,
            Err(ErpError::SessionRejected(message)) => {
                return Err(ErpError::Authentication(message))
            }
            Err(error) => return Err(error),
        };

        match result.as_i64() {
            Some(uid) if uid > 0 => {
                info!(
                    event_name = "erp.session.authenticated",
                    database = %self.database,
                    username = %self.username,
                    uid,
                    "authenticated against ERP"
                );
                Ok(SessionId(uid))
            }
            _ => {
                warn!(
                    event_name = "erp.session.rejected_credentials",
                    database = %self.database,
                    username = %self.username,
                    "ERP refused the configured credentials"
                );
                Err(ErpError::Authentication(
                    "the configured credentials were rejected".to_string(),
                ))
            }
        }
    }

    async fn execute_kw(
        &self,
        session: SessionId,
        model: &str,
        method: &str,
        domain: &SearchDomain,
        options: &SearchOptions,
    ) -> Result<Vec<Value>, ErpError> {
        let args = json!([
            self.database,
            session.0,
            self.password.expose_secret(),
            model,
            method,
            [domain.to_value()],
            options.to_kwargs(),
        ]);

        match self.transport.call("object", "execute_kw", args).await? {
            Value::Array(rows) => Ok(rows),
            other => Err(ErpError::Decode(format!(
                "{model}.{method} returned {} instead of a record list",
                json_kind(&other)
            ))),
        }
    }
}

#[async_trait]
impl RecordSource for OdooClient {
    async fn authenticate(&self) -> Result<SessionId, ErpError> {
        OdooClient::authenticate(self).await
    }

    async fn call(
        &self,
        model: &str,
        method: &str,
        domain: &SearchDomain,
        options: &SearchOptions,
    ) -> Result<Vec<Value>, ErpError> {
        let session = self.authenticate().await?;
        let rows = match self.execute_kw(session, model, method, domain, options).await {
            Err(ErpError::SessionRejected(reason)) => {
                warn!(
                    event_name = "erp.session.rejected",
                    model,
                    method,
                    reason = %reason,
                    "ERP rejected cached session; re-authenticating once"
                );
                self.sessions.invalidate(session).await;
                let renewed = self.authenticate().await?;
                match self.execute_kw(renewed, model, method, domain, options).await {
                    Err(ErpError::SessionRejected(reason)) => {
                        return Err(ErpError::Authentication(reason))
                    }
                    other => other?,
                }
            }
            other => other?,
        };

        debug!(event_name = "erp.call", model, method, records = rows.len(), "ERP call completed");
        Ok(rows)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
