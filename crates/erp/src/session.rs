use std::future::Future;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::ErpError;

/// Numeric user id returned by the ERP `authenticate` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub i64);

/// Process-wide memo of the ERP session.
///
/// Reads take the shared lock. The first caller to find the cache empty
/// authenticates while holding the write lock, so concurrent first requests
/// produce a single login.
#[derive(Debug, Default)]
pub struct SessionCache {
    current: RwLock<Option<SessionId>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn current(&self) -> Option<SessionId> {
        *self.current.read().await
    }

    pub async fn get_or_authenticate<F, Fut>(&self, authenticate: F) -> Result<SessionId, ErpError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<SessionId, ErpError>>,
    {
        if let Some(session) = *self.current.read().await {
            return Ok(session);
        }

        let mut slot = self.current.write().await;
        if let Some(session) = *slot {
            return Ok(session);
        }

        let session = authenticate().await?;
        *slot = Some(session);
        Ok(session)
    }

    /// Drops the cached session if it is still `stale`. A session renewed by
    /// another request in the meantime is kept.
    pub async fn invalidate(&self, stale: SessionId) -> bool {
        let mut slot = self.current.write().await;
        if *slot == Some(stale) {
            *slot = None;
            true
        } else {
            false
        }
    }
}
