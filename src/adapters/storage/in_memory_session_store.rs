//! In-memory session store adapter.
//!
//! Holds every session context behind a single async lock, so a commit's
//! read-modify-write is atomic and a load issued after a commit always
//! observes that commit's effects.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{SessionId, Timestamp};
use crate::domain::session::SessionContext;
use crate::ports::{SessionMutator, SessionStore, SessionStoreError};

/// In-memory session context storage.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, SessionContext>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored contexts (for tests).
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop every stored context (for tests).
    pub async fn clear(&self) {
        self.sessions.write().await.clear();
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<SessionContext>, SessionStoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned())
    }

    async fn commit(
        &self,
        session_id: &SessionId,
        mutator: SessionMutator,
    ) -> Result<SessionContext, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let ctx = sessions
            .entry(session_id.clone())
            .or_insert_with(|| SessionContext::new(session_id.clone()));
        mutator(ctx);
        Ok(ctx.clone())
    }

    async fn remove(&self, session_id: &SessionId) -> Result<(), SessionStoreError> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }

    async fn expire_idle(
        &self,
        now: Timestamp,
        ttl_minutes: i64,
    ) -> Result<usize, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, ctx| !ctx.is_idle_expired(&now, ttl_minutes));
        Ok(before - sessions.len())
    }
}
