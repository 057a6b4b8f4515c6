//! A session store that is always down, for exercising degraded mode.

use async_trait::async_trait;

use crate::domain::foundation::{SessionId, Timestamp};
use crate::domain::session::SessionContext;
use crate::ports::{SessionMutator, SessionStore, SessionStoreError};

/// Session store double whose every operation fails with `Unavailable`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableSessionStore;

impl UnavailableSessionStore {
    pub fn new() -> Self {
        Self
    }

    fn down() -> SessionStoreError {
        SessionStoreError::Unavailable("session store is down".to_string())
    }
}

#[async_trait]
impl SessionStore for UnavailableSessionStore {
    async fn load(
        &self,
        _session_id: &SessionId,
    ) -> Result<Option<SessionContext>, SessionStoreError> {
        Err(Self::down())
    }

    async fn commit(
        &self,
        _session_id: &SessionId,
        _mutator: SessionMutator,
    ) -> Result<SessionContext, SessionStoreError> {
        Err(Self::down())
    }

    async fn remove(&self, _session_id: &SessionId) -> Result<(), SessionStoreError> {
        Err(Self::down())
    }

    async fn expire_idle(
        &self,
        _now: Timestamp,
        _ttl_minutes: i64,
    ) -> Result<usize, SessionStoreError> {
        Err(Self::down())
    }
}
