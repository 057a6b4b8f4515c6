//! Session store port - durable, atomic session context persistence.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{SessionId, Timestamp};
use crate::domain::session::SessionContext;

/// A mutation applied to a session context inside a single commit.
pub type SessionMutator = Box<dyn FnOnce(&mut SessionContext) + Send>;

/// Errors a session store adapter can surface.
///
/// `Unavailable` triggers the caller's degraded mode; everything else is
/// a hard failure.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
    #[error("session context serialization failed: {0}")]
    Serialization(String),
}

/// Port for loading and atomically updating session contexts.
///
/// Implementations must ensure read-your-own-writes: a `load` issued
/// after a successful `commit` observes that commit's effects. A commit
/// applies its mutator to the latest stored context (creating a fresh
/// context for an unknown session) and persists the result as one unit,
/// so a failed commit leaves the stored context unchanged.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the context for a session, or `None` if the session is new.
    async fn load(&self, session_id: &SessionId)
        -> Result<Option<SessionContext>, SessionStoreError>;

    /// Atomically mutate and persist the context for a session.
    ///
    /// Returns the context as persisted.
    async fn commit(
        &self,
        session_id: &SessionId,
        mutator: SessionMutator,
    ) -> Result<SessionContext, SessionStoreError>;

    /// Remove a session context entirely.
    async fn remove(&self, session_id: &SessionId) -> Result<(), SessionStoreError>;

    /// Evict every context idle longer than `ttl_minutes` as of `now`.
    ///
    /// Returns the number of contexts evicted.
    async fn expire_idle(
        &self,
        now: Timestamp,
        ttl_minutes: i64,
    ) -> Result<usize, SessionStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn SessionStore) {}
}
