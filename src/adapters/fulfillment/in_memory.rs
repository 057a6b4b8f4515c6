//! Dispatcher doubles for tests.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::form::FormCompleted;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::FulfillmentDispatcher;

/// Records every dispatched event for later assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingDispatcher {
    events: Arc<RwLock<Vec<FormCompleted>>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<FormCompleted> {
        self.events.read().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.events.read().await.len()
    }
}

#[async_trait]
impl FulfillmentDispatcher for RecordingDispatcher {
    async fn dispatch(&self, event: FormCompleted) -> Result<(), DomainError> {
        self.events.write().await.push(event);
        Ok(())
    }
}

/// Fails every dispatch, for verifying completion survives delivery errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingDispatcher;

impl FailingDispatcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FulfillmentDispatcher for FailingDispatcher {
    async fn dispatch(&self, _event: FormCompleted) -> Result<(), DomainError> {
        Err(DomainError::new(
            ErrorCode::InternalError,
            "fulfillment pipeline rejected the event",
        ))
    }
}
