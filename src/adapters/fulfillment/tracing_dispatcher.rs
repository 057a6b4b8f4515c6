//! Dispatcher that emits completed forms to the log only.
//!
//! Stands in for the real notification/CRM pipeline in development.

use async_trait::async_trait;
use tracing::info;

use crate::domain::form::FormCompleted;
use crate::domain::foundation::DomainError;
use crate::ports::FulfillmentDispatcher;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDispatcher;

impl TracingDispatcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FulfillmentDispatcher for TracingDispatcher {
    async fn dispatch(&self, event: FormCompleted) -> Result<(), DomainError> {
        info!(
            event_id = %event.event_id,
            form = %event.form_id,
            program = %event.program_id,
            fields = event.collected_values.len(),
            "form completed, dispatching to fulfillment"
        );
        Ok(())
    }
}
