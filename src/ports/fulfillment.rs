//! Fulfillment port - downstream delivery of completed forms.

use async_trait::async_trait;

use crate::domain::form::FormCompleted;
use crate::domain::foundation::DomainError;

/// Port for handing a completed form to downstream fulfillment.
///
/// Dispatch is fire-and-forget from the engine's point of view: the form
/// is already `Completed` when this is called, and a dispatch error must
/// never roll that back. Callers log failures and move on.
#[async_trait]
pub trait FulfillmentDispatcher: Send + Sync {
    async fn dispatch(&self, event: FormCompleted) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn FulfillmentDispatcher) {}
}
