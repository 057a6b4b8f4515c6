//! Ports module - Interfaces between the decision core and its collaborators.
//!
//! Ports define what the engine needs from the outside world without
//! naming any concrete technology. Adapters implement them.
//!
//! `ConfigView` is defined in the domain layer (the resolver and selector
//! consume it directly) and re-exported here alongside the async ports.

mod fulfillment;
mod session_store;

pub use crate::domain::catalog::ConfigView;
pub use fulfillment::FulfillmentDispatcher;
pub use session_store::{SessionMutator, SessionStore, SessionStoreError};
