//! Fulfillment dispatcher adapters.

mod in_memory;
mod tracing_dispatcher;

pub use in_memory::{FailingDispatcher, RecordingDispatcher};
pub use tracing_dispatcher::TracingDispatcher;
