//! Adapters module - Concrete implementations of the ports.
//!
//! - `catalog` - static configuration snapshot with load-time validation
//! - `storage` - session store implementations
//! - `fulfillment` - completed-form dispatchers

pub mod catalog;
pub mod fulfillment;
pub mod storage;
