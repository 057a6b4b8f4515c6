//! Session module - Per-session durable context.

mod context;

pub use context::SessionContext;
