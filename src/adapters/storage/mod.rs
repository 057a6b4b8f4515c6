//! Session store adapters.

mod in_memory_session_store;
mod unavailable;

pub use in_memory_session_store::InMemorySessionStore;
pub use unavailable::UnavailableSessionStore;
