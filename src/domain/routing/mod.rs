//! Routing module - Deterministic three-tier branch resolution.

mod metadata;
mod resolver;

pub use metadata::RoutingMetadata;
pub use resolver::RoutingResolver;
