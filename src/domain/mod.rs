//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `catalog` - Static tenant configuration schema (branches, CTAs, chips, forms)
//! - `session` - Per-session durable context and suspended-form snapshots
//! - `routing` - Three-tier deterministic branch resolution
//! - `selection` - Position-tagged, de-duplicated, capped CTA selection
//! - `form` - Field validation, interruption classification, and the form engine

pub mod catalog;
pub mod form;
pub mod foundation;
pub mod routing;
pub mod selection;
pub mod session;
