//! Catalog module - Static tenant configuration schema.
//!
//! These types mirror the tenant's published configuration document:
//! conversation branches, call-to-action definitions, suggestion chips,
//! and form definitions. They are read-only at runtime; reference
//! integrity is checked at load time by the `ConfigView` adapter.

mod branch;
mod chip;
mod cta;
mod form;
mod view;

pub use branch::{AvailableCtas, ConversationBranch};
pub use chip::ActionChip;
pub use cta::{CtaAction, CtaDefinition};
pub use form::{CompositeKind, FieldType, FormDefinition, FormField, SubFieldRule, SubFieldSpec};
pub use view::ConfigView;
