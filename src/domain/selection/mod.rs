//! Selection module - Position-tagged CTA selection for a resolved branch.

mod selector;

pub use selector::{CtaPosition, CtaSelector, PositionedCta};
