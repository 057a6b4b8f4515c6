//! Application module - Orchestration of one dialogue turn.

mod interaction;

pub use interaction::{
    InteractionEvent, InteractionHandler, InteractionKind, InteractionResponse,
};
