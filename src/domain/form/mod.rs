//! Form module - Validation, interruption handling, and the form engine.
//!
//! - `validator` - pure per-type answer validation and composite expansion
//! - `interruption` - pattern-based classification of mid-form utterances
//! - `instance` - the runtime form instance and its status state machine
//! - `engine` - the resumable multi-step dialogue state machine

mod engine;
mod instance;

pub mod interruption;
pub mod validator;

pub use engine::{FormCompleted, FormEngine, FormPrompt, ResumeOutcome, SubmitOutcome};
pub use instance::{FormInstance, FormStatus, SuspendReason, SuspendedFormState};
pub use interruption::Interruption;
pub use validator::ValidatedValue;
