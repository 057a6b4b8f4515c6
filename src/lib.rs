//! Dialog Core - Decision engine for a conversational widget.
//!
//! This crate implements the decision core of the widget: a deterministic,
//! priority-ordered routing resolver that never leaves a user without a next
//! step, and a resumable, validated, multi-step form state machine that
//! tolerates mid-dialogue interruption and resumes without data loss.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
