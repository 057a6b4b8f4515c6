//! Pattern-based classification of mid-form utterances.
//!
//! While a form is collecting answers, free text may be an answer or an
//! interruption. Classification is deliberately pattern-based, not model
//! based, and evaluated in a fixed priority order so an utterance matching
//! several categories always resolves to the highest-priority one.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The classification of an utterance received while a form is active.
///
/// Priority: `Cancel` > `Question` > `Mistake` > `Continue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interruption {
    /// Abandon the form entirely.
    Cancel,
    /// An unrelated question; suspend and route the text normally.
    Question,
    /// The user wants to correct something; suspend.
    Mistake,
    /// A genuine field answer.
    Continue,
}

static CANCEL_WORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["cancel", "stop", "exit", "quit", "nevermind"].into_iter().collect());

static CANCEL_PHRASES: &[&str] = &["never mind", "forget it"];

static INTERROGATIVES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "what", "who", "whom", "where", "when", "why", "how", "which", "can", "could", "would",
        "do", "does", "did", "is", "are", "will",
    ]
    .into_iter()
    .collect()
});

static QUESTION_PHRASES: &[&str] = &["tell me", "explain"];

static MISTAKE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["oops", "whoops", "wait", "sorry", "mistake", "wrong"].into_iter().collect()
});

static MISTAKE_PHRASES: &[&str] = &["go back", "i meant"];

/// Classifies a free-text utterance received while a form is active.
pub fn classify(utterance: &str) -> Interruption {
    let normalized = utterance.trim().to_lowercase();
    let tokens: Vec<&str> = normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.iter().any(|t| CANCEL_WORDS.contains(t))
        || CANCEL_PHRASES.iter().any(|p| normalized.contains(p))
    {
        return Interruption::Cancel;
    }

    if normalized.contains('?')
        || tokens.first().is_some_and(|t| INTERROGATIVES.contains(t))
        || QUESTION_PHRASES.iter().any(|p| normalized.contains(p))
    {
        return Interruption::Question;
    }

    if tokens.iter().any(|t| MISTAKE_WORDS.contains(t))
        || MISTAKE_PHRASES.iter().any(|p| normalized.contains(p))
    {
        return Interruption::Mistake;
    }

    Interruption::Continue
}
