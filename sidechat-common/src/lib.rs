//! Common types and utilities shared across Sidechat crates.
//!
//! This crate defines the shared error taxonomy, the message types that flow
//! between the per-site adapters and the orchestrator, and the observability
//! helpers. It is intentionally lightweight and dependency-minimal so that all
//! crates can depend on it without introducing heavy transitive costs.
//!
//! # Overview
//!
//! - [`ChatMessage`]: one extracted conversation turn (question + answer)
//! - [`BatchItem`]: selection-dialog view over a message or parsed prompt
//! - [`WaitOutcome`]: tri-state result of a bounded completion poll
//! - [`AutomationError`] and [`Result`]: shared error handling
//! - [`observability`]: centralised tracing/logging initialisation

use serde::{Deserialize, Serialize};

pub mod observability;

/// One conversation turn, as extracted from a host page.
///
/// Produced by pairing a user-message container with its assistant response;
/// ephemeral — never persisted beyond the extraction call that built it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub question: String,
    pub answer: String,
}

/// Placeholder answer used when HTML conversion of a turn fails; one bad turn
/// must not abort a whole transcription pass.
pub const ERROR_ANSWER_PLACEHOLDER: &str = "Error processing response";

/// A `title`/`description` view over a [`ChatMessage`] or a parsed prompt,
/// suitable for selection lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    pub title: String,
    pub description: String,
}

impl From<ChatMessage> for BatchItem {
    fn from(msg: ChatMessage) -> Self {
        Self {
            title: msg.question,
            description: msg.answer,
        }
    }
}

/// Result of a bounded completion poll.
///
/// The poll loop itself never hangs: it either observes a newly completed
/// turn, observes the host page's stop signal, or gives up at the ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitOutcome {
    /// A new completed turn appeared beyond the recorded baseline.
    Completed,
    /// The host page (or the user, via the page) aborted generation.
    Stopped,
    /// The polling ceiling elapsed without observing completion.
    TimedOut,
}

/// Error taxonomy for the automation layer.
///
/// Extraction failures never surface through this type — they degrade to
/// `None` or [`ERROR_ANSWER_PLACEHOLDER`]. Submission failures do surface, so
/// a batch loop can decide whether to halt.
#[derive(thiserror::Error, Debug)]
pub enum AutomationError {
    /// A selector matched nothing within its wait bound.
    #[error("element not found within {timeout_ms}ms: {selector}")]
    ElementNotFound { selector: String, timeout_ms: u64 },

    /// The control was located but is inactive.
    #[error("element found but disabled: {selector}")]
    ElementDisabled { selector: String },

    /// The host page reports a generation already in flight.
    #[error("a generation is already running on the page")]
    AlreadyRunning,

    /// A polling ceiling elapsed without the expected DOM state.
    #[error("timed out after {waited_ms}ms waiting for page state")]
    Timeout { waited_ms: u64 },

    /// The active page's host does not map to any known provider.
    #[error("unsupported host: {0}")]
    UnsupportedHost(String),

    /// The WebDriver session reported an error.
    #[error("driver error: {0}")]
    Driver(#[from] anyhow::Error),
}

/// Convenient alias for results that use [`AutomationError`].
pub type Result<T> = std::result::Result<T, AutomationError>;
