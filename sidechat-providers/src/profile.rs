use std::fmt;

use serde::{Deserialize, Serialize};

/// Supported host sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    Claude,
    Grok,
    Copilot,
    Deepseek,
    Aistudio,
    Poe,
}

impl ProviderKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Claude => "claude",
            Self::Grok => "grok",
            Self::Copilot => "copilot",
            Self::Deepseek => "deepseek",
            Self::Aistudio => "aistudio",
            Self::Poe => "poe",
        }
    }

    pub fn all() -> &'static [ProviderKind] {
        &[
            Self::Gemini,
            Self::Claude,
            Self::Grok,
            Self::Copilot,
            Self::Deepseek,
            Self::Aistudio,
            Self::Poe,
        ]
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a site lays out conversation turns in the DOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnLayout {
    /// Question and answer are nested inside one turn container.
    Nested,
    /// User and assistant messages are parallel element lists paired by index.
    Paired,
    /// Containers hold answers; the question lives in the preceding sibling
    /// row.
    Sibling,
}

/// Stateless per-site configuration: selector strings as named constants,
/// plus the timing bounds the polling loops honor.
///
/// Selectors are brittle external contracts, not a stable protocol — when a
/// host redesigns, this record is the only thing that should need updating.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub kind: ProviderKind,
    /// Hostnames this profile claims (exact match on `Url::host_str`).
    pub hosts: &'static [&'static str],
    /// Where `new_chat` navigates.
    pub new_chat_url: &'static str,
    /// The counted conversation-turn container.
    pub container: &'static str,
    pub user_message: &'static str,
    pub assistant_message: &'static str,
    pub textbox: &'static str,
    pub send_button: &'static str,
    /// In-progress indicator, when the site renders one.
    pub busy: Option<&'static str>,
    /// Completed-turn indicator, when distinct from the container itself.
    pub completed: Option<&'static str>,
    /// Signal that the user or host aborted generation.
    pub stopped: Option<&'static str>,
    /// For [`TurnLayout::Sibling`]: selector matching every row regardless of
    /// role, used to locate the question row preceding an answer row.
    pub all_rows: Option<&'static str>,
    /// Decoration stripped from answer HTML before Markdown conversion.
    pub strip: &'static [&'static str],
    pub layout: TurnLayout,
    /// Whether the question side also goes through HTML conversion (it is
    /// plain `textContent` everywhere except AI Studio).
    pub convert_question: bool,
    /// Practical input-length bound of the host's textbox.
    pub max_part_size: usize,
    /// Completion-polling ceiling.
    pub max_wait_ms: u64,
    pub poll_interval_ms: u64,
    /// Bound on waiting for the textbox / send control to appear.
    pub element_wait_ms: u64,
}

/// Baseline timing shared by most profiles; sites override fields
/// individually with struct-update syntax.
pub const DEFAULT_MAX_WAIT_MS: u64 = 120_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_ELEMENT_WAIT_MS: u64 = 5_000;
pub const DEFAULT_MAX_PART_SIZE: usize = 30_000;

/// Session-level adjustments to a profile's polling bounds, typically sourced
/// from configuration. `None` keeps the profile's value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimingOverrides {
    pub max_wait_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
}

impl SiteProfile {
    /// Completion-poll ceiling with `overrides` applied.
    pub fn effective_max_wait_ms(&self, overrides: &TimingOverrides) -> u64 {
        overrides.max_wait_ms.unwrap_or(self.max_wait_ms)
    }

    /// Completion-poll interval with `overrides` applied.
    pub fn effective_poll_interval_ms(&self, overrides: &TimingOverrides) -> u64 {
        overrides.poll_interval_ms.unwrap_or(self.poll_interval_ms)
    }
}
