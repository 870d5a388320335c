//! Gemini (gemini.google.com).
//!
//! Completion is signalled by the avatar animation entering its `completed`
//! state; an aborted turn renders a stopped-draft notice inside the turn
//! container, which both the stop probe and the strip list account for.

use std::sync::Arc;

use async_trait::async_trait;
use sidechat_drivers::PageDom;
use tracing::debug;

use crate::extract;
use crate::profile::{
    ProviderKind, SiteProfile, TimingOverrides, TurnLayout, DEFAULT_ELEMENT_WAIT_MS, DEFAULT_MAX_PART_SIZE,
    DEFAULT_MAX_WAIT_MS, DEFAULT_POLL_INTERVAL_MS,
};
use crate::provider::{Baseline, ChatProvider, PollState};
use crate::sites::completed_marker_growth;

const STOPPED_NOTICE: &str = ".stopped-draft-message";

pub static GEMINI: SiteProfile = SiteProfile {
    kind: ProviderKind::Gemini,
    hosts: &["gemini.google.com"],
    new_chat_url: "https://gemini.google.com",
    container: ".conversation-container",
    user_message: ".user-query-container",
    assistant_message: ".response-container-content",
    textbox: r#"rich-textarea .ql-editor[role="textbox"]"#,
    send_button: "button.send-button",
    busy: None,
    completed: Some(
        r#"div.avatar_primary_animation.is-gpi-avatar[data-test-lottie-animation-status="completed"]"#,
    ),
    stopped: Some(STOPPED_NOTICE),
    all_rows: None,
    strip: &[
        "model-thoughts",
        ".experimental-mode-disclaimer-container",
        STOPPED_NOTICE,
    ],
    layout: TurnLayout::Nested,
    convert_question: false,
    max_part_size: DEFAULT_MAX_PART_SIZE,
    max_wait_ms: DEFAULT_MAX_WAIT_MS,
    poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
    element_wait_ms: DEFAULT_ELEMENT_WAIT_MS,
};

pub struct Gemini {
    dom: Arc<dyn PageDom>,
    timing: TimingOverrides,
}

impl Gemini {
    pub fn new(dom: Arc<dyn PageDom>) -> Self {
        Self {
            dom,
            timing: TimingOverrides::default(),
        }
    }

    pub fn with_timing(mut self, timing: TimingOverrides) -> Self {
        self.timing = timing;
        self
    }
}

#[async_trait]
impl ChatProvider for Gemini {
    fn profile(&self) -> &'static SiteProfile {
        &GEMINI
    }

    fn dom(&self) -> &dyn PageDom {
        self.dom.as_ref()
    }

    fn timing(&self) -> TimingOverrides {
        self.timing
    }

    fn poll_state(&self, html: &str, baseline: &Baseline) -> PollState {
        completed_marker_growth(html, &GEMINI, baseline)
    }

    /// The stopped-draft notice only matters inside the newest turn; an old
    /// aborted turn earlier in the conversation must not poison later sends.
    async fn detect_stopped(&self) -> bool {
        match self.dom.html().await {
            Ok(html) => extract::last_container_has(&html, GEMINI.container, STOPPED_NOTICE)
                .unwrap_or(false),
            Err(err) => {
                debug!(%err, "stop detection failed; assuming not stopped");
                false
            }
        }
    }
}
