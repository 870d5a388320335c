//! Poe (poe.com).
//!
//! Message containers carry `data-complete`, flipping to `"true"` once the
//! bot reply settles; a visible stop control means the user aborted the turn.
//! The answer body sits behind a deliberately loose structural selector since
//! the wrapper class names are hashed per deploy.

use std::sync::Arc;

use async_trait::async_trait;
use sidechat_drivers::PageDom;

use crate::profile::{
    ProviderKind, SiteProfile, TimingOverrides, TurnLayout, DEFAULT_ELEMENT_WAIT_MS, DEFAULT_MAX_PART_SIZE,
    DEFAULT_MAX_WAIT_MS, DEFAULT_POLL_INTERVAL_MS,
};
use crate::provider::{Baseline, ChatProvider, PollState};
use crate::sites::completed_marker_growth;

pub static POE: SiteProfile = SiteProfile {
    kind: ProviderKind::Poe,
    hosts: &["poe.com"],
    new_chat_url: "https://poe.com",
    container: "div[data-complete]",
    user_message: r#"[data-testid="user-message"]"#,
    assistant_message: "div > div > div div div p",
    textbox: "textarea.GrowingTextArea_textArea__ZWQbP",
    send_button: r#"button[aria-label="Send message"]"#,
    busy: None,
    completed: Some(r#"div[data-complete="true"]"#),
    stopped: Some(".ChatStopMessageButton_stopButton__QOW41"),
    all_rows: None,
    strip: &[],
    layout: TurnLayout::Nested,
    convert_question: false,
    max_part_size: DEFAULT_MAX_PART_SIZE,
    max_wait_ms: DEFAULT_MAX_WAIT_MS,
    poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
    element_wait_ms: DEFAULT_ELEMENT_WAIT_MS,
};

pub struct Poe {
    dom: Arc<dyn PageDom>,
    timing: TimingOverrides,
}

impl Poe {
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
impl ChatProvider for Poe {
    fn profile(&self) -> &'static SiteProfile {
        &POE
    }

    fn dom(&self) -> &dyn PageDom {
        self.dom.as_ref()
    }

    fn timing(&self) -> TimingOverrides {
        self.timing
    }

    fn poll_state(&self, html: &str, baseline: &Baseline) -> PollState {
        completed_marker_growth(html, &POE, baseline)
    }
}
