//! DeepSeek (chat.deepseek.com).
//!
//! A turn container carries a thinking indicator while the reply streams and
//! a `data-error` marker when generation fails. The reply is settled once the
//! indicator disappears, or immediately when the error marker shows up.

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

const THINKING: &str = "[data-thinking-indicator]";
const ERROR_MARKER: &str = "[data-error]";

pub static DEEPSEEK: SiteProfile = SiteProfile {
    kind: ProviderKind::Deepseek,
    hosts: &["chat.deepseek.com"],
    new_chat_url: "https://chat.deepseek.com",
    container: "[data-message-container]",
    user_message: "[data-user-message]",
    assistant_message: "[data-assistant-message]",
    textbox: r#"[role="textbox"]"#,
    send_button: "[data-send-message]",
    busy: Some(THINKING),
    completed: None,
    stopped: None,
    all_rows: None,
    strip: &["[data-hidden]", THINKING, ERROR_MARKER],
    layout: TurnLayout::Nested,
    convert_question: false,
    max_part_size: DEFAULT_MAX_PART_SIZE,
    max_wait_ms: DEFAULT_MAX_WAIT_MS,
    poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
    element_wait_ms: DEFAULT_ELEMENT_WAIT_MS,
};

pub struct Deepseek {
    dom: Arc<dyn PageDom>,
    timing: TimingOverrides,
}

impl Deepseek {
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
impl ChatProvider for Deepseek {
    fn profile(&self) -> &'static SiteProfile {
        &DEEPSEEK
    }

    fn dom(&self) -> &dyn PageDom {
        self.dom.as_ref()
    }

    fn timing(&self) -> TimingOverrides {
        self.timing
    }

    fn poll_state(&self, html: &str, baseline: &Baseline) -> PollState {
        if extract::turn_count(html, &DEEPSEEK) <= baseline.turns {
            return PollState::NotYet;
        }
        let thinking =
            extract::last_container_has(html, DEEPSEEK.container, THINKING) == Some(true);
        let errored =
            extract::last_container_has(html, DEEPSEEK.container, ERROR_MARKER) == Some(true);
        if !thinking || errored {
            PollState::Ready
        } else {
            PollState::NotYet
        }
    }

    /// Only an explicit error marker on the newest turn counts as stopped;
    /// the mere absence of the thinking indicator is the normal settled
    /// state, not an abort.
    async fn detect_stopped(&self) -> bool {
        match self.dom.html().await {
            Ok(html) => extract::last_container_has(&html, DEEPSEEK.container, ERROR_MARKER)
                .unwrap_or(false),
            Err(err) => {
                debug!(%err, "stop detection failed; assuming not stopped");
                false
            }
        }
    }
}
