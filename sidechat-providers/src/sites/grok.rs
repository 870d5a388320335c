//! Grok (grok.com).
//!
//! Rows are siblings: an answer row's question lives in the user row directly
//! above it, so extraction uses [`TurnLayout::Sibling`] with the all-rows
//! selector. The class names are hashed utility classes, hence the
//! `[class*=...]` substring probes. A turn is considered settled when the
//! stop-control icon is present in the newest answer row; since that icon
//! renders on every settled reply, it cannot serve as an abort signal and the
//! site reports no stop state.

use std::sync::Arc;

use async_trait::async_trait;
use sidechat_drivers::PageDom;

use crate::extract;
use crate::profile::{
    ProviderKind, SiteProfile, TimingOverrides, TurnLayout, DEFAULT_ELEMENT_WAIT_MS, DEFAULT_MAX_PART_SIZE,
    DEFAULT_MAX_WAIT_MS, DEFAULT_POLL_INTERVAL_MS,
};
use crate::provider::{Baseline, ChatProvider, PollState};

const STOP_ICON: &str = r#"[class*="secondary"] svg[class*="octagon"]"#;
/// The answer row is the turn container; sibling extraction converts its
/// whole subtree.
const ANSWER_ROW: &str = r#"[class*="message-row"][class*="items-start"]"#;

pub static GROK: SiteProfile = SiteProfile {
    kind: ProviderKind::Grok,
    hosts: &["grok.com"],
    new_chat_url: "https://grok.com",
    container: ANSWER_ROW,
    user_message: r#"[class*="message-row"][class*="items-end"] [class*="message-bubble"] [class*="whitespace"]"#,
    assistant_message: ANSWER_ROW,
    textbox: r#"textarea[class*="w-full"]"#,
    send_button: r#"button[type="submit"], button[aria-label*="send" i], button[title*="send" i]"#,
    busy: None,
    completed: None,
    stopped: None,
    all_rows: Some(".message-row"),
    strip: &[".hidden", r#"[aria-hidden="true"]"#],
    layout: TurnLayout::Sibling,
    convert_question: false,
    max_part_size: DEFAULT_MAX_PART_SIZE,
    max_wait_ms: DEFAULT_MAX_WAIT_MS,
    poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
    element_wait_ms: DEFAULT_ELEMENT_WAIT_MS,
};

pub struct Grok {
    dom: Arc<dyn PageDom>,
    timing: TimingOverrides,
}

impl Grok {
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
impl ChatProvider for Grok {
    fn profile(&self) -> &'static SiteProfile {
        &GROK
    }

    fn dom(&self) -> &dyn PageDom {
        self.dom.as_ref()
    }

    fn timing(&self) -> TimingOverrides {
        self.timing
    }

    /// The stop icon doubles as the settled marker: it is rendered as soon as
    /// streaming into the newest answer row finishes.
    fn poll_state(&self, html: &str, baseline: &Baseline) -> PollState {
        let settled = extract::turn_count(html, &GROK) > baseline.turns
            && extract::last_container_has(html, GROK.container, STOP_ICON) == Some(true);
        if settled {
            PollState::Ready
        } else {
            PollState::NotYet
        }
    }
}
