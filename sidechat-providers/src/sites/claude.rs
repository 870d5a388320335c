//! Claude (claude.ai).
//!
//! A turn container carries `data-is-streaming`; the attribute flipping to
//! `"false"` doubles as the completed-turn marker, so the container and
//! completion selectors are the same string and no busy probe is needed.

use std::sync::Arc;

use async_trait::async_trait;
use sidechat_drivers::PageDom;

use crate::profile::{
    ProviderKind, SiteProfile, TimingOverrides, TurnLayout, DEFAULT_ELEMENT_WAIT_MS, DEFAULT_MAX_PART_SIZE,
    DEFAULT_MAX_WAIT_MS, DEFAULT_POLL_INTERVAL_MS,
};
use crate::provider::{Baseline, ChatProvider, PollState};
use crate::sites::completed_marker_growth;

const SETTLED_TURN: &str = r#"[data-is-streaming="false"]"#;
/// Anchored on the turn container so the four-div chain starts at its direct
/// child; unanchored it can land on the user-message wrappers instead.
const ANSWER_BODY: &str = r#"[data-is-streaming="false"] > div > div > div > div"#;

pub static CLAUDE: SiteProfile = SiteProfile {
    kind: ProviderKind::Claude,
    hosts: &["claude.ai"],
    new_chat_url: "https://claude.ai/chat/new",
    container: SETTLED_TURN,
    user_message: r#"[data-testid="user-message"]"#,
    assistant_message: ANSWER_BODY,
    textbox: r#".ProseMirror[contenteditable="true"]"#,
    send_button: r#"[aria-label="Send Message"]"#,
    busy: None,
    completed: Some(SETTLED_TURN),
    stopped: None,
    all_rows: None,
    strip: &["model-thoughts", ".stopped-draft-message"],
    layout: TurnLayout::Nested,
    convert_question: false,
    max_part_size: DEFAULT_MAX_PART_SIZE,
    max_wait_ms: DEFAULT_MAX_WAIT_MS,
    poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
    element_wait_ms: DEFAULT_ELEMENT_WAIT_MS,
};

pub struct Claude {
    dom: Arc<dyn PageDom>,
    timing: TimingOverrides,
}

impl Claude {
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
impl ChatProvider for Claude {
    fn profile(&self) -> &'static SiteProfile {
        &CLAUDE
    }

    fn dom(&self) -> &dyn PageDom {
        self.dom.as_ref()
    }

    fn timing(&self) -> TimingOverrides {
        self.timing
    }

    fn poll_state(&self, html: &str, baseline: &Baseline) -> PollState {
        completed_marker_growth(html, &CLAUDE, baseline)
    }
}
