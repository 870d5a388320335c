//! AI Studio (aistudio.google.com).
//!
//! The run button is the source of truth here: it is `.stoppable` with a
//! spinner while a request runs, `[disabled]` when the prompt is empty, and
//! plain otherwise. Submission waits for the ready state and maps the other
//! two to distinct errors. Questions are rich markup (not plain text), so
//! they go through Markdown conversion like answers do.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sidechat_common::{AutomationError, Result, WaitOutcome};
use sidechat_drivers::PageDom;
use tokio::time::sleep;

use crate::extract;
use crate::profile::{
    ProviderKind, SiteProfile, TimingOverrides, TurnLayout, DEFAULT_ELEMENT_WAIT_MS, DEFAULT_MAX_PART_SIZE,
    DEFAULT_MAX_WAIT_MS,
};
use crate::provider::{poll_until, wait_for_selector, Baseline, ChatProvider, PollState};

const RUN_READY: &str = r#"run-button button[aria-label="Run"]:not([disabled]):not(.stoppable)"#;
const RUN_DISABLED: &str = r#"run-button button[aria-label="Run"][disabled]"#;
const RUN_SPINNING: &str = r#"run-button button[aria-label="Run"].stoppable svg.stoppable-spinner"#;

/// Lets the page's framework react to the synthetic input events before the
/// run button is probed.
const INPUT_SETTLE: Duration = Duration::from_millis(100);
/// The response markup keeps mutating briefly after the spinner clears.
const RENDER_SETTLE: Duration = Duration::from_millis(250);

pub static AISTUDIO: SiteProfile = SiteProfile {
    kind: ProviderKind::Aistudio,
    hosts: &["aistudio.google.com"],
    new_chat_url: "https://aistudio.google.com/prompts/new_chat",
    container: ".chat-turn-container.user",
    user_message: ".chat-turn-container.user",
    assistant_message: ".chat-turn-container.model",
    textbox: "ms-autosize-textarea textarea",
    send_button: RUN_READY,
    busy: Some(RUN_SPINNING),
    completed: None,
    stopped: None,
    all_rows: None,
    strip: &["mat-icon"],
    layout: TurnLayout::Paired,
    convert_question: true,
    max_part_size: DEFAULT_MAX_PART_SIZE,
    max_wait_ms: DEFAULT_MAX_WAIT_MS,
    poll_interval_ms: 500,
    element_wait_ms: DEFAULT_ELEMENT_WAIT_MS,
};

pub struct Aistudio {
    dom: Arc<dyn PageDom>,
    timing: TimingOverrides,
}

impl Aistudio {
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
impl ChatProvider for Aistudio {
    fn profile(&self) -> &'static SiteProfile {
        &AISTUDIO
    }

    fn dom(&self) -> &dyn PageDom {
        self.dom.as_ref()
    }

    fn timing(&self) -> TimingOverrides {
        self.timing
    }

    fn poll_state(&self, html: &str, baseline: &Baseline) -> PollState {
        let done = !extract::exists(html, RUN_SPINNING)
            && extract::turn_count(html, &AISTUDIO) > baseline.turns;
        if done {
            PollState::Ready
        } else {
            PollState::NotYet
        }
    }

    /// The ready selector excludes the disabled and running button states, so
    /// a miss is disambiguated by probing for those states explicitly.
    async fn submit_prompt(&self, message: &str) -> Result<()> {
        let element_wait = Duration::from_millis(AISTUDIO.element_wait_ms);

        wait_for_selector(self.dom(), AISTUDIO.textbox, element_wait).await?;
        self.dom.fill(AISTUDIO.textbox, message).await?;
        sleep(INPUT_SETTLE).await;

        match wait_for_selector(self.dom(), RUN_READY, element_wait).await {
            Ok(()) => self.dom.click(RUN_READY).await,
            Err(miss) => {
                if self.dom.exists(RUN_DISABLED).await? {
                    Err(AutomationError::ElementDisabled {
                        selector: RUN_READY.to_string(),
                    })
                } else if self.dom.exists(RUN_SPINNING).await? {
                    Err(AutomationError::AlreadyRunning)
                } else {
                    Err(miss)
                }
            }
        }
    }

    async fn wait_for_completion(&self, baseline: Baseline) -> Result<WaitOutcome> {
        let outcome = poll_until(
            self.dom(),
            Duration::from_millis(AISTUDIO.effective_max_wait_ms(&self.timing)),
            Duration::from_millis(AISTUDIO.effective_poll_interval_ms(&self.timing)),
            |html| self.poll_state(html, &baseline),
        )
        .await?;
        if outcome == WaitOutcome::Completed {
            sleep(RENDER_SETTLE).await;
        }
        Ok(outcome)
    }
}
