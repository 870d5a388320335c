//! Copilot (copilot.microsoft.com).
//!
//! User and assistant messages are parallel `data-content` lists paired by
//! index. The counted container is the assistant message itself; a reply is
//! still animating while it contains a `will-change` styled element.

use std::sync::Arc;

use async_trait::async_trait;
use sidechat_drivers::PageDom;

use crate::extract;
use crate::profile::{
    ProviderKind, SiteProfile, TimingOverrides, TurnLayout, DEFAULT_ELEMENT_WAIT_MS, DEFAULT_MAX_WAIT_MS,
    DEFAULT_POLL_INTERVAL_MS,
};
use crate::provider::{Baseline, ChatProvider, PollState};

const ANIMATING: &str = r#"[style*="will-change"]"#;

pub static COPILOT: SiteProfile = SiteProfile {
    kind: ProviderKind::Copilot,
    hosts: &["copilot.microsoft.com"],
    new_chat_url: "https://copilot.microsoft.com",
    container: r#"[data-content="ai-message"]"#,
    user_message: r#"[data-content="user-message"]"#,
    assistant_message: r#"[data-content="ai-message"]"#,
    textbox: "#userInput",
    send_button: r#"button[data-testid="submit-button"]"#,
    busy: Some(ANIMATING),
    completed: None,
    stopped: None,
    all_rows: None,
    strip: &[".sr-only"],
    layout: TurnLayout::Paired,
    convert_question: false,
    // The input control rejects anything longer.
    max_part_size: 10_000,
    max_wait_ms: DEFAULT_MAX_WAIT_MS,
    poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
    element_wait_ms: DEFAULT_ELEMENT_WAIT_MS,
};

pub struct Copilot {
    dom: Arc<dyn PageDom>,
    timing: TimingOverrides,
}

impl Copilot {
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
impl ChatProvider for Copilot {
    fn profile(&self) -> &'static SiteProfile {
        &COPILOT
    }

    fn dom(&self) -> &dyn PageDom {
        self.dom.as_ref()
    }

    fn timing(&self) -> TimingOverrides {
        self.timing
    }

    fn poll_state(&self, html: &str, baseline: &Baseline) -> PollState {
        let done = extract::turn_count(html, &COPILOT) > baseline.turns
            && extract::last_container_has(html, COPILOT.container, ANIMATING) == Some(false);
        if done {
            PollState::Ready
        } else {
            PollState::NotYet
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FixtureDom;
    use pretty_assertions::assert_eq;
    use sidechat_common::WaitOutcome;

    fn exchange(question: &str, answer_html: &str) -> String {
        format!(
            r#"<div data-content="user-message">{question}</div>
               <div data-content="ai-message">{answer_html}</div>"#,
        )
    }

    #[test]
    fn pairs_messages_by_index() {
        let html = format!(
            "{}{}",
            exchange("one?", "<p>first</p>"),
            exchange("two?", "<p>second</p>"),
        );
        let messages = extract::collect_turns(&html, &COPILOT);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].question, "one?");
        assert_eq!(messages[1].answer, "second");
    }

    #[test]
    fn unanswered_question_is_dropped() {
        let html = format!(
            "{}<div data-content=\"user-message\">pending?</div>",
            exchange("one?", "<p>first</p>"),
        );
        let messages = extract::collect_turns(&html, &COPILOT);
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn screen_reader_text_is_stripped() {
        let html = exchange("q", r#"<p>shown</p><span class="sr-only">a11y label</span>"#);
        let messages = extract::collect_turns(&html, &COPILOT);
        assert_eq!(messages[0].answer, "shown");
    }

    #[tokio::test(start_paused = true)]
    async fn completion_waits_for_the_animation_to_settle() {
        let animating = exchange(
            "q",
            r#"<p style="will-change: transform">str</p>"#,
        );
        let settled = exchange("q", "<p>streamed</p>");
        let dom = Arc::new(FixtureDom::with_states(&[&animating, &animating, &settled]));
        let provider = Copilot::new(dom);

        let baseline = Baseline {
            turns: 0,
            completed: 0,
        };
        let outcome = provider.wait_for_completion(baseline).await.unwrap();
        assert_eq!(outcome, WaitOutcome::Completed);
    }
}
