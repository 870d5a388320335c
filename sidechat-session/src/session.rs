use sidechat_common::{ChatMessage, Result, WaitOutcome};
use sidechat_providers::ChatProvider;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::chunk::{envelope_parts, split_into_parts};

/// Terminal state of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every message was sent.
    Done,
    /// The run ended early: cancellation was requested or the page reported
    /// an aborted turn.
    Stopped,
}

/// What a batch run actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    /// Messages submitted before the run ended.
    pub sent: usize,
    /// Messages the batch was asked to send.
    pub total: usize,
    pub outcome: BatchOutcome,
}

/// Batch progress, logged at each transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchState {
    Sending(usize),
    Waiting(usize),
}

/// One conversation with one detected site.
///
/// Owns the boxed adapter for its lifetime and serializes every operation:
/// a send is submit, then a bounded wait, then optionally extraction. Batches
/// are strictly sequential; the stop token is only consulted between sends,
/// never used to interrupt an in-flight wait.
pub struct ChatSession {
    provider: Box<dyn ChatProvider>,
    stop: CancellationToken,
}

impl ChatSession {
    pub fn new(provider: Box<dyn ChatProvider>) -> Self {
        Self {
            provider,
            stop: CancellationToken::new(),
        }
    }

    /// Token callers hold to stop a running batch between sends.
    pub fn stop_token(&self) -> CancellationToken {
        self.stop.clone()
    }

    pub fn provider(&self) -> &dyn ChatProvider {
        self.provider.as_ref()
    }

    /// Submit one prompt and wait (bounded) for the reply to settle. With
    /// `retrieve`, re-extract and return the newest turn afterwards.
    pub async fn send_message(
        &self,
        message: &str,
        retrieve: bool,
    ) -> Result<Option<ChatMessage>> {
        let baseline = self.provider.baseline().await?;
        self.provider.submit_prompt(message).await?;

        match self.provider.wait_for_completion(baseline).await? {
            WaitOutcome::Completed => {}
            WaitOutcome::Stopped => {
                info!(provider = %self.provider.kind(), "generation was stopped on the page")
            }
            WaitOutcome::TimedOut => {
                warn!(provider = %self.provider.kind(), "reply did not settle before the ceiling")
            }
        }

        if retrieve {
            self.provider.retrieve_response().await
        } else {
            Ok(None)
        }
    }

    /// Chunk `content` at line boundaries under the provider's part-size
    /// bound, envelope the parts, and send them as a batch.
    pub async fn send_file(&self, content: &str, name: &str) -> Result<BatchReport> {
        let parts = split_into_parts(content, self.provider.max_part_size());
        let messages = envelope_parts(&parts, name);
        info!(
            provider = %self.provider.kind(),
            file = name,
            parts = messages.len(),
            "sending file"
        );
        self.send_batch(&messages).await
    }

    /// Send messages strictly in order, checking the cooperative stop
    /// condition between sends. A stop leaves the remainder unsent.
    pub async fn send_batch(&self, messages: &[String]) -> Result<BatchReport> {
        let total = messages.len();
        let mut sent = 0;

        for (index, message) in messages.iter().enumerate() {
            debug!(state = ?BatchState::Sending(index), total, "batch transition");
            let baseline = self.provider.baseline().await?;
            self.provider.submit_prompt(message).await?;

            debug!(state = ?BatchState::Waiting(index), total, "batch transition");
            let outcome = self.provider.wait_for_completion(baseline).await?;
            sent += 1;

            let stop_requested = self.stop.is_cancelled();
            let page_stopped =
                outcome == WaitOutcome::Stopped || self.provider.detect_stopped().await;
            if stop_requested || page_stopped {
                info!(sent, total, stop_requested, page_stopped, "batch stopped early");
                return Ok(BatchReport {
                    sent,
                    total,
                    outcome: BatchOutcome::Stopped,
                });
            }
        }

        debug!(total, "batch done");
        Ok(BatchReport {
            sent,
            total,
            outcome: BatchOutcome::Done,
        })
    }

    /// Every complete turn currently on the page, in order.
    pub async fn transcript(&self) -> Result<Vec<ChatMessage>> {
        self.provider.chat_messages().await
    }

    /// Point the page at the site's new-conversation URL.
    pub async fn new_chat(&self) -> Result<()> {
        self.provider.new_chat().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use sidechat_common::AutomationError;
    use sidechat_drivers::PageDom;
    use sidechat_providers::profile::{
        ProviderKind, SiteProfile, TurnLayout, DEFAULT_ELEMENT_WAIT_MS, DEFAULT_MAX_WAIT_MS,
        DEFAULT_POLL_INTERVAL_MS,
    };
    use sidechat_providers::{Baseline, PollState};
    use std::sync::{Arc, Mutex};

    type SubmissionLog = Arc<Mutex<Vec<String>>>;

    struct NullDom;

    #[async_trait]
    impl PageDom for NullDom {
        async fn html(&self) -> Result<String> {
            Ok(String::new())
        }
        async fn count(&self, _selector: &str) -> Result<usize> {
            Ok(0)
        }
        async fn is_enabled(&self, _selector: &str) -> Result<Option<bool>> {
            Ok(None)
        }
        async fn fill(&self, selector: &str, _text: &str) -> Result<()> {
            Err(AutomationError::ElementNotFound {
                selector: selector.to_string(),
                timeout_ms: 0,
            })
        }
        async fn click(&self, selector: &str) -> Result<()> {
            Err(AutomationError::ElementNotFound {
                selector: selector.to_string(),
                timeout_ms: 0,
            })
        }
        async fn navigate(&self, _url: &str) -> Result<()> {
            Ok(())
        }
    }

    static NULL_DOM: NullDom = NullDom;

    static SCRIPTED_PROFILE: SiteProfile = SiteProfile {
        kind: ProviderKind::Claude,
        hosts: &["chat.invalid"],
        new_chat_url: "https://chat.invalid",
        container: ".turn",
        user_message: ".user",
        assistant_message: ".answer",
        textbox: ".textbox",
        send_button: ".send",
        busy: None,
        completed: None,
        stopped: None,
        all_rows: None,
        strip: &[],
        layout: TurnLayout::Nested,
        convert_question: false,
        max_part_size: 24,
        max_wait_ms: DEFAULT_MAX_WAIT_MS,
        poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        element_wait_ms: DEFAULT_ELEMENT_WAIT_MS,
    };

    /// Provider double that records submissions and reports a page stop after
    /// a configured number of sends.
    struct ScriptedProvider {
        submissions: SubmissionLog,
        stop_after: Option<usize>,
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        fn profile(&self) -> &'static SiteProfile {
            &SCRIPTED_PROFILE
        }

        fn dom(&self) -> &dyn PageDom {
            &NULL_DOM
        }

        fn poll_state(&self, _html: &str, _baseline: &Baseline) -> PollState {
            PollState::Ready
        }

        async fn submit_prompt(&self, message: &str) -> Result<()> {
            self.submissions.lock().unwrap().push(message.to_string());
            Ok(())
        }

        async fn wait_for_completion(&self, _baseline: Baseline) -> Result<WaitOutcome> {
            Ok(WaitOutcome::Completed)
        }

        async fn retrieve_response(&self) -> Result<Option<ChatMessage>> {
            let count = self.submissions.lock().unwrap().len();
            Ok(Some(ChatMessage {
                question: format!("question {count}"),
                answer: format!("answer {count}"),
            }))
        }

        async fn detect_stopped(&self) -> bool {
            match self.stop_after {
                Some(bound) => self.submissions.lock().unwrap().len() >= bound,
                None => false,
            }
        }
    }

    fn session(stop_after: Option<usize>) -> (ChatSession, SubmissionLog) {
        let log: SubmissionLog = Arc::new(Mutex::new(Vec::new()));
        let provider = Box::new(ScriptedProvider {
            submissions: Arc::clone(&log),
            stop_after,
        });
        (ChatSession::new(provider), log)
    }

    fn batch(messages: &[&str]) -> Vec<String> {
        messages.iter().map(|m| m.to_string()).collect()
    }

    #[tokio::test]
    async fn send_message_returns_the_newest_turn_when_asked() {
        let (session, _) = session(None);
        let reply = session.send_message("hello", true).await.unwrap();
        assert_eq!(reply.unwrap().answer, "answer 1");

        let silent = session.send_message("again", false).await.unwrap();
        assert!(silent.is_none());
    }

    #[tokio::test]
    async fn small_file_travels_as_one_enveloped_message() {
        let (session, log) = session(None);
        let report = session.send_file("tiny note", "notes.txt").await.unwrap();
        assert_eq!(report.sent, 1);
        assert_eq!(report.outcome, BatchOutcome::Done);

        let submissions = log.lock().unwrap();
        assert_eq!(submissions.len(), 1);
        assert!(submissions[0].starts_with("BEGIN FILE: notes.txt\n"));
        assert!(submissions[0].contains("tiny note"));
        assert!(submissions[0].contains("END FILE"));
    }

    #[tokio::test]
    async fn large_file_travels_as_numbered_parts() {
        let (session, log) = session(None);
        let content = "first paragraph\nsecond paragraph\nthird paragraph";
        let report = session.send_file(content, "notes.txt").await.unwrap();
        assert_eq!(report.outcome, BatchOutcome::Done);
        assert!(report.sent > 1);

        let submissions = log.lock().unwrap();
        let total = submissions.len();
        for (idx, message) in submissions.iter().enumerate() {
            assert!(message
                .starts_with(&format!("BEGIN PART {} of {total} FILE: (notes.txt)", idx + 1)));
        }
    }

    #[tokio::test]
    async fn page_stop_after_the_second_send_halts_a_batch_of_three() {
        let (session, log) = session(Some(2));
        let report = session
            .send_batch(&batch(&["one", "two", "three"]))
            .await
            .unwrap();

        assert_eq!(report.sent, 2);
        assert_eq!(report.total, 3);
        assert_eq!(report.outcome, BatchOutcome::Stopped);
        assert_eq!(
            log.lock().unwrap().as_slice(),
            ["one".to_string(), "two".to_string()]
        );
    }

    #[tokio::test]
    async fn cancellation_between_sends_stops_the_remainder() {
        let (session, log) = session(None);
        session.stop_token().cancel();

        let report = session
            .send_batch(&batch(&["one", "two", "three"]))
            .await
            .unwrap();

        // The token is only consulted between sends, so the first message
        // still goes out.
        assert_eq!(report.sent, 1);
        assert_eq!(report.outcome, BatchOutcome::Stopped);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn an_uninterrupted_batch_reports_done() {
        let (session, _) = session(None);
        let report = session.send_batch(&batch(&["one", "two"])).await.unwrap();
        assert_eq!(report.sent, 2);
        assert_eq!(report.outcome, BatchOutcome::Done);
    }
}
