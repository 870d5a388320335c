use std::time::Duration;

use async_trait::async_trait;
use sidechat_common::{AutomationError, ChatMessage, Result, WaitOutcome};
use sidechat_drivers::PageDom;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::extract;
use crate::profile::{ProviderKind, SiteProfile, TimingOverrides};

/// Decision of one completion-poll iteration against a single DOM snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// A new completed turn is visible beyond the baseline.
    Ready,
    /// Keep polling.
    NotYet,
    /// The host page shows generation was aborted.
    Stopped,
}

/// Counters recorded before an action, against which completion polling
/// compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Baseline {
    /// Turn containers rendered before the action.
    pub turns: usize,
    /// Completed-turn indicators rendered before the action (sites without a
    /// distinct indicator report 0).
    pub completed: usize,
}

/// Interval used when waiting for a single element (textbox, send control)
/// to appear.
const ELEMENT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// The uniform chat-automation capability, one implementing type per site.
///
/// Default methods carry everything that is site-agnostic; implementors
/// provide their [`SiteProfile`] and the pure per-snapshot completion
/// decision, and override an operation only where their host genuinely
/// behaves differently.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn profile(&self) -> &'static SiteProfile;

    fn dom(&self) -> &dyn PageDom;

    fn kind(&self) -> ProviderKind {
        self.profile().kind
    }

    /// Practical input-length bound used by the file chunker.
    fn max_part_size(&self) -> usize {
        self.profile().max_part_size
    }

    /// Configured adjustments to the profile's polling bounds; adapters built
    /// with overrides return them here.
    fn timing(&self) -> TimingOverrides {
        TimingOverrides::default()
    }

    /// Pure completion decision against one DOM snapshot.
    fn poll_state(&self, html: &str, baseline: &Baseline) -> PollState;

    /// Number of conversation-turn containers currently rendered. An empty
    /// page is 0, never an error.
    async fn turn_count(&self) -> Result<usize> {
        self.dom().count(self.profile().container).await
    }

    /// Record the counters completion polling will compare against.
    async fn baseline(&self) -> Result<Baseline> {
        let html = self.dom().html().await?;
        Ok(self.read_baseline(&html))
    }

    /// Snapshot variant of [`ChatProvider::baseline`].
    fn read_baseline(&self, html: &str) -> Baseline {
        let profile = self.profile();
        Baseline {
            turns: extract::turn_count(html, profile),
            completed: profile
                .completed
                .map(|sel| extract::count(html, sel))
                .unwrap_or(0),
        }
    }

    /// Extract every complete turn in order. Incomplete containers are
    /// skipped; a turn whose conversion fails carries a placeholder answer.
    async fn chat_messages(&self) -> Result<Vec<ChatMessage>> {
        let html = self.dom().html().await?;
        Ok(extract::collect_turns(&html, self.profile()))
    }

    /// The newest extracted turn, if any.
    async fn retrieve_response(&self) -> Result<Option<ChatMessage>> {
        let html = self.dom().html().await?;
        Ok(extract::collect_turns(&html, self.profile()).pop())
    }

    /// Fill the page's input control and trigger submission.
    ///
    /// Distinguishes "not found within the wait bound" from "found but
    /// disabled"; sites that expose an already-running state override this
    /// to report [`AutomationError::AlreadyRunning`].
    async fn submit_prompt(&self, message: &str) -> Result<()> {
        let profile = self.profile();
        let element_wait = Duration::from_millis(profile.element_wait_ms);

        wait_for_selector(self.dom(), profile.textbox, element_wait).await?;
        self.dom().fill(profile.textbox, message).await?;

        wait_for_selector(self.dom(), profile.send_button, element_wait).await?;
        match self.dom().is_enabled(profile.send_button).await? {
            Some(true) => self.dom().click(profile.send_button).await,
            Some(false) => Err(AutomationError::ElementDisabled {
                selector: profile.send_button.to_string(),
            }),
            None => Err(AutomationError::ElementNotFound {
                selector: profile.send_button.to_string(),
                timeout_ms: profile.element_wait_ms,
            }),
        }
    }

    /// Poll the DOM until a new completed turn appears beyond `baseline`, the
    /// page signals a stop, or the ceiling elapses. Bounded: always returns.
    async fn wait_for_completion(&self, baseline: Baseline) -> Result<WaitOutcome> {
        let profile = self.profile();
        let timing = self.timing();
        poll_until(
            self.dom(),
            Duration::from_millis(profile.effective_max_wait_ms(&timing)),
            Duration::from_millis(profile.effective_poll_interval_ms(&timing)),
            |html| self.poll_state(html, &baseline),
        )
        .await
    }

    /// Best-effort signal that generation was aborted. Sites with no such
    /// signal in their markup report `false`.
    async fn detect_stopped(&self) -> bool {
        let Some(stopped) = self.profile().stopped else {
            return false;
        };
        match self.dom().html().await {
            Ok(html) => extract::exists(&html, stopped),
            Err(err) => {
                debug!(%err, "stop detection failed; assuming not stopped");
                false
            }
        }
    }

    /// Navigate the session to the site's new-conversation URL.
    async fn new_chat(&self) -> Result<()> {
        self.dom().navigate(self.profile().new_chat_url).await
    }
}

/// Cancellable bounded-retry loop over DOM snapshots.
///
/// Re-reads the page HTML every `interval`, feeds it to `check`, and returns
/// the tri-state outcome. Never hangs: `ceiling` converts an unobserved
/// completion into [`WaitOutcome::TimedOut`].
pub async fn poll_until<F>(
    dom: &dyn PageDom,
    ceiling: Duration,
    interval: Duration,
    check: F,
) -> Result<WaitOutcome>
where
    F: Fn(&str) -> PollState + Send + Sync,
{
    let started = Instant::now();
    loop {
        let html = dom.html().await?;
        match check(&html) {
            PollState::Ready => {
                debug!(elapsed_ms = started.elapsed().as_millis() as u64, "turn completed");
                return Ok(WaitOutcome::Completed);
            }
            PollState::Stopped => return Ok(WaitOutcome::Stopped),
            PollState::NotYet => {}
        }
        if started.elapsed() >= ceiling {
            warn!(
                ceiling_ms = ceiling.as_millis() as u64,
                "timed out waiting for request completion"
            );
            return Ok(WaitOutcome::TimedOut);
        }
        sleep(interval).await;
    }
}

/// Wait (bounded) for `selector` to match something on the live page.
pub async fn wait_for_selector(
    dom: &dyn PageDom,
    selector: &str,
    timeout: Duration,
) -> Result<()> {
    let started = Instant::now();
    loop {
        if dom.exists(selector).await? {
            return Ok(());
        }
        if started.elapsed() >= timeout {
            return Err(AutomationError::ElementNotFound {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        sleep(ELEMENT_POLL_INTERVAL).await;
    }
}
