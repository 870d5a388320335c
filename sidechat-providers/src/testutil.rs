//! In-memory [`PageDom`] double for adapter tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use scraper::{Html, Selector};
use sidechat_common::{AutomationError, Result};
use sidechat_drivers::PageDom;

/// Page double backed by a queue of HTML snapshots.
///
/// Each call to `html()` advances to the next queued snapshot, so polling
/// loops observe the page "mutating" between iterations; the last snapshot
/// then repeats forever. Element probes (`count`, `is_enabled`) read the
/// current snapshot without advancing. Mutating calls are recorded for
/// assertions.
pub struct FixtureDom {
    queued: Mutex<VecDeque<String>>,
    current: Mutex<String>,
    pub fills: Mutex<Vec<(String, String)>>,
    pub clicks: Mutex<Vec<String>>,
    pub navigations: Mutex<Vec<String>>,
}

impl FixtureDom {
    pub fn new(html: &str) -> Self {
        Self::with_states(&[html])
    }

    /// First entry is the initial page; the rest are served by successive
    /// `html()` calls.
    pub fn with_states(states: &[&str]) -> Self {
        assert!(!states.is_empty(), "fixture needs at least one snapshot");
        Self {
            queued: Mutex::new(states[1..].iter().map(|s| s.to_string()).collect()),
            current: Mutex::new(states[0].to_string()),
            fills: Mutex::new(Vec::new()),
            clicks: Mutex::new(Vec::new()),
            navigations: Mutex::new(Vec::new()),
        }
    }

    fn snapshot(&self) -> String {
        self.current.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageDom for FixtureDom {
    async fn html(&self) -> Result<String> {
        if let Some(next) = self.queued.lock().unwrap().pop_front() {
            *self.current.lock().unwrap() = next;
        }
        Ok(self.snapshot())
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        Ok(crate::extract::count(&self.snapshot(), selector))
    }

    async fn is_enabled(&self, selector: &str) -> Result<Option<bool>> {
        let html = self.snapshot();
        let Ok(sel) = Selector::parse(selector) else {
            return Ok(None);
        };
        let doc = Html::parse_document(&html);
        Ok(doc
            .select(&sel)
            .next()
            .map(|el| el.value().attr("disabled").is_none()))
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<()> {
        if !crate::extract::exists(&self.snapshot(), selector) {
            return Err(AutomationError::ElementNotFound {
                selector: selector.to_string(),
                timeout_ms: 0,
            });
        }
        self.fills
            .lock()
            .unwrap()
            .push((selector.to_string(), text.to_string()));
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        if !crate::extract::exists(&self.snapshot(), selector) {
            return Err(AutomationError::ElementNotFound {
                selector: selector.to_string(),
                timeout_ms: 0,
            });
        }
        self.clicks.lock().unwrap().push(selector.to_string());
        Ok(())
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        self.navigations.lock().unwrap().push(url.to_string());
        Ok(())
    }
}
