use anyhow::anyhow;
use async_trait::async_trait;
use fantoccini::{Client, Locator};
use sidechat_common::{AutomationError, Result};

use crate::typing::TypingCadence;

/// The live-page surface the per-site adapters talk through.
///
/// Everything an adapter does reduces to these operations: read the rendered
/// HTML, probe selectors, fill the input control, click, navigate. Keeping
/// the seam this narrow lets adapter logic run against fixture DOM doubles
/// in tests.
#[async_trait]
pub trait PageDom: Send + Sync {
    /// Full serialized HTML of the current document.
    async fn html(&self) -> Result<String>;

    /// Number of elements currently matching `selector`; zero matches is not
    /// an error.
    async fn count(&self, selector: &str) -> Result<usize>;

    /// Whether at least one element matches `selector` right now.
    async fn exists(&self, selector: &str) -> Result<bool> {
        Ok(self.count(selector).await? > 0)
    }

    /// Enabled state of the first match, or `None` when nothing matches.
    async fn is_enabled(&self, selector: &str) -> Result<Option<bool>>;

    /// Set the matched input control's content and dispatch synthetic
    /// `input`/`change` events so the host page's framework observes the
    /// change. Fails with [`AutomationError::ElementNotFound`] when the
    /// selector matches nothing.
    async fn fill(&self, selector: &str, text: &str) -> Result<()>;

    /// Click the first element matching `selector`.
    async fn click(&self, selector: &str) -> Result<()>;

    /// Point the page at a new URL.
    async fn navigate(&self, url: &str) -> Result<()>;
}

/// Sets the control's content in-page and fires the events a framework-bound
/// input expects. Handles both contenteditable surfaces and form controls.
const FILL_SCRIPT: &str = r#"
    const el = document.querySelector(arguments[0]);
    if (!el) return false;
    if (el.isContentEditable) {
        el.focus();
        el.textContent = arguments[1];
    } else {
        el.value = arguments[1];
    }
    el.dispatchEvent(new Event('input', { bubbles: true, cancelable: true }));
    el.dispatchEvent(new Event('change', { bubbles: true, cancelable: true }));
    return true;
"#;

/// [`PageDom`] implementation backed by a live WebDriver session.
pub struct WebDriverDom {
    client: Client,
    typing: Option<TypingCadence>,
}

impl WebDriverDom {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            typing: None,
        }
    }

    /// Type character-by-character with human-like pauses instead of filling
    /// the control in one script call.
    pub fn with_humanized_typing(mut self) -> Self {
        self.typing = Some(TypingCadence::new());
        self
    }
}

fn driver_err(e: fantoccini::error::CmdError) -> AutomationError {
    AutomationError::Driver(anyhow!(e))
}

#[async_trait]
impl PageDom for WebDriverDom {
    async fn html(&self) -> Result<String> {
        self.client.source().await.map_err(driver_err)
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        let found = self
            .client
            .find_all(Locator::Css(selector))
            .await
            .map_err(driver_err)?;
        Ok(found.len())
    }

    async fn is_enabled(&self, selector: &str) -> Result<Option<bool>> {
        let found = self
            .client
            .find_all(Locator::Css(selector))
            .await
            .map_err(driver_err)?;
        match found.into_iter().next() {
            Some(element) => Ok(Some(element.is_enabled().await.map_err(driver_err)?)),
            None => Ok(None),
        }
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<()> {
        if let Some(typing) = &self.typing {
            let mut found = self
                .client
                .find_all(Locator::Css(selector))
                .await
                .map_err(driver_err)?;
            let element = found
                .drain(..)
                .next()
                .ok_or_else(|| AutomationError::ElementNotFound {
                    selector: selector.to_string(),
                    timeout_ms: 0,
                })?;
            element.click().await.map_err(driver_err)?;
            typing.type_text(&element, text).await?;
            return Ok(());
        }

        let result = self
            .client
            .execute(FILL_SCRIPT, vec![selector.into(), text.into()])
            .await
            .map_err(driver_err)?;
        if result.as_bool() == Some(true) {
            Ok(())
        } else {
            Err(AutomationError::ElementNotFound {
                selector: selector.to_string(),
                timeout_ms: 0,
            })
        }
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let mut found = self
            .client
            .find_all(Locator::Css(selector))
            .await
            .map_err(driver_err)?;
        let element = found
            .drain(..)
            .next()
            .ok_or_else(|| AutomationError::ElementNotFound {
                selector: selector.to_string(),
                timeout_ms: 0,
            })?;
        element.click().await.map_err(driver_err)?;
        Ok(())
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        self.client.goto(url).await.map_err(driver_err)
    }
}
