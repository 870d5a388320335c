use std::collections::HashMap;

use anyhow::Result;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use tracing::info;
use webdriver::capabilities::Capabilities;

use crate::dom::WebDriverDom;

/// Chrome launch arguments for driving consumer chat sites.
///
/// The automation-controlled blink feature must be off or several hosts
/// refuse to render their input controls.
fn build_browser_args(headless: bool) -> Vec<String> {
    let mut args = vec![
        "--disable-blink-features=AutomationControlled".to_string(),
        "--disable-infobars".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--no-sandbox".to_string(),
        "--window-size=1440,900".to_string(),
        "--lang=en-US,en".to_string(),
    ];
    if headless {
        args.push("--headless=new".to_string());
        args.push("--disable-gpu".to_string());
    }
    args
}

/// Script applied after navigation so the host page's own bot checks do not
/// hide the chat surface from us.
const WEBDRIVER_FLAG_EVASION: &str = r#"
    Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
"#;

/// Thin wrapper around a `fantoccini` WebDriver client.
///
/// One driver owns one browser session; [`SidechatDriver::goto`] hands out a
/// [`WebDriverDom`] bound to the same session.
pub struct SidechatDriver {
    client: Client,
}

impl SidechatDriver {
    /// Connect to a running WebDriver service (e.g. chromedriver) at
    /// `webdriver_url`.
    pub async fn connect(webdriver_url: &str, headless: bool) -> Result<Self> {
        let mut caps = Capabilities::new();
        let mut chrome_opts = HashMap::new();
        chrome_opts.insert("args".to_string(), json!(build_browser_args(headless)));
        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(webdriver_url)
            .await?;

        info!(webdriver_url, headless, "WebDriver session established");
        Ok(Self { client })
    }

    /// Navigate to `url` and return a page handle bound to this session.
    pub async fn goto(&self, url: &str) -> Result<WebDriverDom> {
        self.client.goto(url).await?;
        self.client
            .execute(WEBDRIVER_FLAG_EVASION, vec![])
            .await?;
        Ok(WebDriverDom::new(self.client.clone()))
    }

    /// Attach to whatever page the session is currently showing.
    pub fn current_page(&self) -> WebDriverDom {
        WebDriverDom::new(self.client.clone())
    }

    /// URL of the active page.
    pub async fn current_url(&self) -> Result<url::Url> {
        Ok(self.client.current_url().await?)
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}
