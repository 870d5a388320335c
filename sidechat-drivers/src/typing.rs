use fantoccini::elements::Element;
use rand::rngs::OsRng;
use rand::Rng;
use sidechat_common::Result;
use std::time::Duration;
use tokio::time::sleep;

/// Produces human-like typing cadence for hosts that debounce or rate-check
/// scripted input.
#[derive(Debug, Clone)]
pub struct TypingCadence {
    min_ms: u64,
    max_ms: u64,
}

impl TypingCadence {
    pub fn new() -> Self {
        Self {
            min_ms: 30,
            max_ms: 150,
        }
    }

    /// Sleep for a random duration between the configured bounds.
    pub async fn pause(&self) {
        let mut rng = OsRng;
        let ms = rng.gen_range(self.min_ms..=self.max_ms);
        sleep(Duration::from_millis(ms)).await;
    }

    /// Type the provided text with small random delays between characters.
    pub async fn type_text(&self, element: &Element, text: &str) -> Result<()> {
        for ch in text.chars() {
            element
                .send_keys(&ch.to_string())
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
            self.pause().await;
        }
        Ok(())
    }
}

impl Default for TypingCadence {
    fn default() -> Self {
        Self::new()
    }
}
