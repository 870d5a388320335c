//! Host detection and provider construction.

use std::sync::Arc;

use sidechat_common::{AutomationError, Result};
use sidechat_drivers::PageDom;
use url::Url;

use crate::profile::{ProviderKind, SiteProfile, TimingOverrides};
use crate::provider::ChatProvider;
use crate::sites::{Aistudio, Claude, Copilot, Deepseek, Gemini, Grok, Poe};

/// Map a page URL to the site it belongs to, by exact hostname match.
pub fn detect(url: &Url) -> Option<ProviderKind> {
    let host = url.host_str()?;
    ProviderKind::all()
        .iter()
        .copied()
        .find(|kind| site_profile(*kind).hosts.contains(&host))
}

/// The selector/timing record for a site.
pub fn site_profile(kind: ProviderKind) -> &'static SiteProfile {
    match kind {
        ProviderKind::Gemini => &crate::sites::gemini::GEMINI,
        ProviderKind::Claude => &crate::sites::claude::CLAUDE,
        ProviderKind::Grok => &crate::sites::grok::GROK,
        ProviderKind::Copilot => &crate::sites::copilot::COPILOT,
        ProviderKind::Deepseek => &crate::sites::deepseek::DEEPSEEK,
        ProviderKind::Aistudio => &crate::sites::aistudio::AISTUDIO,
        ProviderKind::Poe => &crate::sites::poe::POE,
    }
}

/// Construct the adapter for a known site over the given page handle, with
/// configured timing overrides applied.
pub fn build_provider(
    kind: ProviderKind,
    dom: Arc<dyn PageDom>,
    timing: TimingOverrides,
) -> Box<dyn ChatProvider> {
    match kind {
        ProviderKind::Gemini => Box::new(Gemini::new(dom).with_timing(timing)),
        ProviderKind::Claude => Box::new(Claude::new(dom).with_timing(timing)),
        ProviderKind::Grok => Box::new(Grok::new(dom).with_timing(timing)),
        ProviderKind::Copilot => Box::new(Copilot::new(dom).with_timing(timing)),
        ProviderKind::Deepseek => Box::new(Deepseek::new(dom).with_timing(timing)),
        ProviderKind::Aistudio => Box::new(Aistudio::new(dom).with_timing(timing)),
        ProviderKind::Poe => Box::new(Poe::new(dom).with_timing(timing)),
    }
}

/// Detect the site behind `url` and build its adapter, or refuse the host.
pub fn provider_for_url(
    url: &Url,
    dom: Arc<dyn PageDom>,
    timing: TimingOverrides,
) -> Result<Box<dyn ChatProvider>> {
    let kind = detect(url).ok_or_else(|| {
        AutomationError::UnsupportedHost(url.host_str().unwrap_or("<no host>").to_string())
    })?;
    Ok(build_provider(kind, dom, timing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FixtureDom;
    use pretty_assertions::assert_eq;

    fn kind_of(url: &str) -> Option<ProviderKind> {
        detect(&Url::parse(url).unwrap())
    }

    #[test]
    fn recognizes_every_supported_host() {
        assert_eq!(kind_of("https://gemini.google.com/app"), Some(ProviderKind::Gemini));
        assert_eq!(kind_of("https://claude.ai/chat/abc123"), Some(ProviderKind::Claude));
        assert_eq!(kind_of("https://grok.com/"), Some(ProviderKind::Grok));
        assert_eq!(kind_of("https://copilot.microsoft.com/"), Some(ProviderKind::Copilot));
        assert_eq!(kind_of("https://chat.deepseek.com/a/chat"), Some(ProviderKind::Deepseek));
        assert_eq!(
            kind_of("https://aistudio.google.com/prompts/new_chat"),
            Some(ProviderKind::Aistudio)
        );
        assert_eq!(kind_of("https://poe.com/Assistant"), Some(ProviderKind::Poe));
    }

    #[test]
    fn rejects_lookalike_hosts() {
        assert_eq!(kind_of("https://claude.ai.evil.example/"), None);
        assert_eq!(kind_of("https://www.google.com/"), None);
        assert_eq!(kind_of("https://deepseek.com/"), None);
    }

    #[test]
    fn unsupported_host_is_a_typed_error() {
        let url = Url::parse("https://example.org/").unwrap();
        let result =
            provider_for_url(&url, Arc::new(FixtureDom::new("")), TimingOverrides::default());
        assert!(matches!(
            result,
            Err(AutomationError::UnsupportedHost(host)) if host == "example.org"
        ));
    }

    #[test]
    fn builds_the_matching_adapter() {
        let url = Url::parse("https://poe.com/").unwrap();
        let provider = provider_for_url(
            &url,
            Arc::new(FixtureDom::new("")),
            TimingOverrides::default(),
        )
        .unwrap();
        assert_eq!(provider.kind(), ProviderKind::Poe);
    }

    #[test]
    fn timing_overrides_reach_the_adapter() {
        let timing = TimingOverrides {
            max_wait_ms: Some(5_000),
            poll_interval_ms: None,
        };
        let provider = build_provider(ProviderKind::Gemini, Arc::new(FixtureDom::new("")), timing);
        assert_eq!(provider.timing(), timing);
        assert_eq!(provider.profile().effective_max_wait_ms(&provider.timing()), 5_000);
    }
}
