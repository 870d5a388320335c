//! One adapter per host site.
//!
//! Each module holds the site's selector profile and its completion-poll
//! decision. Sites whose behavior diverges from the defaults (AI Studio's
//! run-button states, Gemini's stopped-draft marker) override the relevant
//! trait methods; everything else rides on the defaults.

pub mod aistudio;
pub mod claude;
pub mod copilot;
pub mod deepseek;
pub mod gemini;
pub mod grok;
pub mod poe;

pub use aistudio::Aistudio;
pub use claude::Claude;
pub use copilot::Copilot;
pub use deepseek::Deepseek;
pub use gemini::Gemini;
pub use grok::Grok;
pub use poe::Poe;

use crate::extract;
use crate::profile::SiteProfile;
use crate::provider::{Baseline, PollState};

/// Completion rule for sites with a distinct completed-turn indicator: the
/// indicator count must grow past the baseline AND a new turn container must
/// be present.
pub(crate) fn completed_marker_growth(
    html: &str,
    profile: &SiteProfile,
    baseline: &Baseline,
) -> PollState {
    let Some(completed) = profile.completed else {
        return PollState::NotYet;
    };
    let done = extract::count(html, completed) > baseline.completed
        && extract::turn_count(html, profile) > baseline.turns;
    if done {
        PollState::Ready
    } else {
        PollState::NotYet
    }
}
