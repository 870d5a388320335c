//! Per-site chat-automation adapters.
//!
//! Every supported host renders conversation turns differently and changes
//! its markup over time. This crate isolates that churn behind the
//! [`provider::ChatProvider`] capability trait: one implementing type per
//! site, selector strings kept as named constants in a [`profile::SiteProfile`]
//! record, and all selector logic expressed as pure functions over DOM
//! snapshots so it can be exercised against fixture HTML.
//!
//! The orchestration layer never sees site specifics — it receives a boxed
//! provider from [`detect::provider_for_url`] and drives it through the
//! uniform operation set.

pub mod detect;
pub mod extract;
pub mod profile;
pub mod provider;
pub mod sites;

#[cfg(test)]
pub(crate) mod testutil;

pub use detect::{build_provider, detect, provider_for_url, site_profile};
pub use profile::{ProviderKind, SiteProfile, TimingOverrides, TurnLayout};
pub use provider::{Baseline, ChatProvider, PollState};
