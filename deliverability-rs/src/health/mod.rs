//! Campaign health monitoring
//!
//! Keeps a runaway campaign from burning sender reputation: bounce or complaint
//! rates past the pause thresholds stop the send run until a human intervenes.

pub mod monitor;
pub mod types;

pub use types::{CampaignStat, HealthAction, HealthThresholds, HealthVerdict};

use once_cell::sync::Lazy;

static DEFAULT_THRESHOLDS: Lazy<HealthThresholds> = Lazy::new(HealthThresholds::default);

/// Check the combined history of `stats` against the default thresholds
pub fn check_campaign_health(stats: &[CampaignStat]) -> HealthVerdict {
    DEFAULT_THRESHOLDS.evaluate(stats)
}
