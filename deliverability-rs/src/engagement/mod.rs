//! Contact engagement classification for list hygiene

pub mod classifier;
pub mod types;

pub use types::{
    ContactEngagement, EngagementConfig, EngagementVerdict, HygieneReport, LifecycleAction,
    Segment,
};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

static DEFAULT_ENGAGEMENT: Lazy<EngagementConfig> = Lazy::new(EngagementConfig::default);

/// Segment a contact by engagement recency as of now
pub fn evaluate_contact_engagement(contact: &ContactEngagement) -> EngagementVerdict {
    evaluate_contact_engagement_at(contact, Utc::now())
}

pub fn evaluate_contact_engagement_at(
    contact: &ContactEngagement,
    now: DateTime<Utc>,
) -> EngagementVerdict {
    DEFAULT_ENGAGEMENT.classify_at(contact, now)
}
