//! Recency-based contact classification
//!
//! Receiving servers measure recipient-level engagement, so continuing to
//! mail people who never open depresses inbox placement for the whole domain.
//! Each contact is segmented by days since its last open or click, falling
//! back to its signup date when it never engaged.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::types::{
    ContactEngagement, EngagementConfig, EngagementVerdict, HygieneReport, LifecycleAction,
};
use crate::schedule::age_in_days;

impl EngagementConfig {
    pub fn classify_at(&self, contact: &ContactEngagement, now: DateTime<Utc>) -> EngagementVerdict {
        let days = age_in_days(contact.reference_time(), now);
        let segment = *self.segments.value_at(days);
        EngagementVerdict {
            segment,
            action: segment.recommended_action(),
            days_since_engagement: days,
        }
    }

    /// Classify every contact and tally the outcome
    pub fn hygiene_report_at<'a, I>(&self, contacts: I, now: DateTime<Utc>) -> HygieneReport
    where
        I: IntoIterator<Item = &'a ContactEngagement>,
    {
        let report =
            HygieneReport::from_verdicts(contacts.into_iter().map(|c| self.classify_at(c, now)));
        debug!(
            total = report.total,
            suppress = report.count_action(LifecycleAction::Suppress),
            "List hygiene pass classified contacts"
        );
        report
    }
}

impl HygieneReport {
    pub fn from_verdicts<I>(verdicts: I) -> Self
    where
        I: IntoIterator<Item = EngagementVerdict>,
    {
        let mut report = HygieneReport::default();
        for verdict in verdicts {
            report.total += 1;
            *report.by_segment.entry(verdict.segment).or_insert(0) += 1;
            *report.by_action.entry(verdict.action).or_insert(0) += 1;
        }
        report
    }
}
