//! Deliverability guard
//!
//! One validated configuration with every decision bound to it. The guard
//! holds only immutable data, so a single instance can be shared across
//! sending workers behind an `Arc`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::GuardConfig;
use crate::engagement::{ContactEngagement, EngagementVerdict, HygieneReport};
use crate::error::Result;
use crate::health::{CampaignStat, HealthVerdict};
use crate::pacing::SendPace;
use crate::spam::{SpamAnalysis, SpamScorer};
use crate::warmup::{DailyLimit, EffectiveLimit};

/// Why an email may not be queued right now
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RefusalReason {
    /// Content scored as blocked
    ContentBlocked { score: f64 },
    /// Today's effective limit is used up
    DailyLimitReached { limit: DailyLimit, sent_today: u32 },
}

/// Outcome of the pre-queue checks for one email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreflightDecision {
    pub content: SpamAnalysis,
    pub limit: EffectiveLimit,
    pub refusal: Option<RefusalReason>,
}

impl PreflightDecision {
    pub fn may_send(&self) -> bool {
        self.refusal.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct DeliverabilityGuard {
    config: GuardConfig,
    scorer: SpamScorer,
}

impl DeliverabilityGuard {
    pub fn new(config: GuardConfig) -> Result<Self> {
        config.validate()?;
        let scorer = SpamScorer::new(config.content.clone())?;
        info!(
            trigger_words = config.content.trigger_words.len(),
            warmup_steps = config.warmup.steps.steps().len(),
            "Deliverability guard ready"
        );
        Ok(Self { config, scorer })
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn analyze_content(&self, subject: &str, html: &str) -> SpamAnalysis {
        self.scorer.score(subject, html)
    }

    pub fn warmup_daily_limit(
        &self,
        account_created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> DailyLimit {
        self.config.warmup.daily_limit_at(account_created_at, now)
    }

    pub fn effective_daily_limit(
        &self,
        user_configured_limit: u32,
        account_created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> EffectiveLimit {
        self.config
            .warmup
            .effective_limit_at(user_configured_limit, account_created_at, now)
    }

    pub fn campaign_health(&self, stats: &[CampaignStat]) -> HealthVerdict {
        self.config.health.evaluate(stats)
    }

    pub fn contact_engagement(
        &self,
        contact: &ContactEngagement,
        now: DateTime<Utc>,
    ) -> EngagementVerdict {
        self.config.engagement.classify_at(contact, now)
    }

    pub fn hygiene_report(&self, contacts: &[ContactEngagement], now: DateTime<Utc>) -> HygieneReport {
        self.config.engagement.hygiene_report_at(contacts, now)
    }

    pub fn sending_pace(&self, account_created_at: DateTime<Utc>, now: DateTime<Utc>) -> SendPace {
        self.config.pacing.pace_at(account_created_at, now)
    }

    /// Milliseconds to wait between consecutive emails
    pub fn send_delay(&self, account_created_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
        self.sending_pace(account_created_at, now).per_email_delay_ms
    }

    /// Checks to run before queuing one campaign email: content first, then
    /// whether today's effective limit has room left.
    pub fn preflight(
        &self,
        subject: &str,
        html: &str,
        user_configured_limit: u32,
        account_created_at: DateTime<Utc>,
        sent_today: u32,
        now: DateTime<Utc>,
    ) -> PreflightDecision {
        let content = self.analyze_content(subject, html);
        let limit = self.effective_daily_limit(user_configured_limit, account_created_at, now);

        let refusal = if content.level.should_block() {
            Some(RefusalReason::ContentBlocked {
                score: content.score,
            })
        } else if !limit.allows(sent_today) {
            Some(RefusalReason::DailyLimitReached {
                limit: limit.limit,
                sent_today,
            })
        } else {
            None
        };

        if let Some(reason) = &refusal {
            debug!(?reason, "Preflight refused email");
        }

        PreflightDecision {
            content,
            limit,
            refusal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engagement::Segment;
    use crate::health::HealthAction;
    use crate::spam::SpamLevel;
    use chrono::Duration;

    fn guard() -> DeliverabilityGuard {
        DeliverabilityGuard::new(GuardConfig::default()).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = GuardConfig::default();
        config.health.warn_bounce_rate = 10.0;
        assert!(DeliverabilityGuard::new(config).is_err());
    }

    #[test]
    fn test_guard_uses_custom_rules() {
        let mut config = GuardConfig::default();
        config.content.trigger_words = vec!["webinar".to_string()];
        let guard = DeliverabilityGuard::new(config).unwrap();
        let analysis = guard.analyze_content("Join the webinar", "<p>hi</p>");
        assert!(analysis.trigger_words.contains("WEBINAR"));
    }

    #[test]
    fn test_preflight_allows_clean_email() {
        let now = Utc::now();
        let decision = guard().preflight(
            "October roadmap",
            "<p>Hello</p>",
            2000,
            now - Duration::days(60),
            120,
            now,
        );
        assert!(decision.may_send());
        assert_eq!(decision.content.level, SpamLevel::Safe);
        assert_eq!(decision.limit.limit, DailyLimit::Capped(2000));
    }

    #[test]
    fn test_preflight_refuses_blocked_content() {
        let now = Utc::now();
        let decision = guard().preflight(
            "FREE!!! CLICK HERE NOW!!!",
            r#"<script>x</script><p style="font-size:0">hidden</p>"#,
            2000,
            now - Duration::days(60),
            0,
            now,
        );
        assert!(!decision.may_send());
        assert!(matches!(
            decision.refusal,
            Some(RefusalReason::ContentBlocked { .. })
        ));
    }

    #[test]
    fn test_preflight_refuses_at_warmup_ceiling() {
        let now = Utc::now();
        let decision = guard().preflight("Hello again", "<p>Hi</p>", 2000, now, 50, now);
        assert_eq!(
            decision.refusal,
            Some(RefusalReason::DailyLimitReached {
                limit: DailyLimit::Capped(50),
                sent_today: 50,
            })
        );
        assert!(decision.limit.is_warmup_restricted);
    }

    #[test]
    fn test_guard_delegates() {
        let guard = guard();
        let now = Utc::now();
        let created = now - Duration::days(8);

        assert_eq!(guard.warmup_daily_limit(created, now), DailyLimit::Capped(200));
        assert_eq!(guard.send_delay(created, now), 150);
        assert_eq!(guard.sending_pace(created, now).batch_size, 20);

        let health = guard.campaign_health(&[CampaignStat::new(1000, 30, 0)]);
        assert_eq!(health.action, HealthAction::Pause);

        let contact = ContactEngagement::new(now - Duration::days(100));
        assert_eq!(guard.contact_engagement(&contact, now).segment, Segment::AtRisk);
        assert_eq!(guard.hygiene_report(&[contact], now).total, 1);
    }

    #[test]
    fn test_refusal_wire_format() {
        let reason = RefusalReason::DailyLimitReached {
            limit: DailyLimit::Capped(50),
            sent_today: 50,
        };
        let json = serde_json::to_value(&reason).unwrap();
        assert_eq!(json["kind"], "daily_limit_reached");
        assert_eq!(json["limit"], 50);
    }
}
