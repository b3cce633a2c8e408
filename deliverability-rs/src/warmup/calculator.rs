//! Warm-up ceiling and effective daily limit
//!
//! New sending accounts must ramp volume gradually to build reputation with
//! receiving mail servers. The ceiling depends on account age alone, and an
//! operator-configured limit can only lower it, never raise it.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::types::{DailyLimit, EffectiveLimit, WarmupConfig};
use crate::schedule::age_in_days;

impl WarmupConfig {
    /// Warm-up ceiling for an account that is `age_days` whole days old
    pub fn limit_for_age(&self, age_days: u32) -> DailyLimit {
        *self.steps.value_at(age_days)
    }

    /// Warm-up ceiling for an account created at `created_at`, as of `now`
    pub fn daily_limit_at(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> DailyLimit {
        self.limit_for_age(age_in_days(created_at, now))
    }

    /// Reconcile the warm-up ceiling with the operator's configured limit
    pub fn effective_limit_at(
        &self,
        configured_limit: u32,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> EffectiveLimit {
        let age_days = age_in_days(created_at, now);
        let warmup = self.limit_for_age(age_days);
        let configured = DailyLimit::Capped(configured_limit);

        let effective = EffectiveLimit {
            limit: configured.min(warmup),
            is_warmup_restricted: warmup < configured,
            warmup_day: age_days.saturating_add(1),
        };

        debug!(
            warmup_day = effective.warmup_day,
            warmup_limit = %warmup,
            configured_limit,
            limit = %effective.limit,
            "Resolved effective daily limit"
        );

        effective
    }
}
