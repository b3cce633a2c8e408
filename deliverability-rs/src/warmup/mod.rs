//! Warm-up limits
//!
//! Derives an account's maximum daily volume from its age, and reconciles that
//! ceiling with the limit an operator configured for the account.

pub mod calculator;
pub mod types;

pub use types::{DailyLimit, EffectiveLimit, WarmupConfig};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

static DEFAULT_WARMUP: Lazy<WarmupConfig> = Lazy::new(WarmupConfig::default);

/// Today's warm-up ceiling for an account created at `account_created_at`
pub fn warmup_daily_limit(account_created_at: DateTime<Utc>) -> DailyLimit {
    warmup_daily_limit_at(account_created_at, Utc::now())
}

pub fn warmup_daily_limit_at(account_created_at: DateTime<Utc>, now: DateTime<Utc>) -> DailyLimit {
    DEFAULT_WARMUP.daily_limit_at(account_created_at, now)
}

/// Today's effective ceiling: the configured limit, never above the warm-up ceiling
pub fn effective_daily_limit(
    user_configured_limit: u32,
    account_created_at: DateTime<Utc>,
) -> EffectiveLimit {
    effective_daily_limit_at(user_configured_limit, account_created_at, Utc::now())
}

pub fn effective_daily_limit_at(
    user_configured_limit: u32,
    account_created_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> EffectiveLimit {
    DEFAULT_WARMUP.effective_limit_at(user_configured_limit, account_created_at, now)
}
