//! Send pacing
//!
//! Sending too fast trips per-connection rate limiting at receiving servers
//! even when the daily cap is respected. Pacing ramps burst rate with account
//! age, alongside the warm-up volume ramp. The numbers are advisory: the send
//! loop sleeps and batches on its own.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Result;
use crate::schedule::{age_in_days, Step, StepSchedule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendPace {
    pub batch_size: u32,
    pub per_email_delay_ms: u64,
}

impl SendPace {
    pub fn new(batch_size: u32, per_email_delay_ms: u64) -> Self {
        Self {
            batch_size,
            per_email_delay_ms,
        }
    }

    pub fn per_email_delay(&self) -> Duration {
        Duration::from_millis(self.per_email_delay_ms)
    }
}

/// Age bands for pacing. Intermediate batch sizes are tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub bands: StepSchedule<SendPace>,
}

impl Default for PacingConfig {
    fn default() -> Self {
        let bands = vec![
            Step::new(0, SendPace::new(10, 200)),
            Step::new(7, SendPace::new(20, 150)),
            Step::new(20, SendPace::new(35, 100)),
            Step::new(30, SendPace::new(50, 50)),
        ];
        Self {
            bands: StepSchedule::new(bands).expect("built-in pacing bands are ordered"),
        }
    }
}

impl PacingConfig {
    /// Older accounts may send bigger batches with shorter gaps, never the reverse
    pub fn validate(&self) -> Result<()> {
        self.bands.ensure_monotonic("pacing", |a, b| {
            a.batch_size <= b.batch_size && a.per_email_delay_ms >= b.per_email_delay_ms
        })
    }

    pub fn pace_at(&self, account_created_at: DateTime<Utc>, now: DateTime<Utc>) -> SendPace {
        *self.bands.value_at(age_in_days(account_created_at, now))
    }
}

static DEFAULT_PACING: Lazy<PacingConfig> = Lazy::new(PacingConfig::default);

/// Delay between consecutive emails, in milliseconds
pub fn send_delay(account_created_at: DateTime<Utc>) -> u64 {
    sending_pace(account_created_at).per_email_delay_ms
}

pub fn sending_pace(account_created_at: DateTime<Utc>) -> SendPace {
    sending_pace_at(account_created_at, Utc::now())
}

pub fn sending_pace_at(account_created_at: DateTime<Utc>, now: DateTime<Utc>) -> SendPace {
    DEFAULT_PACING.pace_at(account_created_at, now)
}
