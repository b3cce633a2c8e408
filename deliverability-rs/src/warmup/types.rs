use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GuardError, Result};
use crate::schedule::{Step, StepSchedule};

/// Maximum number of emails an account may send in one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "LimitRepr", into = "LimitRepr")]
pub enum DailyLimit {
    Capped(u32),
    /// No warm-up ceiling; sorts above every cap
    Unlimited,
}

impl DailyLimit {
    pub fn is_unlimited(&self) -> bool {
        matches!(self, DailyLimit::Unlimited)
    }

    pub fn as_cap(&self) -> Option<u32> {
        match self {
            DailyLimit::Capped(n) => Some(*n),
            DailyLimit::Unlimited => None,
        }
    }

    /// Sends left after `sent` have gone out today
    pub fn remaining(&self, sent: u32) -> DailyLimit {
        match self {
            DailyLimit::Capped(n) => DailyLimit::Capped(n.saturating_sub(sent)),
            DailyLimit::Unlimited => DailyLimit::Unlimited,
        }
    }

    /// Whether one more email fits after `sent` today
    pub fn allows(&self, sent: u32) -> bool {
        match self {
            DailyLimit::Capped(n) => sent < *n,
            DailyLimit::Unlimited => true,
        }
    }
}

impl fmt::Display for DailyLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DailyLimit::Capped(n) => write!(f, "{}", n),
            DailyLimit::Unlimited => f.write_str("unlimited"),
        }
    }
}

/// Wire form: a plain count or the keyword `"unlimited"`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum LimitRepr {
    Count(u32),
    Keyword(String),
}

impl TryFrom<LimitRepr> for DailyLimit {
    type Error = GuardError;

    fn try_from(repr: LimitRepr) -> Result<Self> {
        match repr {
            LimitRepr::Count(n) => Ok(DailyLimit::Capped(n)),
            LimitRepr::Keyword(word) if word.eq_ignore_ascii_case("unlimited") => {
                Ok(DailyLimit::Unlimited)
            }
            LimitRepr::Keyword(word) => Err(GuardError::Parse(format!(
                "expected a count or \"unlimited\", got \"{}\"",
                word
            ))),
        }
    }
}

impl From<DailyLimit> for LimitRepr {
    fn from(limit: DailyLimit) -> Self {
        match limit {
            DailyLimit::Capped(n) => LimitRepr::Count(n),
            DailyLimit::Unlimited => LimitRepr::Keyword("unlimited".to_string()),
        }
    }
}

/// Today's sending ceiling after reconciling warm-up with the operator's limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveLimit {
    pub limit: DailyLimit,
    /// True when the warm-up ceiling is below the configured limit
    pub is_warmup_restricted: bool,
    /// 1-indexed; the account's creation day is day 1
    pub warmup_day: u32,
}

impl EffectiveLimit {
    pub fn remaining(&self, sent_today: u32) -> DailyLimit {
        self.limit.remaining(sent_today)
    }

    /// Send run may continue while this holds
    pub fn allows(&self, sent_today: u32) -> bool {
        self.limit.allows(sent_today)
    }
}

/// Warm-up ramp for new sending accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarmupConfig {
    pub steps: StepSchedule<DailyLimit>,
}

impl Default for WarmupConfig {
    fn default() -> Self {
        let steps = vec![
            Step::new(0, DailyLimit::Capped(50)),
            Step::new(5, DailyLimit::Capped(200)),
            Step::new(10, DailyLimit::Capped(500)),
            Step::new(18, DailyLimit::Capped(1000)),
            Step::new(25, DailyLimit::Capped(2000)),
            Step::new(35, DailyLimit::Capped(5000)),
            Step::new(43, DailyLimit::Unlimited),
        ];
        Self {
            steps: StepSchedule::new(steps).expect("built-in warm-up schedule is ordered"),
        }
    }
}

impl WarmupConfig {
    pub fn validate(&self) -> Result<()> {
        self.steps.ensure_monotonic("warmup", |a, b| a <= b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_limit_ordering() {
        assert!(DailyLimit::Capped(50) < DailyLimit::Capped(200));
        assert!(DailyLimit::Capped(u32::MAX) < DailyLimit::Unlimited);
        assert_eq!(
            DailyLimit::Capped(2000).min(DailyLimit::Unlimited),
            DailyLimit::Capped(2000)
        );
    }

    #[test]
    fn test_daily_limit_remaining() {
        assert_eq!(DailyLimit::Capped(50).remaining(20), DailyLimit::Capped(30));
        assert_eq!(DailyLimit::Capped(50).remaining(80), DailyLimit::Capped(0));
        assert_eq!(DailyLimit::Unlimited.remaining(1_000_000), DailyLimit::Unlimited);
    }

    #[test]
    fn test_daily_limit_allows() {
        assert!(DailyLimit::Capped(50).allows(49));
        assert!(!DailyLimit::Capped(50).allows(50));
        assert!(!DailyLimit::Capped(0).allows(0));
        assert!(DailyLimit::Unlimited.allows(u32::MAX));
    }

    #[test]
    fn test_daily_limit_wire_format() {
        assert_eq!(serde_json::to_string(&DailyLimit::Capped(500)).unwrap(), "500");
        assert_eq!(
            serde_json::to_string(&DailyLimit::Unlimited).unwrap(),
            "\"unlimited\""
        );
        let parsed: DailyLimit = serde_json::from_str("\"Unlimited\"").unwrap();
        assert_eq!(parsed, DailyLimit::Unlimited);
        assert!(serde_json::from_str::<DailyLimit>("\"lots\"").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(DailyLimit::Capped(200).to_string(), "200");
        assert_eq!(DailyLimit::Unlimited.to_string(), "unlimited");
    }

    #[test]
    fn test_default_warmup_is_valid() {
        let config = WarmupConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.steps.steps().len(), 7);
    }

    #[test]
    fn test_decreasing_warmup_rejected() {
        let config = WarmupConfig {
            steps: StepSchedule::new(vec![
                Step::new(0, DailyLimit::Capped(100)),
                Step::new(5, DailyLimit::Capped(50)),
            ])
            .unwrap(),
        };
        assert!(config.validate().is_err());
    }
}
