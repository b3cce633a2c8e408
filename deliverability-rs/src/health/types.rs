use serde::{Deserialize, Serialize};

use crate::error::{GuardError, Result};

/// Delivery statistics for one campaign
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignStat {
    #[serde(alias = "sent", alias = "totalSent")]
    pub total_sent: u64,
    #[serde(alias = "bounced", alias = "totalBounced")]
    pub total_bounced: u64,
    #[serde(alias = "complaints", alias = "totalComplaints")]
    pub total_complaints: u64,
}

impl CampaignStat {
    pub fn new(total_sent: u64, total_bounced: u64, total_complaints: u64) -> Self {
        Self {
            total_sent,
            total_bounced,
            total_complaints,
        }
    }

    /// Sum a set of campaigns into one sending history
    pub fn aggregate<'a, I>(stats: I) -> Self
    where
        I: IntoIterator<Item = &'a CampaignStat>,
    {
        stats.into_iter().fold(Self::default(), |acc, s| Self {
            total_sent: acc.total_sent.saturating_add(s.total_sent),
            total_bounced: acc.total_bounced.saturating_add(s.total_bounced),
            total_complaints: acc.total_complaints.saturating_add(s.total_complaints),
        })
    }

    /// Bounces as a percentage of sent; 0 when nothing was sent
    pub fn bounce_rate(&self) -> f64 {
        percent(self.total_bounced, self.total_sent)
    }

    /// Complaints as a percentage of sent; 0 when nothing was sent
    pub fn complaint_rate(&self) -> f64 {
        percent(self.total_complaints, self.total_sent)
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

/// What the send loop should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthAction {
    Allow,
    Warn,
    Pause,
}

/// Result of a campaign health check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthVerdict {
    pub can_send: bool,
    pub action: HealthAction,
    /// Percent
    pub bounce_rate: f64,
    /// Percent
    pub complaint_rate: f64,
    pub warnings: Vec<String>,
    /// Aggregated input the rates were computed from
    pub totals: CampaignStat,
}

/// Rate thresholds, in percent. A rate strictly above a threshold trips it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthThresholds {
    pub warn_bounce_rate: f64,
    pub pause_bounce_rate: f64,
    pub warn_complaint_rate: f64,
    pub pause_complaint_rate: f64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            warn_bounce_rate: 0.5,
            pause_bounce_rate: 2.0,
            warn_complaint_rate: 0.05,
            pause_complaint_rate: 0.1,
        }
    }
}

impl HealthThresholds {
    pub fn validate(&self) -> Result<()> {
        let pairs = [
            ("bounce", self.warn_bounce_rate, self.pause_bounce_rate),
            ("complaint", self.warn_complaint_rate, self.pause_complaint_rate),
        ];
        for (metric, warn, pause) in pairs {
            if !warn.is_finite() || !pause.is_finite() || warn < 0.0 || pause < 0.0 {
                return Err(GuardError::Config(format!(
                    "{} thresholds must be non-negative numbers",
                    metric
                )));
            }
            if warn > pause {
                return Err(GuardError::Config(format!(
                    "warn {} rate ({}) is above pause rate ({})",
                    metric, warn, pause
                )));
            }
        }
        Ok(())
    }
}
