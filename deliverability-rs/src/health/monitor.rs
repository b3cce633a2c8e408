//! Campaign health gate
//!
//! Aggregates bounce and complaint counts across campaigns and decides whether
//! a send run may continue. Pause beats warn beats allow.

use tracing::{debug, warn};

use super::types::{CampaignStat, HealthAction, HealthThresholds, HealthVerdict};

impl HealthThresholds {
    /// Judge the combined sending history of `stats`
    pub fn evaluate(&self, stats: &[CampaignStat]) -> HealthVerdict {
        let totals = CampaignStat::aggregate(stats);

        if totals.total_sent == 0 {
            return HealthVerdict {
                can_send: true,
                action: HealthAction::Allow,
                bounce_rate: 0.0,
                complaint_rate: 0.0,
                warnings: Vec::new(),
                totals,
            };
        }

        let bounce_rate = totals.bounce_rate();
        let complaint_rate = totals.complaint_rate();
        let mut warnings = Vec::new();

        let bounce = grade(bounce_rate, self.warn_bounce_rate, self.pause_bounce_rate);
        match bounce {
            HealthAction::Pause => warnings.push(format!(
                "Bounce rate {:.2}% exceeds the {}% limit; sending paused to protect sender reputation",
                bounce_rate, self.pause_bounce_rate
            )),
            HealthAction::Warn => warnings.push(format!(
                "Bounce rate {:.2}% is above {}%; clean the list before it reaches {}%",
                bounce_rate, self.warn_bounce_rate, self.pause_bounce_rate
            )),
            HealthAction::Allow => {}
        }

        let complaint = grade(
            complaint_rate,
            self.warn_complaint_rate,
            self.pause_complaint_rate,
        );
        match complaint {
            HealthAction::Pause => warnings.push(format!(
                "Complaint rate {:.3}% exceeds the {}% limit; sending paused to protect sender reputation",
                complaint_rate, self.pause_complaint_rate
            )),
            HealthAction::Warn => warnings.push(format!(
                "Complaint rate {:.3}% is above {}%; review content and targeting",
                complaint_rate, self.warn_complaint_rate
            )),
            HealthAction::Allow => {}
        }

        let action = bounce.max(complaint);
        if action == HealthAction::Pause {
            warn!(
                total_sent = totals.total_sent,
                bounce_rate,
                complaint_rate,
                "Campaign health check paused sending"
            );
        } else {
            debug!(
                total_sent = totals.total_sent,
                bounce_rate,
                complaint_rate,
                action = ?action,
                "Campaign health checked"
            );
        }

        HealthVerdict {
            can_send: action != HealthAction::Pause,
            action,
            bounce_rate,
            complaint_rate,
            warnings,
            totals,
        }
    }
}

fn grade(rate: f64, warn_above: f64, pause_above: f64) -> HealthAction {
    if rate > pause_above {
        HealthAction::Pause
    } else if rate > warn_above {
        HealthAction::Warn
    } else {
        HealthAction::Allow
    }
}
