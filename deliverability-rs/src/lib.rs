//! deliverability-rs: sending reputation and deliverability guard
//!
//! The policy engine an outbound marketing pipeline consults before and while
//! it sends. It decides whether an email is safe to send, how much and how
//! fast an account may send today, when a campaign must be paused, and
//! whether a recipient should keep receiving mail at all.
//!
//! Every decision is a pure, synchronous function of its inputs and the
//! current time. The engine performs no I/O and keeps no state between calls;
//! time-dependent operations come in two flavours, one reading the clock and
//! an `*_at` variant taking `now` explicitly.
//!
//! # Example
//!
//! ```no_run
//! use chrono::{Duration, Utc};
//! use deliverability_rs::health::CampaignStat;
//! use deliverability_rs::{DeliverabilityGuard, GuardConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let guard = DeliverabilityGuard::new(GuardConfig::default())?;
//! let now = Utc::now();
//! let created = now - Duration::days(12);
//!
//! let decision = guard.preflight("October roadmap", "<p>Hello</p>", 2000, created, 0, now);
//! if decision.may_send() {
//!     let pace = guard.sending_pace(created, now);
//!     println!("send in batches of {}", pace.batch_size);
//! }
//!
//! let health = guard.campaign_health(&[CampaignStat::new(1000, 4, 0)]);
//! assert!(health.can_send);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`spam`]: content spam scoring
//! - [`warmup`]: warm-up ceiling and effective daily limit
//! - [`health`]: campaign bounce/complaint gate
//! - [`engagement`]: contact recency segmentation for list hygiene
//! - [`pacing`]: per-email delay and batch size
//! - [`guard`]: all of the above bound to one configuration
//! - [`config`]: configuration loading and validation
//! - [`error`]: error types

pub mod config;
pub mod engagement;
pub mod error;
pub mod guard;
pub mod health;
pub mod pacing;
pub mod schedule;
pub mod spam;
pub mod warmup;

// Re-export commonly used types
pub use config::GuardConfig;
pub use engagement::{evaluate_contact_engagement, evaluate_contact_engagement_at};
pub use error::{GuardError, Result};
pub use guard::{DeliverabilityGuard, PreflightDecision, RefusalReason};
pub use health::check_campaign_health;
pub use pacing::{send_delay, sending_pace, sending_pace_at};
pub use spam::analyze_spam_score;
pub use warmup::{
    effective_daily_limit, effective_daily_limit_at, warmup_daily_limit, warmup_daily_limit_at,
};
