//! Content spam scoring
//!
//! Classifies an outbound email's subject and HTML body before it is queued.
//! A [`SpamLevel::Blocked`] verdict means the email must not be sent.

pub mod scorer;
pub mod types;

pub use scorer::SpamScorer;
pub use types::*;

use once_cell::sync::Lazy;

static DEFAULT_SCORER: Lazy<SpamScorer> = Lazy::new(SpamScorer::default);

/// Score content against the built-in rules
pub fn analyze_spam_score(subject: &str, html: &str) -> SpamAnalysis {
    DEFAULT_SCORER.score(subject, html)
}
