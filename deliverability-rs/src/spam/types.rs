//! Content scoring types and tunable rule data

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{GuardError, Result};

/// Content scoring result for one email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpamAnalysis {
    /// Sum of all triggered penalties
    pub score: f64,
    /// Severity band derived from `score`
    pub level: SpamLevel,
    /// One message per triggered detector, in detection order
    pub warnings: Vec<String>,
    /// Dictionary phrases found in the subject or body
    pub trigger_words: BTreeSet<String>,
}

impl SpamAnalysis {
    /// Whether the caller may queue this email at all
    pub fn is_sendable(&self) -> bool {
        !self.level.should_block()
    }
}

/// Severity band of a content score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpamLevel {
    Safe,
    Caution,
    Risky,
    Blocked,
}

impl SpamLevel {
    pub const CAUTION_THRESHOLD: f64 = 3.0;
    pub const RISKY_THRESHOLD: f64 = 5.0;
    pub const BLOCKED_THRESHOLD: f64 = 8.0;

    /// Map a score onto its band: `<3` safe, `[3,5)` caution, `[5,8)` risky, `>=8` blocked
    pub fn from_score(score: f64) -> Self {
        if score >= Self::BLOCKED_THRESHOLD {
            SpamLevel::Blocked
        } else if score >= Self::RISKY_THRESHOLD {
            SpamLevel::Risky
        } else if score >= Self::CAUTION_THRESHOLD {
            SpamLevel::Caution
        } else {
            SpamLevel::Safe
        }
    }

    /// Blocked content must never be queued
    pub fn should_block(&self) -> bool {
        matches!(self, SpamLevel::Blocked)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpamLevel::Safe => "safe",
            SpamLevel::Caution => "caution",
            SpamLevel::Risky => "risky",
            SpamLevel::Blocked => "blocked",
        }
    }
}

/// Penalty added by each detector when it fires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpamWeights {
    pub empty_subject: f64,
    pub all_caps_subject: f64,
    pub excessive_exclamation: f64,
    pub reply_forward_prefix: f64,
    pub long_subject: f64,
    pub url_shortener: f64,
    pub script_tag: f64,
    pub form_tag: f64,
    pub hidden_text: f64,
    /// Added once per distinct trigger phrase found
    pub trigger_word: f64,
    pub missing_alt_text: f64,
}

impl Default for SpamWeights {
    fn default() -> Self {
        Self {
            empty_subject: 3.0,
            all_caps_subject: 2.0,
            excessive_exclamation: 1.5,
            reply_forward_prefix: 1.5,
            long_subject: 1.0,
            url_shortener: 2.0,
            script_tag: 3.0,
            form_tag: 2.0,
            hidden_text: 2.5,
            trigger_word: 1.0,
            missing_alt_text: 1.0,
        }
    }
}

impl SpamWeights {
    fn all(&self) -> [(&'static str, f64); 11] {
        [
            ("empty_subject", self.empty_subject),
            ("all_caps_subject", self.all_caps_subject),
            ("excessive_exclamation", self.excessive_exclamation),
            ("reply_forward_prefix", self.reply_forward_prefix),
            ("long_subject", self.long_subject),
            ("url_shortener", self.url_shortener),
            ("script_tag", self.script_tag),
            ("form_tag", self.form_tag),
            ("hidden_text", self.hidden_text),
            ("trigger_word", self.trigger_word),
            ("missing_alt_text", self.missing_alt_text),
        ]
    }
}

/// Detector thresholds and dictionaries for content scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentRules {
    /// Phrases statistically associated with spam filtering
    pub trigger_words: Vec<String>,
    /// Link shortener hosts that hide the real destination
    pub shortener_domains: Vec<String>,
    /// Subjects longer than this (in characters) are penalized
    pub max_subject_length: usize,
    /// Minimum trimmed subject length before the ALL CAPS check applies
    pub caps_min_length: usize,
    /// Number of `!` in the subject that counts as excessive
    pub exclamation_threshold: usize,
    pub weights: SpamWeights,
}

impl Default for ContentRules {
    fn default() -> Self {
        Self {
            trigger_words: DEFAULT_TRIGGER_WORDS.iter().map(|w| w.to_string()).collect(),
            shortener_domains: DEFAULT_SHORTENERS.iter().map(|d| d.to_string()).collect(),
            max_subject_length: 78,
            caps_min_length: 5,
            exclamation_threshold: 2,
            weights: SpamWeights::default(),
        }
    }
}

impl ContentRules {
    pub fn validate(&self) -> Result<()> {
        if let Some((name, weight)) = self
            .weights
            .all()
            .into_iter()
            .find(|(_, w)| !w.is_finite() || *w < 0.0)
        {
            return Err(GuardError::InvalidRule(format!(
                "weight '{}' must be a non-negative number, got {}",
                name, weight
            )));
        }
        if self.exclamation_threshold == 0 {
            return Err(GuardError::InvalidRule(
                "exclamation_threshold must be at least 1".to_string(),
            ));
        }
        if self.trigger_words.iter().any(|w| w.trim().is_empty()) {
            return Err(GuardError::InvalidRule(
                "trigger_words must not contain blank entries".to_string(),
            ));
        }
        if self.shortener_domains.iter().any(|d| d.trim().is_empty()) {
            return Err(GuardError::InvalidRule(
                "shortener_domains must not contain blank entries".to_string(),
            ));
        }
        Ok(())
    }
}

const DEFAULT_TRIGGER_WORDS: &[&str] = &[
    "free",
    "click here",
    "buy now",
    "act now",
    "limited time",
    "guarantee",
    "guaranteed",
    "earn money",
    "make money",
    "risk free",
    "winner",
    "congratulations",
    "cash",
    "cash bonus",
    "100% free",
    "no obligation",
    "order now",
    "urgent",
    "double your",
    "lowest price",
    "special promotion",
    "extra income",
    "million dollars",
    "work from home",
    "once in a lifetime",
];

const DEFAULT_SHORTENERS: &[&str] = &[
    "bit.ly",
    "tinyurl.com",
    "goo.gl",
    "t.co",
    "ow.ly",
    "is.gd",
    "buff.ly",
    "rebrand.ly",
    "cutt.ly",
    "shorturl.at",
];
