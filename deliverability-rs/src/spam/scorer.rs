//! Content scoring engine
//!
//! Runs a fixed set of independent detectors over an outbound email's subject
//! and HTML body. Every detector that fires adds its penalty and a warning;
//! nothing short-circuits, so callers always see the full list of problems.

use once_cell::sync::Lazy;
use regex::{Regex, RegexSet};
use std::collections::BTreeSet;
use tracing::{debug, warn};

use super::types::*;
use crate::error::Result;

static REPLY_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*(?:re|fwd?)\s*:").unwrap());
static SCRIPT_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<script\b").unwrap());
static FORM_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<form\b").unwrap());
static ZERO_FONT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)font-size\s*:\s*0+(?:\.0+)?(?:px|pt|em|rem|%)?(?:[^0-9a-z.%]|$)").unwrap()
});
static IMG_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<img\b[^>]*>").unwrap());
static ALT_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\salt(?:\s*=|[\s/>]|$)").unwrap());
static HIDDEN_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)<!--.*?-->|<style\b[^>]*>.*?</style\s*>|<script\b[^>]*>.*?</script\s*>|<head\b[^>]*>.*?</head\s*>|<title\b[^>]*>.*?</title\s*>",
    )
    .unwrap()
});
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)</?[A-Za-z][^>]*>|<[!?][^>]*>").unwrap());
static HTML_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)&(?:nbsp|amp|lt|gt|quot|apos|#160|#x0*a0|#0*38|#0*39);").unwrap());

/// Content scorer with its rule data compiled once
#[derive(Debug, Clone)]
pub struct SpamScorer {
    rules: ContentRules,
    trigger_set: RegexSet,
    shortener: Option<Regex>,
}

impl SpamScorer {
    /// Compile a scorer from rule data
    pub fn new(rules: ContentRules) -> Result<Self> {
        rules.validate()?;

        let trigger_set = RegexSet::new(rules.trigger_words.iter().map(|w| phrase_pattern(w)))?;

        let shortener = if rules.shortener_domains.is_empty() {
            None
        } else {
            let hosts = rules
                .shortener_domains
                .iter()
                .map(|d| regex::escape(d.trim()))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!(
                r#"(?i)href\s*=\s*["']?\s*(?:https?:)?(?://)?(?:www\.)?(?P<host>{})(?:[/?#:"'\s>]|$)"#,
                hosts
            ))?)
        };

        Ok(Self {
            rules,
            trigger_set,
            shortener,
        })
    }

    /// Get current rules
    pub fn rules(&self) -> &ContentRules {
        &self.rules
    }

    /// Score one email's subject and HTML body
    pub fn score(&self, subject: &str, html: &str) -> SpamAnalysis {
        let mut findings = Findings::default();
        let weights = &self.rules.weights;

        self.check_subject(subject, &mut findings);

        if let Some(host) = self
            .shortener
            .as_ref()
            .and_then(|re| re.captures(html))
            .and_then(|caps| caps.name("host"))
        {
            findings.hit(
                "url_shortener",
                weights.url_shortener,
                format!("Body links through a URL shortener ({})", host.as_str()),
            );
        }

        if SCRIPT_TAG.is_match(html) {
            findings.hit(
                "script_tag",
                weights.script_tag,
                "Body contains JavaScript (<script> tag)".to_string(),
            );
        }

        if FORM_TAG.is_match(html) {
            findings.hit(
                "form_tag",
                weights.form_tag,
                "Body contains an embedded form".to_string(),
            );
        }

        if ZERO_FONT.is_match(html) {
            findings.hit(
                "hidden_text",
                weights.hidden_text,
                "Zero-size font detected (hidden text)".to_string(),
            );
        }

        let trigger_words = self.find_trigger_words(subject, html);
        if !trigger_words.is_empty() {
            let listed = trigger_words.iter().cloned().collect::<Vec<_>>().join(", ");
            findings.hit(
                "trigger_word",
                weights.trigger_word * trigger_words.len() as f64,
                format!(
                    "Contains {} spam trigger word(s): {}",
                    trigger_words.len(),
                    listed
                ),
            );
        }

        let missing_alt = IMG_TAG
            .find_iter(html)
            .filter(|img| !ALT_ATTR.is_match(img.as_str()))
            .count();
        if missing_alt > 0 {
            findings.hit(
                "missing_alt_text",
                weights.missing_alt_text,
                format!("{} image(s) missing alt text", missing_alt),
            );
        }

        let level = SpamLevel::from_score(findings.score);
        if level.should_block() {
            warn!(
                score = findings.score,
                detectors = findings.warnings.len(),
                "Content blocked by spam scorer"
            );
        }

        SpamAnalysis {
            score: findings.score,
            level,
            warnings: findings.warnings,
            trigger_words,
        }
    }

    fn check_subject(&self, subject: &str, findings: &mut Findings) {
        let weights = &self.rules.weights;
        let trimmed = subject.trim();

        if trimmed.is_empty() {
            findings.hit(
                "empty_subject",
                weights.empty_subject,
                "Empty subject line".to_string(),
            );
            return;
        }

        let length = trimmed.chars().count();
        let has_letters = trimmed.chars().any(char::is_alphabetic);
        if has_letters
            && length >= self.rules.caps_min_length
            && !trimmed.chars().any(char::is_lowercase)
        {
            findings.hit(
                "all_caps_subject",
                weights.all_caps_subject,
                "Subject is written in ALL CAPS".to_string(),
            );
        }

        let exclamations = trimmed.matches('!').count();
        if exclamations >= self.rules.exclamation_threshold {
            findings.hit(
                "excessive_exclamation",
                weights.excessive_exclamation,
                format!("Subject contains {} exclamation marks", exclamations),
            );
        }

        if REPLY_PREFIX.is_match(trimmed) {
            findings.hit(
                "reply_forward_prefix",
                weights.reply_forward_prefix,
                "Subject starts with RE:/FW: on a message that is not a reply".to_string(),
            );
        }

        if length > self.rules.max_subject_length {
            findings.hit(
                "long_subject",
                weights.long_subject,
                format!(
                    "Subject is too long ({} characters, max {})",
                    length, self.rules.max_subject_length
                ),
            );
        }
    }

    /// Dictionary phrases present in the subject or the visible body text
    fn find_trigger_words(&self, subject: &str, html: &str) -> BTreeSet<String> {
        let text = format!("{}\n{}", subject, visible_text(html));
        self.trigger_set
            .matches(&text)
            .into_iter()
            .map(|idx| self.rules.trigger_words[idx].trim().to_uppercase())
            .collect()
    }
}

impl Default for SpamScorer {
    fn default() -> Self {
        Self::new(ContentRules::default()).expect("built-in content rules compile")
    }
}

#[derive(Default)]
struct Findings {
    score: f64,
    warnings: Vec<String>,
}

impl Findings {
    fn hit(&mut self, detector: &str, penalty: f64, warning: String) {
        debug!(detector, penalty, "Spam detector triggered");
        self.score += penalty;
        self.warnings.push(warning);
    }
}

/// Text a reader actually sees: non-rendered blocks and tags removed, common
/// entities decoded.
fn visible_text(html: &str) -> String {
    let without_blocks = HIDDEN_BLOCK.replace_all(html, " ");
    let without_tags = HTML_TAG.replace_all(&without_blocks, " ");
    HTML_ENTITY
        .replace_all(&without_tags, |caps: &regex::Captures| {
            match caps[0].to_ascii_lowercase().as_str() {
                "&amp;" | "&#38;" => "&",
                "&lt;" => "<",
                "&gt;" => ">",
                "&quot;" => "\"",
                "&apos;" | "&#39;" => "'",
                _ => " ",
            }
        })
        .into_owned()
}

/// Case-insensitive pattern for a phrase, tolerant of any whitespace run
/// between words and anchored on word boundaries where the phrase has them.
fn phrase_pattern(phrase: &str) -> String {
    let phrase = phrase.trim();
    let body = phrase
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    let lead = if phrase.starts_with(|c: char| c.is_alphanumeric()) {
        r"\b"
    } else {
        ""
    };
    let tail = if phrase.ends_with(|c: char| c.is_alphanumeric()) {
        r"\b"
    } else {
        ""
    };
    format!("(?i){}{}{}", lead, body, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> SpamScorer {
        SpamScorer::default()
    }

    fn has_warning(analysis: &SpamAnalysis, needle: &str) -> bool {
        analysis.warnings.iter().any(|w| w.contains(needle))
    }

    #[test]
    fn test_clean_email_is_safe() {
        let analysis = scorer().score(
            "Your October product update",
            r#"<p>Hello there,</p><p>Here is what shipped this month.</p><img src="a.png" alt="chart">"#,
        );
        assert_eq!(analysis.score, 0.0);
        assert_eq!(analysis.level, SpamLevel::Safe);
        assert!(analysis.warnings.is_empty());
        assert!(analysis.trigger_words.is_empty());
        assert!(analysis.is_sendable());
    }

    #[test]
    fn test_empty_subject() {
        let analysis = scorer().score("", "<p>body</p>");
        assert!(analysis.score >= 3.0);
        assert_eq!(analysis.level, SpamLevel::Caution);
        assert!(has_warning(&analysis, "Empty subject"));
    }

    #[test]
    fn test_whitespace_subject_is_empty() {
        let analysis = scorer().score("   \t ", "<p>body</p>");
        assert!(has_warning(&analysis, "Empty subject"));
        assert_eq!(analysis.warnings.len(), 1);
    }

    #[test]
    fn test_all_caps_subject() {
        let analysis = scorer().score("MONTHLY NEWSLETTER", "<p>hi</p>");
        assert!(has_warning(&analysis, "ALL CAPS"));
        assert_eq!(analysis.score, 2.0);
    }

    #[test]
    fn test_short_caps_subject_not_flagged() {
        let analysis = scorer().score("FAQ", "<p>hi</p>");
        assert!(!has_warning(&analysis, "ALL CAPS"));
    }

    #[test]
    fn test_digits_only_subject_not_caps() {
        let analysis = scorer().score("2026 / 10 / 19", "<p>hi</p>");
        assert!(!has_warning(&analysis, "ALL CAPS"));
    }

    #[test]
    fn test_exclamation_marks() {
        let one = scorer().score("Big news!", "<p>hi</p>");
        assert!(!has_warning(&one, "exclamation"));

        let two = scorer().score("Big news! Really!", "<p>hi</p>");
        assert!(has_warning(&two, "exclamation"));

        let consecutive = scorer().score("Big news!!", "<p>hi</p>");
        assert!(has_warning(&consecutive, "exclamation"));
    }

    #[test]
    fn test_reply_forward_prefix() {
        for subject in ["RE: your order", "Fw: details", "FWD: invoice", "re:hello"] {
            let analysis = scorer().score(subject, "<p>hi</p>");
            assert!(has_warning(&analysis, "RE:/FW:"), "missed {}", subject);
        }
        let analysis = scorer().score("Reading list for October", "<p>hi</p>");
        assert!(!has_warning(&analysis, "RE:/FW:"));
    }

    #[test]
    fn test_long_subject() {
        let subject = "a".repeat(79);
        let analysis = scorer().score(&subject, "<p>hi</p>");
        assert!(has_warning(&analysis, "too long"));

        let subject = "a".repeat(78);
        let analysis = scorer().score(&subject, "<p>hi</p>");
        assert!(!has_warning(&analysis, "too long"));
    }

    #[test]
    fn test_url_shortener() {
        let analysis = scorer().score(
            "Read more",
            r#"<a href="https://bit.ly/3abc">link</a>"#,
        );
        assert!(has_warning(&analysis, "URL shortener"));
        assert!(has_warning(&analysis, "bit.ly"));

        let analysis = scorer().score(
            "Read more",
            r#"<a href="https://example.com/t.co-style">link</a>"#,
        );
        assert!(!has_warning(&analysis, "URL shortener"));
    }

    #[test]
    fn test_shortener_needs_href() {
        let analysis = scorer().score("Read more", "<p>We never use bit.ly links</p>");
        assert!(!has_warning(&analysis, "URL shortener"));
    }

    #[test]
    fn test_script_and_form() {
        let analysis = scorer().score(
            "Survey",
            r#"<SCRIPT>alert(1)</SCRIPT><form action="/x"><input></form>"#,
        );
        assert!(has_warning(&analysis, "JavaScript"));
        assert!(has_warning(&analysis, "form"));
        assert_eq!(analysis.score, 5.0);
        assert_eq!(analysis.level, SpamLevel::Risky);
    }

    #[test]
    fn test_hidden_text() {
        for style in ["font-size:0", "font-size: 0px;", "FONT-SIZE : 0.0em", "font-size:0%"] {
            let html = format!(r#"<p style="{}">hidden</p>"#, style);
            let analysis = scorer().score("Hello", &html);
            assert!(has_warning(&analysis, "Zero-size font"), "missed {}", style);
        }
        let analysis = scorer().score("Hello", r#"<p style="font-size:0.8em">small</p>"#);
        assert!(!has_warning(&analysis, "Zero-size font"));
        let analysis = scorer().score("Hello", r#"<p style="font-size: 10px">text</p>"#);
        assert!(!has_warning(&analysis, "Zero-size font"));
    }

    #[test]
    fn test_trigger_words_counted() {
        let analysis = scorer().score(
            "A free gift",
            "<p>Click   here to claim your cash</p>",
        );
        assert!(analysis.trigger_words.contains("FREE"));
        assert!(analysis.trigger_words.contains("CLICK HERE"));
        assert!(analysis.trigger_words.contains("CASH"));
        assert_eq!(analysis.trigger_words.len(), 3);
        assert_eq!(analysis.score, 3.0);
        assert!(has_warning(&analysis, "3 spam trigger word(s)"));
    }

    #[test]
    fn test_trigger_words_respect_word_boundaries() {
        let analysis = scorer().score("Freedom of cashmere", "<p>cashew</p>");
        assert!(analysis.trigger_words.is_empty());
    }

    #[test]
    fn test_trigger_words_ignore_markup() {
        let analysis = scorer().score("Hello", r#"<div class="free cash">Hi</div>"#);
        assert!(analysis.trigger_words.is_empty());
    }

    #[test]
    fn test_trigger_words_skip_style_and_comments() {
        let analysis = scorer().score(
            "October update",
            "<style>.cash-banner{color:red} .free-tier{}</style>\
             <!-- act now --><p>Hello there</p>",
        );
        assert!(analysis.trigger_words.is_empty());
        assert_eq!(analysis.level, SpamLevel::Safe);
    }

    #[test]
    fn test_trigger_words_skip_head() {
        let analysis = scorer().score(
            "Hello",
            "<html><head><title>Free cash</title></head><body><p>Hi</p></body></html>",
        );
        assert!(analysis.trigger_words.is_empty());
    }

    #[test]
    fn test_literal_angle_bracket_keeps_text() {
        let analysis = scorer().score("October update", "<p>Save <50% today. FREE CASH, click here</p>");
        assert!(analysis.trigger_words.contains("FREE"));
        assert!(analysis.trigger_words.contains("CASH"));
        assert!(analysis.trigger_words.contains("CLICK HERE"));
    }

    #[test]
    fn test_trigger_words_through_entities() {
        let analysis = scorer().score("Hi", "<p>Click&nbsp;here to claim</p>");
        assert!(analysis.trigger_words.contains("CLICK HERE"));

        let analysis = scorer().score("Hi", "<p>Click&#160;HERE</p>");
        assert!(analysis.trigger_words.contains("CLICK HERE"));
    }

    #[test]
    fn test_visible_text() {
        assert_eq!(
            visible_text("<!DOCTYPE html><p>Fish &amp; chips</p>").trim(),
            "Fish & chips"
        );
        assert_eq!(visible_text("a <3 b").trim(), "a <3 b");
    }

    #[test]
    fn test_boolean_alt_counts_as_alt() {
        let analysis = scorer().score("Gallery", r#"<img src="a.png" alt><img src=b.png alt/>"#);
        assert!(!has_warning(&analysis, "missing alt text"));
        assert_eq!(analysis.score, 0.0);
    }

    #[test]
    fn test_missing_alt_text() {
        let analysis = scorer().score(
            "Gallery",
            r#"<img src="a.png"><img src="b.png" alt="b"><IMG SRC="c.png" />"#,
        );
        assert!(has_warning(&analysis, "2 image(s) missing alt text"));
        assert_eq!(analysis.score, 1.0);
    }

    #[test]
    fn test_data_alt_is_not_alt() {
        let analysis = scorer().score("Gallery", r#"<img src="a.png" data-alt="x">"#);
        assert!(has_warning(&analysis, "missing alt text"));
    }

    #[test]
    fn test_blocked_scenario() {
        let analysis = scorer().score(
            "FREE!!! CLICK HERE NOW!!!",
            r#"<script>x</script><p style="font-size:0">hidden</p><p>Buy now</p>"#,
        );
        assert_eq!(analysis.level, SpamLevel::Blocked);
        assert!(analysis.score >= 8.0);
        assert!(!analysis.is_sendable());
        assert!(has_warning(&analysis, "ALL CAPS"));
        assert!(has_warning(&analysis, "exclamation"));
        assert!(has_warning(&analysis, "JavaScript"));
        assert!(has_warning(&analysis, "Zero-size font"));
    }

    #[test]
    fn test_adding_signal_never_lowers_score() {
        let base_subject = "Quarterly update";
        let base_html = "<p>Hello</p>";
        let base = scorer().score(base_subject, base_html).score;

        let variants = [
            ("QUARTERLY UPDATE", base_html.to_string()),
            ("Quarterly update!!", base_html.to_string()),
            ("RE: Quarterly update", base_html.to_string()),
            (base_subject, format!("{}<script></script>", base_html)),
            (base_subject, format!("{}<form></form>", base_html)),
            (base_subject, format!("{}<img src=x>", base_html)),
            (base_subject, format!(r#"{}<a href="http://tinyurl.com/x">x</a>"#, base_html)),
            (base_subject, format!("{}<p>act now</p>", base_html)),
        ];
        for (subject, html) in variants {
            let score = scorer().score(subject, &html).score;
            assert!(score > base, "{} / {} scored {}", subject, html, score);
        }
    }

    #[test]
    fn test_custom_rules() {
        let rules = ContentRules {
            trigger_words: vec!["webinar".to_string()],
            shortener_domains: vec![],
            ..ContentRules::default()
        };
        let scorer = SpamScorer::new(rules).unwrap();
        let analysis = scorer.score("Join our webinar", r#"<a href="https://bit.ly/x">x</a>"#);
        assert!(analysis.trigger_words.contains("WEBINAR"));
        assert!(!has_warning(&analysis, "URL shortener"));
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let mut rules = ContentRules::default();
        rules.weights.trigger_word = f64::NAN;
        assert!(SpamScorer::new(rules).is_err());
    }

    #[test]
    fn test_phrase_pattern() {
        assert_eq!(phrase_pattern("click here"), r"(?i)\bclick\s+here\b");
        assert_eq!(phrase_pattern("100% free"), r"(?i)\b100%\s+free\b");
    }
}
