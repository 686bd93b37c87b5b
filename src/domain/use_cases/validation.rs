use chrono::{DateTime, TimeDelta, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    entities::contact::SubmissionRecord,
    errors::ErrorKind,
    settings::{AppConfig, MAX_DURATION_MS},
};

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u', 'y'];

pub type ValidationResult = Result<(), ErrorKind>;

/// Accepted delay between rendering a form and submitting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingWindow {
    pub min: TimeDelta,
    pub max: TimeDelta,
}

impl Default for TimingWindow {
    fn default() -> Self {
        TimingWindow {
            min: TimeDelta::milliseconds(3000),
            max: TimeDelta::hours(1),
        }
    }
}

impl TimingWindow {
    /// Returns the elapsed time, or the reason it is out of bounds.
    /// The minimum is inclusive.
    pub fn check(&self, rendered_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<TimeDelta, ErrorKind> {
        let elapsed = now - rendered_at;
        if elapsed < self.min {
            return Err(ErrorKind::TooFast);
        }
        if elapsed > self.max {
            return Err(ErrorKind::SessionExpired);
        }
        Ok(elapsed)
    }
}

/// Tunables for the content checks.
///
/// The vowel ratio bounds are empirical and only meaningful for Latin-script
/// text; letters outside `a-z` are ignored entirely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationRules {
    pub timing: TimingWindow,
    pub min_words: usize,
    pub min_vowel_ratio: f64,
    pub max_vowel_ratio: f64,
}

impl Default for ValidationRules {
    fn default() -> Self {
        ValidationRules {
            timing: TimingWindow::default(),
            min_words: 3,
            min_vowel_ratio: 0.15,
            max_vowel_ratio: 0.7,
        }
    }
}

impl From<&AppConfig> for ValidationRules {
    fn from(config: &AppConfig) -> Self {
        ValidationRules {
            timing: TimingWindow {
                min: TimeDelta::milliseconds(config.min_submission_time_ms.min(MAX_DURATION_MS) as i64),
                max: TimeDelta::milliseconds(config.max_submission_time_ms.min(MAX_DURATION_MS) as i64),
            },
            min_words: config.min_words,
            min_vowel_ratio: config.min_vowel_ratio,
            max_vowel_ratio: config.max_vowel_ratio,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SubmissionValidator {
    rules: ValidationRules,
}

impl SubmissionValidator {
    pub fn new(rules: ValidationRules) -> Self {
        SubmissionValidator { rules }
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// Runs every check in order and reports the first failure.
    pub fn validate(&self, submission: &SubmissionRecord, now: DateTime<Utc>) -> ValidationResult {
        let required = [
            &submission.name,
            &submission.email,
            &submission.subject,
            &submission.message,
        ];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(ErrorKind::MissingFields);
        }

        if submission
            .honeypot
            .as_deref()
            .is_some_and(|value| !value.trim().is_empty())
        {
            return Err(ErrorKind::BotHoneypot);
        }

        if let Some(rendered_at) = submission.form_rendered_at {
            self.rules.timing.check(rendered_at, now)?;
        }

        if !is_valid_email(&submission.email) {
            return Err(ErrorKind::InvalidEmail);
        }

        if word_count(&submission.message) < self.rules.min_words {
            return Err(ErrorKind::MessageTooShort);
        }

        if let Some(ratio) = vowel_ratio(&submission.message) {
            if ratio < self.rules.min_vowel_ratio || ratio > self.rules.max_vowel_ratio {
                return Err(ErrorKind::ContentSuspicious);
            }
        }

        Ok(())
    }
}

/// Structural `local@domain.tld` check, not RFC 5322.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

pub fn word_count(message: &str) -> usize {
    message.split_whitespace().count()
}

/// Share of vowels among the ASCII letters of `message`, `None` without letters.
pub fn vowel_ratio(message: &str) -> Option<f64> {
    let (letters, vowels) = message
        .chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(char::is_ascii_lowercase)
        .fold((0usize, 0usize), |(letters, vowels), c| {
            (letters + 1, vowels + usize::from(VOWELS.contains(&c)))
        });

    if letters == 0 {
        None
    } else {
        Some(vowels as f64 / letters as f64)
    }
}
