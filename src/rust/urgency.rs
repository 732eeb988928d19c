//! Rule-plus-sentiment urgency estimation.
//!
//! Urgency is never learned from the corpus. A literal critical phrase in the
//! lowercased raw text forces [`UrgencyLevel::High`]; otherwise the sentiment
//! polarity of the text is bucketed with strict `<` comparisons.
//!
//! ```
//! use complaint_triage::{estimate_urgency, UrgencyLevel};
//!
//! assert_eq!(estimate_urgency("No water in hostel, great day otherwise"), UrgencyLevel::High);
//! assert_eq!(estimate_urgency(""), UrgencyLevel::Low);
//! ```

use std::fmt;
use std::str::FromStr;

use aho_corasick::AhoCorasick;
use lazy_static::lazy_static;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::classifier::ClassifierError;
use crate::config::UrgencyConfig;
use crate::sentiment;

/// How quickly a complaint needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
}

impl UrgencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UrgencyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("Unknown urgency level: {}", other)),
        }
    }
}

/// The outcome of an urgency estimate together with what decided it.
#[derive(Debug, Clone, PartialEq)]
pub struct UrgencyAssessment {
    pub level: UrgencyLevel,
    /// The critical phrase that forced `High`, if any.
    pub trigger: Option<String>,
    /// Sentiment polarity; `None` when a critical phrase short-circuited scoring.
    pub polarity: Option<f64>,
}

/// Stateless urgency estimator. Safe to share across threads.
#[derive(Debug, Clone)]
pub struct UrgencyEstimator {
    matcher: AhoCorasick,
    phrases: Vec<String>,
    high_below: f64,
    medium_below: f64,
}

impl UrgencyEstimator {
    /// Builds an estimator from a configuration.
    ///
    /// Fails with `ValidationError` if a critical phrase is blank or the
    /// thresholds are out of order.
    pub fn new(config: &UrgencyConfig) -> Result<Self, ClassifierError> {
        if let Some(pos) = config.critical_phrases.iter().position(|p| p.trim().is_empty()) {
            return Err(ClassifierError::ValidationError(format!(
                "Critical phrase {} cannot be empty",
                pos + 1
            )));
        }
        if !(config.high_below <= config.medium_below) {
            return Err(ClassifierError::ValidationError(format!(
                "High threshold ({}) must not exceed medium threshold ({})",
                config.high_below, config.medium_below
            )));
        }

        let phrases: Vec<String> = config
            .critical_phrases
            .iter()
            .map(|p| p.to_lowercase())
            .collect();
        let matcher = AhoCorasick::new(&phrases).map_err(|e| {
            ClassifierError::ValidationError(format!("Failed to build critical phrase matcher: {}", e))
        })?;

        Ok(Self {
            matcher,
            phrases,
            high_below: config.high_below,
            medium_below: config.medium_below,
        })
    }

    /// Maps a polarity score to an urgency level using the strict thresholds.
    pub fn classify_polarity(&self, polarity: f64) -> UrgencyLevel {
        if polarity < self.high_below {
            UrgencyLevel::High
        } else if polarity < self.medium_below {
            UrgencyLevel::Medium
        } else {
            UrgencyLevel::Low
        }
    }

    /// Estimates urgency and reports what decided it.
    pub fn assess(&self, raw_text: &str) -> UrgencyAssessment {
        let lowered = raw_text.to_lowercase();

        if let Some(found) = self.matcher.find(&lowered) {
            let trigger = self.phrases[found.pattern().as_usize()].clone();
            debug!("Critical phrase '{}' forces high urgency", trigger);
            return UrgencyAssessment {
                level: UrgencyLevel::High,
                trigger: Some(trigger),
                polarity: None,
            };
        }

        let polarity = sentiment::polarity(&lowered);
        let level = self.classify_polarity(polarity);
        debug!("Polarity {:.3} -> {} urgency", polarity, level);
        UrgencyAssessment {
            level,
            trigger: None,
            polarity: Some(polarity),
        }
    }

    pub fn estimate(&self, raw_text: &str) -> UrgencyLevel {
        self.assess(raw_text).level
    }
}

impl Default for UrgencyEstimator {
    fn default() -> Self {
        DEFAULT_ESTIMATOR.clone()
    }
}

lazy_static! {
    static ref DEFAULT_ESTIMATOR: UrgencyEstimator = UrgencyEstimator::new(&UrgencyConfig::default())
        .expect("Default urgency configuration must be valid");
}

/// Estimates urgency of raw (un-normalized) complaint text with the default
/// critical phrases and thresholds.
pub fn estimate_urgency(raw_text: &str) -> UrgencyLevel {
    DEFAULT_ESTIMATOR.estimate(raw_text)
}
