/// Phrases that force `High` urgency regardless of sentiment.
pub const DEFAULT_CRITICAL_PHRASES: &[&str] = &[
    "no water",
    "not working",
    "emergency",
    "broken",
    "no electricity",
    "too high",
];

/// Settings for fitting the feature extractor and the category model.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Additive (Laplace/Lidstone) smoothing for the naive Bayes term counts.
    pub smoothing: f64,
    /// Tokens shorter than this are ignored by the vectorizer.
    pub min_token_length: usize,
    /// Accept a corpus with a single distinct label. Every prediction is then
    /// that label.
    pub allow_single_class: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            smoothing: 1.0,
            min_token_length: 2,
            allow_single_class: false,
        }
    }
}

/// Column layout of a labeled corpus file.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusConfig {
    pub text_column: String,
    pub label_column: String,
    pub delimiter: u8,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            text_column: "Complaint".to_string(),
            label_column: "Category".to_string(),
            delimiter: b',',
        }
    }
}

/// Keyword override and sentiment thresholds for urgency estimation.
///
/// Comparisons are strict: a polarity equal to `high_below` is `Medium`, and a
/// polarity equal to `medium_below` is `Low`.
#[derive(Debug, Clone, PartialEq)]
pub struct UrgencyConfig {
    pub critical_phrases: Vec<String>,
    pub high_below: f64,
    pub medium_below: f64,
}

impl Default for UrgencyConfig {
    fn default() -> Self {
        Self {
            critical_phrases: DEFAULT_CRITICAL_PHRASES.iter().map(|p| p.to_string()).collect(),
            high_below: -0.4,
            medium_below: 0.0,
        }
    }
}
