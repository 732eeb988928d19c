//! Lexicon-based sentiment polarity.
//!
//! Each word found in the polarity lexicon produces one assessment. An
//! intensifier directly before a sentiment word scales it, and a negation up to
//! [`NEGATION_WINDOW`] words earlier flips and dampens it (factor -0.5). The
//! polarity of a text is the mean of its assessments, clamped to [-1.0, 1.0],
//! or 0.0 when nothing in the text carries sentiment.

use std::collections::HashMap;

use lazy_static::lazy_static;

/// How many words after a negation it still applies to.
pub const NEGATION_WINDOW: usize = 3;

const NEGATION_FACTOR: f64 = -0.5;

const NEGATIONS: &[&str] = &["no", "not", "never", "none", "nobody", "nothing", "cannot"];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("extremely", 1.5),
    ("so", 1.2),
    ("too", 1.2),
    ("totally", 1.4),
    ("completely", 1.4),
    ("absolutely", 1.5),
    ("highly", 1.3),
    ("quite", 1.1),
    ("super", 1.3),
    ("slightly", 0.5),
    ("somewhat", 0.6),
    ("barely", 0.4),
];

const POLARITY_LEXICON: &[(&str, f64)] = &[
    // positive
    ("good", 0.7),
    ("great", 0.8),
    ("excellent", 1.0),
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("wonderful", 1.0),
    ("fantastic", 0.4),
    ("best", 1.0),
    ("better", 0.5),
    ("nice", 0.6),
    ("happy", 0.8),
    ("glad", 0.5),
    ("pleased", 0.5),
    ("satisfied", 0.5),
    ("helpful", 0.5),
    ("clean", 0.37),
    ("fine", 0.42),
    ("fast", 0.2),
    ("quick", 0.33),
    ("quiet", 0.1),
    ("comfortable", 0.4),
    ("friendly", 0.38),
    ("fresh", 0.3),
    ("working", 0.1),
    ("resolved", 0.3),
    ("thanks", 0.2),
    ("thank", 0.2),
    ("love", 0.5),
    ("perfect", 1.0),
    ("okay", 0.5),
    ("ok", 0.5),
    // negative
    ("bad", -0.7),
    ("worse", -0.4),
    ("worst", -1.0),
    ("terrible", -1.0),
    ("horrible", -1.0),
    ("awful", -1.0),
    ("disgusting", -1.0),
    ("pathetic", -1.0),
    ("useless", -0.5),
    ("poor", -0.4),
    ("dirty", -0.6),
    ("filthy", -0.8),
    ("smelly", -0.5),
    ("slow", -0.3),
    ("late", -0.3),
    ("noisy", -0.3),
    ("loud", -0.1),
    ("cold", -0.6),
    ("hot", 0.25),
    ("unhygienic", -0.6),
    ("unsafe", -0.5),
    ("dangerous", -0.6),
    ("rude", -0.3),
    ("annoying", -0.8),
    ("frustrating", -0.4),
    ("frustrated", -0.7),
    ("angry", -0.5),
    ("upset", -0.5),
    ("sad", -0.5),
    ("disappointed", -0.75),
    ("disappointing", -0.6),
    ("unacceptable", -0.5),
    ("wrong", -0.5),
    ("leaking", -0.3),
    ("damaged", -0.4),
    ("stale", -0.5),
    ("expensive", -0.5),
    ("unfair", -0.5),
    ("crowded", -0.2),
    ("hate", -0.8),
    ("sick", -0.71),
    ("worried", -0.4),
    ("difficult", -0.5),
    ("impossible", -0.67),
    ("delayed", -0.2),
    ("missing", -0.2),
    ("insufficient", -0.4),
    ("inadequate", -0.4),
];

lazy_static! {
    static ref LEXICON: HashMap<&'static str, f64> = POLARITY_LEXICON.iter().copied().collect();
    static ref INTENSITY: HashMap<&'static str, f64> = INTENSIFIERS.iter().copied().collect();
}

fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.ends_with("n't")
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphabetic() || c == '\''))
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(|w| !w.is_empty())
}

/// Scores a text in [-1.0, 1.0]; negative values mean negative sentiment.
///
/// Pure and deterministic. Empty input scores 0.0.
pub fn polarity(text: &str) -> f64 {
    let mut assessments = Vec::new();
    let mut words_since_negation: Option<usize> = None;
    let mut intensity: Option<f64> = None;

    for word in words(text) {
        if is_negation(&word) {
            words_since_negation = Some(0);
            intensity = None;
            continue;
        }

        if let Some(factor) = INTENSITY.get(word.as_str()) {
            intensity = Some(intensity.unwrap_or(1.0) * factor);
            continue;
        }

        let negated = matches!(words_since_negation, Some(n) if n < NEGATION_WINDOW);

        if let Some(&score) = LEXICON.get(word.as_str()) {
            let mut score = score * intensity.unwrap_or(1.0);
            if negated {
                score *= NEGATION_FACTOR;
            }
            assessments.push(score.clamp(-1.0, 1.0));
            words_since_negation = None;
        } else if let Some(n) = words_since_negation.as_mut() {
            *n += 1;
        }
        intensity = None;
    }

    if assessments.is_empty() {
        return 0.0;
    }
    let mean = assessments.iter().sum::<f64>() / assessments.len() as f64;
    mean.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_and_empty_text() {
        assert_eq!(polarity(""), 0.0);
        assert_eq!(polarity("The room number is twelve"), 0.0);
    }

    #[test]
    fn test_single_word_scores() {
        assert_eq!(polarity("great"), 0.8);
        assert_eq!(polarity("The food is terrible."), -1.0);
        assert_eq!(polarity("poor"), -0.4);
    }

    #[test]
    fn test_mean_of_assessments() {
        let score = polarity("good food but slow service");
        assert!((score - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_negation_flips_and_dampens() {
        let score = polarity("the mess is not good");
        assert!((score - (-0.35)).abs() < 1e-12);
        let score = polarity("wifi isn't fast");
        assert!((score - (-0.1)).abs() < 1e-12);
    }

    #[test]
    fn test_negation_window_expires() {
        let score = polarity("not at all in the least bad");
        assert_eq!(score, -0.7);
    }

    #[test]
    fn test_intensifier_scales_and_clamps() {
        let score = polarity("very slow");
        assert!((score - (-0.39)).abs() < 1e-12);
        assert_eq!(polarity("extremely terrible"), -1.0);
    }

    #[test]
    fn test_range_is_bounded() {
        for text in ["absolutely perfect", "totally horrible awful", "good bad good"] {
            let p = polarity(text);
            assert!((-1.0..=1.0).contains(&p), "{} out of range for {:?}", p, text);
        }
    }
}
