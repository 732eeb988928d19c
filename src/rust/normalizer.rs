//! Deterministic text normalization applied before feature extraction.
//!
//! Raw complaint text goes through:
//! 1. every character that is not an ASCII letter becomes a space
//! 2. lowercasing
//! 3. whitespace tokenization
//! 4. English stopword removal
//! 5. Snowball English stemming
//! 6. rejoining with single spaces
//!
//! Stemming uses the Snowball English (Porter2) algorithm from `rust-stemmers`,
//! not the classic 1980 Porter stemmer. The two agree on most words, but
//! Porter2 maps a few irregular forms differently (`skies` to `sky`, `dying`
//! to `die`). Artifacts trained elsewhere with classic Porter stems will not
//! share every vocabulary term with text normalized here.
//!
//! ```
//! use complaint_triage::normalize;
//!
//! assert_eq!(normalize("AC not working in room 12"), "ac work room");
//! assert_eq!(normalize("1234 !!"), "");
//! ```

use std::collections::HashSet;

use lazy_static::lazy_static;
use rust_stemmers::{Algorithm, Stemmer};

/// English stopwords. Contractions are omitted since normalized tokens never
/// contain apostrophes.
const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for",
    "with", "about", "against", "between", "into", "through", "during", "before", "after",
    "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
    "again", "further", "then", "once", "here", "there", "when", "where", "why", "how", "all",
    "any", "both", "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not",
    "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will", "just", "don",
    "should", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "couldn", "didn",
    "doesn", "hadn", "hasn", "haven", "isn", "ma", "mightn", "mustn", "needn", "shan",
    "shouldn", "wasn", "weren", "won", "wouldn",
];

lazy_static! {
    static ref STOPWORDS: HashSet<&'static str> = ENGLISH_STOPWORDS.iter().copied().collect();
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Returns true if `token` is an English stopword. Expects lowercase input.
pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

/// Stems a single lowercase token.
pub fn stem(token: &str) -> String {
    STEMMER.stem(token).into_owned()
}

/// Normalizes raw complaint text into a space-joined sequence of stemmed,
/// lowercase, alphabetic tokens with stopwords removed.
///
/// Input with no alphabetic characters yields an empty string.
pub fn normalize(text: &str) -> String {
    let letters_only: String = text
        .chars()
        .map(|c| if c.is_ascii_alphabetic() { c.to_ascii_lowercase() } else { ' ' })
        .collect();

    letters_only
        .split_whitespace()
        .filter(|token| !is_stopword(token))
        .map(stem)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_non_letters_and_stopwords() {
        assert_eq!(normalize("Wifi is too slow!!!"), "wifi slow");
        assert_eq!(normalize("No water since morning"), "water sinc morn");
    }

    #[test]
    fn test_porter2_irregular_forms() {
        assert_eq!(stem("skies"), "sky");
        assert_eq!(stem("dying"), "die");
        assert_eq!(stem("working"), "work");
    }

    #[test]
    fn test_non_ascii_letters_split_words() {
        assert_eq!(normalize("caf\u{e9} menu"), "caf menu");
    }

    #[test]
    fn test_empty_and_symbol_only_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("42 -- ?!"), "");
    }

    #[test]
    fn test_stopword_lookup_is_exact() {
        assert!(is_stopword("the"));
        assert!(is_stopword("not"));
        assert!(!is_stopword("water"));
        assert!(!is_stopword("The"));
    }

    #[test]
    fn test_normalize_is_stable_on_normalized_text() {
        let inputs = [
            "The hostel rooms are dirty and the fans are broken",
            "Internet connection keeps dropping",
            "Mess food has been terrible since Monday",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "unstable for {:?}", input);
        }
    }
}
