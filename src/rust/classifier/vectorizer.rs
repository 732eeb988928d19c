use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::utils::l2_normalize;

/// A sparse feature vector: parallel arrays of feature indices (ascending)
/// and their weights.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SparseVector {
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn get(&self, index: usize) -> f64 {
        self.indices
            .binary_search(&index)
            .map(|pos| self.values[pos])
            .unwrap_or(0.0)
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|&x| x * x).sum::<f64>().sqrt()
    }
}

/// TF-IDF term weighting fit once over a training corpus.
///
/// The vocabulary is every distinct whitespace token of at least
/// `min_token_length` characters, indexed in sorted order. Weights are raw
/// term counts times the smoothed inverse document frequency
/// `ln((1 + n) / (1 + df)) + 1`, and each vector is scaled to unit L2 norm.
/// Tokens outside the vocabulary are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    min_token_length: usize,
    n_documents: usize,
}

impl TfidfVectorizer {
    /// Fits the vocabulary and idf statistics over normalized documents.
    ///
    /// Fails with `TrainingDataError` if there are no documents or no
    /// document contains a usable token.
    pub fn fit(documents: &[String], min_token_length: usize) -> Result<Self, ClassifierError> {
        if documents.is_empty() {
            return Err(ClassifierError::TrainingDataError(
                "Cannot fit a vocabulary on an empty corpus".into(),
            ));
        }

        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for document in documents {
            let unique: BTreeSet<&str> = Self::tokens(document, min_token_length).collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        if document_frequency.is_empty() {
            return Err(ClassifierError::TrainingDataError(
                "Empty vocabulary: no document contains a usable term".into(),
            ));
        }

        let n = documents.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (index, (term, df)) in document_frequency.into_iter().enumerate() {
            vocabulary.insert(term.to_string(), index);
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
        }

        Ok(Self {
            vocabulary,
            idf,
            min_token_length,
            n_documents: documents.len(),
        })
    }

    fn tokens(document: &str, min_token_length: usize) -> impl Iterator<Item = &str> {
        document
            .split_whitespace()
            .filter(move |token| token.chars().count() >= min_token_length)
    }

    /// Maps a normalized document to its unit-length TF-IDF vector.
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in Self::tokens(document, self.min_token_length) {
            if let Some(&index) = self.vocabulary.get(token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let indices: Vec<usize> = counts.keys().copied().collect();
        let mut values: Vec<f64> = counts
            .into_iter()
            .map(|(index, count)| count * self.idf[index])
            .collect();
        l2_normalize(&mut values);

        SparseVector { indices, values }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// Feature index of a term, if it is in the vocabulary.
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.index_of(term).map(|index| self.idf[index])
    }

    /// Vocabulary terms in feature-index order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.vocabulary.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_vocabulary_is_sorted_and_skips_short_tokens() {
        let vectorizer = TfidfVectorizer::fit(&docs(&["wifi slow", "ac work room x"]), 2).unwrap();
        let terms: Vec<&str> = vectorizer.terms().collect();
        assert_eq!(terms, vec!["ac", "room", "slow", "wifi", "work"]);
        assert_eq!(vectorizer.index_of("x"), None);
        assert_eq!(vectorizer.n_documents(), 2);
    }

    #[test]
    fn test_smoothed_idf() {
        let vectorizer =
            TfidfVectorizer::fit(&docs(&["water morn", "water", "wifi"]), 2).unwrap();
        let expected_water = (4.0_f64 / 3.0).ln() + 1.0;
        let expected_wifi = (4.0_f64 / 2.0).ln() + 1.0;
        assert!((vectorizer.idf("water").unwrap() - expected_water).abs() < 1e-12);
        assert!((vectorizer.idf("wifi").unwrap() - expected_wifi).abs() < 1e-12);
    }

    #[test]
    fn test_transform_is_unit_length_and_drops_unknown_terms() {
        let vectorizer = TfidfVectorizer::fit(&docs(&["water morn", "wifi slow"]), 2).unwrap();
        let vector = vectorizer.transform("water water unknown");
        assert_eq!(vector.nnz(), 1);
        assert!((vector.norm() - 1.0).abs() < 1e-12);
        assert_eq!(vector.get(vectorizer.index_of("water").unwrap()), 1.0);

        let empty = vectorizer.transform("");
        assert!(empty.is_empty());
        assert_eq!(vectorizer.transform("completely unseen").nnz(), 0);
    }

    #[test]
    fn test_fit_rejects_empty_input() {
        assert!(matches!(
            TfidfVectorizer::fit(&[], 2),
            Err(ClassifierError::TrainingDataError(_))
        ));
        assert!(matches!(
            TfidfVectorizer::fit(&docs(&["", "a b"]), 2),
            Err(ClassifierError::TrainingDataError(_))
        ));
    }
}
