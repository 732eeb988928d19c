use std::collections::BTreeSet;

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::utils::{argmax, log_sum_exp};
use super::vectorizer::SparseVector;
use crate::category::Category;

/// Multinomial naive Bayes over TF-IDF feature vectors.
///
/// Classes are kept in lexicographic order. Prediction is the argmax of the
/// joint log-likelihood `class_log_prior + x . feature_log_prob`, and ties go
/// to the class that sorts first. With an all-zero vector the prior alone
/// decides, so empty input falls back to the most frequent training label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayesModel {
    classes: Vec<Category>,
    class_counts: Vec<usize>,
    class_log_prior: Array1<f64>,
    feature_log_prob: Array2<f64>,
    smoothing: f64,
}

impl NaiveBayesModel {
    /// Fits the model on feature vectors of dimension `n_features` and their
    /// labels.
    pub fn fit(
        vectors: &[SparseVector],
        labels: &[Category],
        n_features: usize,
        smoothing: f64,
    ) -> Result<Self, ClassifierError> {
        if !(smoothing > 0.0 && smoothing.is_finite()) {
            return Err(ClassifierError::ValidationError(format!(
                "Smoothing must be a positive finite number, got {}",
                smoothing
            )));
        }
        if vectors.len() != labels.len() {
            return Err(ClassifierError::ValidationError(format!(
                "Got {} feature vectors but {} labels",
                vectors.len(),
                labels.len()
            )));
        }
        if vectors.is_empty() {
            return Err(ClassifierError::TrainingDataError(
                "Cannot fit a classifier with zero classes".into(),
            ));
        }

        let classes: Vec<Category> = labels.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect();
        let n_classes = classes.len();

        let mut class_counts = vec![0usize; n_classes];
        let mut feature_counts = Array2::<f64>::zeros((n_classes, n_features));
        for (vector, label) in vectors.iter().zip(labels) {
            let class = classes
                .binary_search(label)
                .map_err(|_| ClassifierError::ValidationError(format!("Unknown label '{}'", label)))?;
            class_counts[class] += 1;
            for (feature, weight) in vector.iter() {
                if feature >= n_features {
                    return Err(ClassifierError::ValidationError(format!(
                        "Feature index {} out of range for {} features",
                        feature, n_features
                    )));
                }
                feature_counts[[class, feature]] += weight;
            }
        }

        feature_counts.mapv_inplace(|count| count + smoothing);
        let totals = feature_counts.sum_axis(Axis(1));
        let mut feature_log_prob = feature_counts;
        for (mut row, total) in feature_log_prob.axis_iter_mut(Axis(0)).zip(totals.iter()) {
            let log_total = total.ln();
            row.mapv_inplace(|count| count.ln() - log_total);
        }

        let n_documents = (vectors.len() as f64).ln();
        let class_log_prior = class_counts
            .iter()
            .map(|&count| (count as f64).ln() - n_documents)
            .collect::<Array1<f64>>();

        Ok(Self {
            classes,
            class_counts,
            class_log_prior,
            feature_log_prob,
            smoothing,
        })
    }

    /// Unnormalized log posterior for each class, in class order.
    pub fn joint_log_likelihood(&self, vector: &SparseVector) -> Array1<f64> {
        let mut scores = self.class_log_prior.clone();
        for (feature, weight) in vector.iter() {
            let column = self.feature_log_prob.column(feature);
            scores.scaled_add(weight, &column);
        }
        scores
    }

    /// The most likely class.
    pub fn predict(&self, vector: &SparseVector) -> &Category {
        let scores = self.joint_log_likelihood(vector);
        let best = scores
            .as_slice()
            .and_then(argmax)
            .unwrap_or(0);
        &self.classes[best]
    }

    /// Posterior probability of each class, in class order.
    pub fn predict_proba(&self, vector: &SparseVector) -> Vec<f64> {
        let scores = self.joint_log_likelihood(vector).to_vec();
        let normalizer = log_sum_exp(&scores);
        scores.iter().map(|&s| (s - normalizer).exp()).collect()
    }

    pub fn classes(&self) -> &[Category] {
        &self.classes
    }

    /// Number of training documents seen for each class, in class order.
    pub fn class_counts(&self) -> &[usize] {
        &self.class_counts
    }

    pub fn n_features(&self) -> usize {
        self.feature_log_prob.ncols()
    }

    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::vectorizer::TfidfVectorizer;

    fn fit_model(docs: &[(&str, &str)]) -> (TfidfVectorizer, NaiveBayesModel) {
        let texts: Vec<String> = docs.iter().map(|(t, _)| t.to_string()).collect();
        let labels: Vec<Category> = docs.iter().map(|(_, l)| Category::parse(l).unwrap()).collect();
        let vectorizer = TfidfVectorizer::fit(&texts, 2).unwrap();
        let vectors: Vec<SparseVector> = texts.iter().map(|t| vectorizer.transform(t)).collect();
        let model =
            NaiveBayesModel::fit(&vectors, &labels, vectorizer.vocabulary_size(), 1.0).unwrap();
        (vectorizer, model)
    }

    #[test]
    fn test_classes_are_sorted() {
        let (_, model) = fit_model(&[("water", "Maintenance"), ("wifi", "IT"), ("food", "Mess")]);
        let classes: Vec<&str> = model.classes().iter().map(Category::as_str).collect();
        assert_eq!(classes, vec!["IT", "Maintenance", "Mess"]);
        assert_eq!(model.class_counts(), &[1, 1, 1]);
    }

    #[test]
    fn test_predicts_training_labels() {
        let (vectorizer, model) = fit_model(&[
            ("ac work room", "Maintenance"),
            ("wifi slow", "IT"),
            ("water sinc morn", "Maintenance"),
        ]);
        assert_eq!(model.predict(&vectorizer.transform("wifi slow")), "IT");
        assert_eq!(model.predict(&vectorizer.transform("water morn emerg")), "Maintenance");
    }

    #[test]
    fn test_empty_vector_falls_back_to_prior() {
        let (vectorizer, model) = fit_model(&[
            ("ac work", "Maintenance"),
            ("water leak", "Maintenance"),
            ("wifi slow", "IT"),
        ]);
        assert_eq!(model.predict(&vectorizer.transform("")), "Maintenance");
    }

    #[test]
    fn test_tie_goes_to_first_class() {
        let (vectorizer, model) = fit_model(&[("water", "Maintenance"), ("wifi", "IT")]);
        assert_eq!(model.predict(&vectorizer.transform("")), "IT");
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (vectorizer, model) = fit_model(&[("water leak", "Maintenance"), ("wifi slow", "IT")]);
        let proba = model.predict_proba(&vectorizer.transform("wifi"));
        assert_eq!(proba.len(), 2);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(proba[0] > proba[1]);
    }

    #[test]
    fn test_invalid_smoothing() {
        let labels = vec![Category::parse("IT").unwrap()];
        let vectors = vec![SparseVector::default()];
        assert!(matches!(
            NaiveBayesModel::fit(&vectors, &labels, 1, 0.0),
            Err(ClassifierError::ValidationError(_))
        ));
    }
}
