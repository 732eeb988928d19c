use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use super::model::NaiveBayesModel;
use super::vectorizer::{SparseVector, TfidfVectorizer};
use crate::artifact_manager::ArtifactError;
use crate::category::Category;

/// A thread-safe category classifier: the frozen (vectorizer, model) pair
/// produced by one training run.
///
/// # Thread Safety
///
/// This type is automatically `Send + Sync`: both halves of the pair are
/// immutable after construction and shared through `Arc`, so cloning the
/// classifier is cheap and never copies the fitted state.
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use complaint_triage::{normalize, CategoryClassifier};
/// use std::sync::Arc;
/// use std::thread;
///
/// let classifier = Arc::new(CategoryClassifier::builder()
///     .add_example("Wifi is too slow", "IT")?
///     .add_example("No water since morning", "Maintenance")?
///     .build()?);
///
/// let classifier_clone = Arc::clone(&classifier);
/// let handle = thread::spawn(move || {
///     classifier_clone.predict(&normalize("wifi keeps dropping"))
/// });
/// assert_eq!(handle.join().unwrap(), "IT");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    vectorizer: Arc<TfidfVectorizer>,
    model: Arc<NaiveBayesModel>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<CategoryClassifier>();
    }
};

impl CategoryClassifier {
    /// Creates a new ClassifierBuilder for fluent training
    pub fn builder() -> super::builder::ClassifierBuilder {
        super::builder::ClassifierBuilder::new()
    }

    /// Pairs a fitted vectorizer with a model fit on its output.
    pub(crate) fn from_parts(
        vectorizer: TfidfVectorizer,
        model: NaiveBayesModel,
    ) -> Result<Self, ArtifactError> {
        if vectorizer.vocabulary_size() != model.n_features() {
            return Err(ArtifactError::DimensionMismatch {
                vocabulary: vectorizer.vocabulary_size(),
                features: model.n_features(),
            });
        }
        Ok(Self {
            vectorizer: Arc::new(vectorizer),
            model: Arc::new(model),
        })
    }

    /// Returns information about the classifier's fitted state
    pub fn info(&self) -> super::ClassifierInfo {
        super::ClassifierInfo {
            num_classes: self.model.classes().len(),
            class_labels: self.model.classes().to_vec(),
            class_counts: self.model.class_counts().to_vec(),
            vocabulary_size: self.vectorizer.vocabulary_size(),
            training_documents: self.vectorizer.n_documents(),
        }
    }

    /// Maps normalized text to its feature vector. Out-of-vocabulary terms
    /// contribute nothing.
    pub fn vectorize(&self, normalized_text: &str) -> SparseVector {
        self.vectorizer.transform(normalized_text)
    }

    /// Predicts the category of already-normalized text.
    ///
    /// Always returns one of the training labels. Text with no known terms
    /// gets the label with the highest prior.
    pub fn predict(&self, normalized_text: &str) -> Category {
        let vector = self.vectorize(normalized_text);
        if vector.is_empty() {
            debug!("No known terms in input, falling back to class prior");
        }
        self.model.predict(&vector).clone()
    }

    /// Predicts the category and returns the posterior probability of every
    /// class.
    ///
    /// # Returns
    /// A tuple containing:
    /// * The predicted category
    /// * A map of every category to its probability (summing to 1.0)
    pub fn predict_with_scores(&self, normalized_text: &str) -> (Category, HashMap<Category, f64>) {
        let vector = self.vectorize(normalized_text);
        let best = self.model.predict(&vector).clone();
        let scores = self
            .model
            .classes()
            .iter()
            .cloned()
            .zip(self.model.predict_proba(&vector))
            .collect();
        (best, scores)
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn model(&self) -> &NaiveBayesModel {
        &self.model
    }
}
