use std::collections::BTreeMap;

use log::{info, warn};

use super::classifier::CategoryClassifier;
use super::error::ClassifierError;
use super::model::NaiveBayesModel;
use super::vectorizer::{SparseVector, TfidfVectorizer};
use crate::category::Category;
use crate::config::TrainingConfig;
use crate::corpus::LabeledCorpus;
use crate::normalizer::normalize;

/// A builder that trains a [`CategoryClassifier`] from labeled complaints.
///
/// Training is a batch, one-shot procedure: every text is normalized, a TF-IDF
/// vectorizer is fit over the whole normalized corpus, and a multinomial naive
/// Bayes model is fit on the resulting vectors. There is no incremental mode;
/// a changed corpus means building a new classifier.
#[derive(Debug, Default)]
pub struct ClassifierBuilder {
    examples: Vec<(String, Category)>,
    config: TrainingConfig,
}

impl ClassifierBuilder {
    /// Creates a new empty ClassifierBuilder instance with default configuration
    ///
    /// # Example
    /// ```
    /// use complaint_triage::ClassifierBuilder;
    ///
    /// let builder = ClassifierBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self {
            examples: Vec::new(),
            config: TrainingConfig::default(),
        }
    }

    /// Sets the training configuration
    pub fn with_config(mut self, config: TrainingConfig) -> Self {
        self.config = config;
        self
    }

    /// Accepts or rejects corpora with a single distinct label.
    pub fn allow_single_class(mut self, allow: bool) -> Self {
        self.config.allow_single_class = allow;
        self
    }

    /// Adds one labeled complaint.
    ///
    /// # Returns
    /// * `Result<Self, ClassifierError>` - The builder instance if successful, or
    ///   a `TrainingDataError` if the label is blank
    ///
    /// # Example
    /// ```
    /// use complaint_triage::ClassifierBuilder;
    ///
    /// let builder = ClassifierBuilder::new()
    ///     .add_example("Mess food is stale", "Food");
    /// assert!(builder.is_ok());
    /// ```
    pub fn add_example(
        mut self,
        text: impl Into<String>,
        label: impl AsRef<str>,
    ) -> Result<Self, ClassifierError> {
        let label = Category::parse(label.as_ref())?;
        self.examples.push((text.into(), label));
        Ok(self)
    }

    /// Adds several labeled complaints, stopping at the first invalid label.
    pub fn add_examples<I, T, L>(mut self, examples: I) -> Result<Self, ClassifierError>
    where
        I: IntoIterator<Item = (T, L)>,
        T: Into<String>,
        L: AsRef<str>,
    {
        for (text, label) in examples {
            self = self.add_example(text, label)?;
        }
        Ok(self)
    }

    /// Adds every example of an already-validated corpus.
    pub fn with_corpus(mut self, corpus: LabeledCorpus) -> Self {
        self.examples.extend(
            corpus
                .into_examples()
                .into_iter()
                .map(|example| (example.text, example.label)),
        );
        self
    }

    /// Number of examples added so far
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    fn validate_labels(&self) -> Result<(), ClassifierError> {
        if self.examples.is_empty() {
            return Err(ClassifierError::TrainingDataError(
                "Corpus is empty; at least one labeled complaint is required".into(),
            ));
        }

        let mut label_counts: BTreeMap<&Category, usize> = BTreeMap::new();
        for (_, label) in &self.examples {
            *label_counts.entry(label).or_insert(0) += 1;
        }

        if label_counts.len() < 2 {
            if !self.config.allow_single_class {
                return Err(ClassifierError::TrainingDataError(format!(
                    "Corpus has {} distinct label(s); at least 2 are required",
                    label_counts.len()
                )));
            }
            warn!(
                "Training on a single label; every prediction will be '{}'",
                self.examples[0].1
            );
        }

        for (label, count) in &label_counts {
            info!("  {}: {} example(s)", label, count);
        }
        Ok(())
    }

    /// Trains and returns the final CategoryClassifier
    ///
    /// # Returns
    /// * `Result<CategoryClassifier, ClassifierError>` - The trained classifier if
    ///   successful, or a `TrainingDataError` if:
    ///   - No examples have been added
    ///   - Fewer than 2 distinct labels were seen and single-class training is off
    ///   - No example contains a usable term after normalization
    ///
    /// # Example
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use complaint_triage::ClassifierBuilder;
    ///
    /// let classifier = ClassifierBuilder::new()
    ///     .add_example("Wifi is too slow", "IT")?
    ///     .add_example("Tap is leaking in washroom", "Maintenance")?
    ///     .build()?;
    /// assert_eq!(classifier.info().num_classes, 2);
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(self) -> Result<CategoryClassifier, ClassifierError> {
        info!("Training classifier on {} example(s)", self.examples.len());
        self.validate_labels()?;

        let (texts, labels): (Vec<String>, Vec<Category>) = self
            .examples
            .into_iter()
            .map(|(text, label)| (normalize(&text), label))
            .unzip();

        let vectorizer = TfidfVectorizer::fit(&texts, self.config.min_token_length)?;
        info!("Fitted vocabulary of {} term(s)", vectorizer.vocabulary_size());

        let vectors: Vec<SparseVector> = texts.iter().map(|text| vectorizer.transform(text)).collect();
        let model = NaiveBayesModel::fit(
            &vectors,
            &labels,
            vectorizer.vocabulary_size(),
            self.config.smoothing,
        )?;

        let correct = vectors
            .iter()
            .zip(&labels)
            .filter(|(vector, label)| model.predict(vector) == *label)
            .count();
        info!(
            "Training accuracy: {}/{} ({:.1}%)",
            correct,
            labels.len(),
            100.0 * correct as f64 / labels.len() as f64
        );

        Ok(CategoryClassifier::from_parts(vectorizer, model)?)
    }
}
