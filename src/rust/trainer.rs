//! Offline training entry points.

use std::path::Path;

use log::info;

use crate::artifact_manager;
use crate::classifier::{CategoryClassifier, ClassifierBuilder, ClassifierError};
use crate::config::{CorpusConfig, TrainingConfig};
use crate::corpus::LabeledCorpus;

/// Trains a classifier on in-memory `(text, label)` pairs with the default
/// configuration.
///
/// # Example
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use complaint_triage::train;
///
/// let classifier = train(vec![
///     ("AC not working in room 12", "Maintenance"),
///     ("Wifi is too slow", "IT"),
/// ])?;
/// assert_eq!(classifier.info().num_classes, 2);
/// # Ok(())
/// # }
/// ```
pub fn train<I, T, L>(pairs: I) -> Result<CategoryClassifier, ClassifierError>
where
    I: IntoIterator<Item = (T, L)>,
    T: Into<String>,
    L: AsRef<str>,
{
    ClassifierBuilder::new().add_examples(pairs)?.build()
}

/// Reads a labeled corpus file, trains on it and writes the artifact pair.
///
/// Returns the trained classifier together with the pair id written into
/// both artifacts.
pub fn train_from_path(
    corpus_path: &Path,
    vectorizer_path: &Path,
    model_path: &Path,
    training: &TrainingConfig,
    corpus: &CorpusConfig,
) -> Result<(CategoryClassifier, String), ClassifierError> {
    let corpus = LabeledCorpus::from_path(corpus_path, corpus)?;
    let classifier = ClassifierBuilder::new()
        .with_config(training.clone())
        .with_corpus(corpus)
        .build()?;
    let pair_id = artifact_manager::save_pair(&classifier, vectorizer_path, model_path)
        .map_err(ClassifierError::SaveError)?;
    info!("Training complete");
    Ok((classifier, pair_id))
}
