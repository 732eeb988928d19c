use thiserror::Error;

use crate::artifact_manager::ArtifactError;

/// Represents the different types of errors that can occur while training or
/// loading the category classifier.
///
/// Every error is deterministic given its inputs; none of them is worth
/// retrying.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// The artifact pair is missing, unreadable or mismatched. The triage
    /// pipeline cannot serve requests.
    #[error("Initialization error: {0}")]
    InitError(#[from] ArtifactError),
    /// The labeled corpus is unusable: empty, missing a column, a blank
    /// label, or too few distinct labels.
    #[error("Training data error: {0}")]
    TrainingDataError(String),
    /// Training succeeded but the artifact pair could not be written.
    #[error("Failed to save trained artifacts: {0}")]
    SaveError(#[source] ArtifactError),
    /// The corpus file could not be read or parsed as CSV.
    #[error("Corpus error: {0}")]
    CorpusError(#[from] csv::Error),
    /// Invalid configuration or builder input.
    #[error("Validation error: {0}")]
    ValidationError(String),
}
