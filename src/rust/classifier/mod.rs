//! The trained category classifier and the procedure that trains it.

mod builder;
#[allow(clippy::module_inception)]
mod classifier;
mod error;
pub mod model;
mod utils;
pub mod vectorizer;

pub use builder::ClassifierBuilder;
pub use classifier::CategoryClassifier;
pub use error::ClassifierError;
pub use model::NaiveBayesModel;
pub use vectorizer::{SparseVector, TfidfVectorizer};

use crate::category::Category;

/// Information about a trained classifier
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierInfo {
    pub num_classes: usize,
    /// Labels in the classifier's internal (lexicographic) order
    pub class_labels: Vec<Category>,
    /// Training documents per label, aligned with `class_labels`
    pub class_counts: Vec<usize>,
    pub vocabulary_size: usize,
    pub training_documents: usize,
}
