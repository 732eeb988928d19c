//! The triage pipeline: normalization, category prediction and urgency
//! estimation composed into one synchronous call.

use std::path::Path;
use std::sync::Arc;

use log::debug;
use serde::Serialize;

use crate::artifact_manager::{self, ArtifactManager};
use crate::category::Category;
use crate::classifier::{CategoryClassifier, ClassifierError};
use crate::normalizer::normalize;
use crate::urgency::{UrgencyAssessment, UrgencyEstimator, UrgencyLevel};

/// Category and urgency assigned to one complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriageResult {
    pub category: Category,
    pub urgency: UrgencyLevel,
}

/// A [`TriageResult`] with the intermediate values that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct TriageReport {
    pub normalized: String,
    pub category: Category,
    /// Posterior probability of the predicted category.
    pub confidence: f64,
    pub urgency: UrgencyAssessment,
}

impl TriageReport {
    pub fn result(&self) -> TriageResult {
        TriageResult {
            category: self.category.clone(),
            urgency: self.urgency.level,
        }
    }
}

/// Composes the normalizer, the category classifier and the urgency
/// estimator.
///
/// A pipeline can only be constructed around a loaded classifier, so a missing
/// or broken artifact pair surfaces once at startup instead of on every call.
/// Every `triage` call is independent and side-effect free; share one
/// pipeline (it is cheap to clone) across threads.
#[derive(Debug, Clone)]
pub struct TriagePipeline {
    classifier: Arc<CategoryClassifier>,
    urgency: UrgencyEstimator,
}

impl TriagePipeline {
    pub fn new(classifier: CategoryClassifier) -> Self {
        Self {
            classifier: Arc::new(classifier),
            urgency: UrgencyEstimator::default(),
        }
    }

    /// Replaces the default urgency estimator
    pub fn with_urgency_estimator(mut self, urgency: UrgencyEstimator) -> Self {
        self.urgency = urgency;
        self
    }

    /// Loads the artifact pair from explicit paths.
    ///
    /// Any failure (a missing file, corruption, or files from different
    /// training runs) is an `InitError`.
    pub fn from_artifacts<P: AsRef<Path>, Q: AsRef<Path>>(
        vectorizer_path: P,
        model_path: Q,
    ) -> Result<Self, ClassifierError> {
        let classifier = artifact_manager::load_pair(vectorizer_path.as_ref(), model_path.as_ref())?;
        Ok(Self::new(classifier))
    }

    /// Loads the artifact pair managed by `manager`.
    pub fn from_manager(manager: &ArtifactManager) -> Result<Self, ClassifierError> {
        Ok(Self::new(manager.load()?))
    }

    /// Assigns a category and an urgency level to raw complaint text.
    ///
    /// The category comes from the normalized text; urgency is computed from
    /// the raw text so that critical phrases like "no water" survive. Empty or
    /// meaningless input is not rejected: it gets the fallback category and
    /// `Low` urgency.
    pub fn triage(&self, raw_text: &str) -> TriageResult {
        let normalized = normalize(raw_text);
        let category = self.classifier.predict(&normalized);
        let urgency = self.urgency.estimate(raw_text);
        debug!("Triaged as {} / {}", category, urgency);
        TriageResult { category, urgency }
    }

    /// Like [`TriagePipeline::triage`], but also reports the normalized text,
    /// the classifier's confidence and what decided the urgency.
    pub fn triage_detailed(&self, raw_text: &str) -> TriageReport {
        let normalized = normalize(raw_text);
        let (category, scores) = self.classifier.predict_with_scores(&normalized);
        let confidence = scores.get(&category).copied().unwrap_or_default();
        let urgency = self.urgency.assess(raw_text);
        TriageReport {
            normalized,
            category,
            confidence,
            urgency,
        }
    }

    pub fn classifier(&self) -> &CategoryClassifier {
        &self.classifier
    }
}
