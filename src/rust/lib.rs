//! A complaint triage library: assigns every free-text complaint a category
//! learned from a labeled corpus and a rule-based urgency level.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use complaint_triage::{CategoryClassifier, TriagePipeline, UrgencyLevel};
//!
//! let classifier = CategoryClassifier::builder()
//!     .add_example("AC not working in room 12", "Maintenance")?
//!     .add_example("Wifi is too slow", "IT")?
//!     .add_example("No water since morning", "Maintenance")?
//!     .build()?;
//!
//! let pipeline = TriagePipeline::new(classifier);
//! let result = pipeline.triage("No water since morning, emergency");
//! assert_eq!(result.category, "Maintenance");
//! assert_eq!(result.urgency, UrgencyLevel::High);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! The pipeline holds only immutable state and can be shared across threads:
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use complaint_triage::{train, TriagePipeline};
//! use std::thread;
//!
//! let pipeline = TriagePipeline::new(train(vec![
//!     ("Wifi is too slow", "IT"),
//!     ("Mess food is stale", "Food"),
//! ])?);
//!
//! let mut handles = vec![];
//! for text in ["wifi down", "stale bread", ""] {
//!     let pipeline = pipeline.clone();
//!     handles.push(thread::spawn(move || pipeline.triage(text)));
//! }
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! # Ok(())
//! # }
//! ```

pub mod artifact_manager;
pub mod category;
pub mod classifier;
pub mod config;
pub mod corpus;
pub mod intake;
pub mod normalizer;
pub mod pipeline;
pub mod sentiment;
pub mod trainer;
pub mod urgency;

pub use artifact_manager::{ArtifactError, ArtifactManager};
pub use category::Category;
pub use classifier::{CategoryClassifier, ClassifierBuilder, ClassifierError, ClassifierInfo};
pub use config::{CorpusConfig, TrainingConfig, UrgencyConfig};
pub use corpus::{LabeledCorpus, LabeledExample};
pub use intake::{
    ComplaintRecord, ComplaintRepository, ComplaintStatus, ComplaintSummary, CsvComplaintRepository,
    IntakeError, IntakeService, LogNotifier, Notifier,
};
pub use normalizer::normalize;
pub use pipeline::{TriagePipeline, TriageReport, TriageResult};
pub use trainer::{train, train_from_path};
pub use urgency::{estimate_urgency, UrgencyEstimator, UrgencyLevel};

/// Initializes `env_logger`, defaulting to `info` when `RUST_LOG` is unset.
pub fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
