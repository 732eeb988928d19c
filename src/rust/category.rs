use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::classifier::ClassifierError;

/// A category label learned from the training corpus.
///
/// Labels are data-driven: the set of valid categories is exactly the set of
/// distinct labels seen at training time, so this is an opaque string rather
/// than an enum. Cloning is cheap because the text is shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(Arc<str>);

impl Category {
    /// Validates a raw training label and wraps it.
    ///
    /// Surrounding whitespace is trimmed; an empty label is rejected.
    pub fn parse(label: &str) -> Result<Self, ClassifierError> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(ClassifierError::TrainingDataError(
                "Category label cannot be empty".into(),
            ));
        }
        Ok(Self(Arc::from(trimmed)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Category {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Category {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Category {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}
