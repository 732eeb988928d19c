//! Labeled training corpus loading.
//!
//! A corpus is tabular data with a header row and at least a complaint text
//! column and a category label column:
//! ```csv
//! Complaint,Category
//! AC not working in room 12,Maintenance
//! Wifi is too slow,IT
//! ```

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use log::info;

use crate::category::Category;
use crate::classifier::ClassifierError;
use crate::config::CorpusConfig;

/// One labeled complaint.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledExample {
    pub text: String,
    pub label: Category,
}

/// A snapshot of labeled complaints used for one training run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledCorpus {
    examples: Vec<LabeledExample>,
}

impl LabeledCorpus {
    /// Builds a corpus from `(text, label)` pairs, validating every label.
    pub fn from_pairs<I, T, L>(pairs: I) -> Result<Self, ClassifierError>
    where
        I: IntoIterator<Item = (T, L)>,
        T: Into<String>,
        L: AsRef<str>,
    {
        let examples = pairs
            .into_iter()
            .map(|(text, label)| {
                Ok(LabeledExample {
                    text: text.into(),
                    label: Category::parse(label.as_ref())?,
                })
            })
            .collect::<Result<Vec<_>, ClassifierError>>()?;
        Ok(Self { examples })
    }

    /// Reads a CSV corpus file.
    pub fn from_path<P: AsRef<Path>>(path: P, config: &CorpusConfig) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        info!("Loading corpus from {:?}", path);
        let reader = ReaderBuilder::new()
            .delimiter(config.delimiter)
            .from_path(path)?;
        Self::from_csv(reader, config)
    }

    /// Reads CSV corpus data from any reader.
    pub fn from_reader<R: io::Read>(reader: R, config: &CorpusConfig) -> Result<Self, ClassifierError> {
        let reader = ReaderBuilder::new()
            .delimiter(config.delimiter)
            .from_reader(reader);
        Self::from_csv(reader, config)
    }

    fn from_csv<R: io::Read>(
        mut reader: csv::Reader<R>,
        config: &CorpusConfig,
    ) -> Result<Self, ClassifierError> {
        let headers = reader.headers()?.clone();
        let text_index = Self::column_index(&headers, &config.text_column)?;
        let label_index = Self::column_index(&headers, &config.label_column)?;

        let mut examples = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let text = record.get(text_index).unwrap_or_default();
            let label = record.get(label_index).unwrap_or_default();
            let label = Category::parse(label).map_err(|_| {
                ClassifierError::TrainingDataError(format!(
                    "Row {} has an empty '{}' value",
                    row + 1,
                    config.label_column
                ))
            })?;
            examples.push(LabeledExample {
                text: text.to_string(),
                label,
            });
        }

        info!("Loaded {} labeled example(s)", examples.len());
        Ok(Self { examples })
    }

    fn column_index(headers: &StringRecord, column: &str) -> Result<usize, ClassifierError> {
        headers
            .iter()
            .position(|header| header.trim() == column)
            .ok_or_else(|| {
                ClassifierError::TrainingDataError(format!(
                    "Corpus is missing required column '{}'",
                    column
                ))
            })
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn examples(&self) -> &[LabeledExample] {
        &self.examples
    }

    pub fn into_examples(self) -> Vec<LabeledExample> {
        self.examples
    }

    /// Number of examples per distinct label.
    pub fn label_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for example in &self.examples {
            *counts.entry(example.label.clone()).or_insert(0) += 1;
        }
        counts
    }
}
