//! Storage for the (vectorizer, model) artifact pair.
//!
//! Each artifact file is a bincode envelope holding the serialized payload, a
//! SHA-256 digest of that payload, and a pair id: the SHA-256 of both payloads
//! together. Both files of one training run carry the same pair id, so a
//! vectorizer and a model from different runs are never loaded together.
//!
//! Saving serializes both artifacts up front, writes each to a temporary file
//! next to its destination and only then renames both into place. A reader
//! never sees a half-written file, and a crash between the two renames is
//! caught at load time by the pair id check.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bincode::Options;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::classifier::{CategoryClassifier, NaiveBayesModel, TfidfVectorizer};

/// Environment variable overriding the default artifact directory.
pub const HOME_ENV_VAR: &str = "COMPLAINT_TRIAGE_HOME";
pub const VECTORIZER_FILE: &str = "vectorizer.bin";
pub const MODEL_FILE: &str = "model.bin";

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Artifact not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] bincode::Error),
    #[error("Unsupported artifact format version {0}")]
    UnsupportedVersion(u32),
    #[error("Expected a {expected} artifact but found a {found} artifact")]
    WrongKind { expected: String, found: String },
    #[error("Digest mismatch: expected {expected}, got {actual} for {file_type} artifact")]
    DigestMismatch {
        file_type: String,
        expected: String,
        actual: String,
    },
    #[error("Artifact pair mismatch: vectorizer {vectorizer} and model {model} come from different training runs")]
    PairMismatch { vectorizer: String, model: String },
    #[error("Vocabulary size {vocabulary} does not match model feature count {features}")]
    DimensionMismatch { vocabulary: usize, features: usize },
    #[error("Vectorizer and model must be stored in different files: {0}")]
    SamePath(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum ArtifactKind {
    Vectorizer,
    Model,
}

impl ArtifactKind {
    fn name(&self) -> &'static str {
        match self {
            Self::Vectorizer => "vectorizer",
            Self::Model => "model",
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    format_version: u32,
    kind: ArtifactKind,
    pair_id: String,
    digest: String,
    payload: Vec<u8>,
}

fn sha256_hex(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    format!("{:x}", hasher.finalize())
}

fn payloads(classifier: &CategoryClassifier) -> Result<(Vec<u8>, Vec<u8>), ArtifactError> {
    let vectorizer = bincode::serialize(classifier.vectorizer())?;
    let model = bincode::serialize(classifier.model())?;
    Ok((vectorizer, model))
}

/// The pair id a classifier's artifacts are saved under.
pub fn pair_id(classifier: &CategoryClassifier) -> Result<String, ArtifactError> {
    let (vectorizer, model) = payloads(classifier)?;
    Ok(sha256_hex(&[vectorizer.as_slice(), model.as_slice()]))
}

/// Writes `bytes` to a uniquely named hidden file next to `path`. The file is
/// removed on drop unless persisted.
fn write_temp(path: &Path, bytes: &[u8]) -> Result<NamedTempFile, ArtifactError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".{}.", file_name))
        .suffix(".tmp")
        .tempfile_in(parent)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    Ok(temp)
}

/// Saves a classifier as an artifact pair and returns its pair id.
pub fn save_pair(
    classifier: &CategoryClassifier,
    vectorizer_path: &Path,
    model_path: &Path,
) -> Result<String, ArtifactError> {
    if vectorizer_path == model_path {
        return Err(ArtifactError::SamePath(vectorizer_path.to_path_buf()));
    }

    let (vectorizer_payload, model_payload) = payloads(classifier)?;
    let pair_id = sha256_hex(&[vectorizer_payload.as_slice(), model_payload.as_slice()]);

    let encode = |kind: ArtifactKind, payload: Vec<u8>| {
        bincode::serialize(&Envelope {
            format_version: FORMAT_VERSION,
            kind,
            pair_id: pair_id.clone(),
            digest: sha256_hex(&[payload.as_slice()]),
            payload,
        })
    };
    let vectorizer_bytes = encode(ArtifactKind::Vectorizer, vectorizer_payload)?;
    let model_bytes = encode(ArtifactKind::Model, model_payload)?;

    let vectorizer_temp = write_temp(vectorizer_path, &vectorizer_bytes)?;
    let model_temp = write_temp(model_path, &model_bytes)?;

    vectorizer_temp
        .persist(vectorizer_path)
        .map_err(|e| ArtifactError::IoError(e.error))?;
    if let Err(e) = model_temp.persist(model_path) {
        error!(
            "Model artifact could not be moved into place; {:?} no longer pairs with a model",
            vectorizer_path
        );
        return Err(ArtifactError::IoError(e.error));
    }

    info!(
        "Saved artifact pair {} to {:?} and {:?}",
        &pair_id[..12],
        vectorizer_path,
        model_path
    );
    Ok(pair_id)
}

fn read_envelope(path: &Path, kind: ArtifactKind) -> Result<Envelope, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::NotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    // Bound allocations by the file size so a corrupt length prefix fails fast.
    let envelope: Envelope = bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
        .with_limit(bytes.len() as u64)
        .deserialize(&bytes)?;

    if envelope.format_version != FORMAT_VERSION {
        return Err(ArtifactError::UnsupportedVersion(envelope.format_version));
    }
    if envelope.kind != kind {
        return Err(ArtifactError::WrongKind {
            expected: kind.name().to_string(),
            found: envelope.kind.name().to_string(),
        });
    }
    let actual = sha256_hex(&[envelope.payload.as_slice()]);
    if actual != envelope.digest {
        return Err(ArtifactError::DigestMismatch {
            file_type: kind.name().to_string(),
            expected: envelope.digest,
            actual,
        });
    }
    Ok(envelope)
}

/// Loads both artifacts together, or fails without a partial result.
pub fn load_pair(vectorizer_path: &Path, model_path: &Path) -> Result<CategoryClassifier, ArtifactError> {
    let result = load_pair_inner(vectorizer_path, model_path);
    if let Err(e) = &result {
        error!("Failed to load artifact pair: {}", e);
    }
    result
}

fn load_pair_inner(vectorizer_path: &Path, model_path: &Path) -> Result<CategoryClassifier, ArtifactError> {
    info!("Loading artifact pair from {:?} and {:?}", vectorizer_path, model_path);
    let vectorizer = read_envelope(vectorizer_path, ArtifactKind::Vectorizer)?;
    let model = read_envelope(model_path, ArtifactKind::Model)?;

    let paired = sha256_hex(&[vectorizer.payload.as_slice(), model.payload.as_slice()]);
    if vectorizer.pair_id != model.pair_id || paired != vectorizer.pair_id {
        return Err(ArtifactError::PairMismatch {
            vectorizer: vectorizer.pair_id,
            model: model.pair_id,
        });
    }

    let fitted_vectorizer: TfidfVectorizer = bincode::deserialize(&vectorizer.payload)?;
    let fitted_model: NaiveBayesModel = bincode::deserialize(&model.payload)?;
    let classifier = CategoryClassifier::from_parts(fitted_vectorizer, fitted_model)?;
    info!("Loaded artifact pair {}", &paired[..12]);
    Ok(classifier)
}

/// Manages an artifact pair stored under one directory.
#[derive(Debug, Clone)]
pub struct ArtifactManager {
    artifacts_dir: PathBuf,
}

impl ArtifactManager {
    /// Creates a new ArtifactManager with the default artifacts directory
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::get_default_artifacts_dir())
    }

    /// Returns the default artifacts directory path
    pub fn get_default_artifacts_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var(HOME_ENV_VAR) {
            return PathBuf::from(path).join("artifacts");
        }

        // 2. Use platform-specific data directory
        if let Some(data_dir) = dirs::data_local_dir() {
            return data_dir.join("complaint-triage").join("artifacts");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".complaint-triage").join("artifacts");
        }

        // 4. If all else fails, use system temp directory
        env::temp_dir().join("complaint-triage").join("artifacts")
    }

    /// Vectorizer and model paths under the default artifacts directory.
    /// Unlike [`ArtifactManager::new_default`], this touches nothing on disk.
    pub fn default_pair_paths() -> (PathBuf, PathBuf) {
        let dir = Self::get_default_artifacts_dir();
        (dir.join(VECTORIZER_FILE), dir.join(MODEL_FILE))
    }

    pub fn new<P: AsRef<Path>>(artifacts_dir: P) -> io::Result<Self> {
        let artifacts_dir = artifacts_dir.as_ref().to_path_buf();
        fs::create_dir_all(&artifacts_dir)?;
        Ok(Self { artifacts_dir })
    }

    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    pub fn get_vectorizer_path(&self) -> PathBuf {
        self.artifacts_dir.join(VECTORIZER_FILE)
    }

    pub fn get_model_path(&self) -> PathBuf {
        self.artifacts_dir.join(MODEL_FILE)
    }

    /// True when both artifact files exist. Says nothing about whether they
    /// pair; use [`ArtifactManager::verify`] for that.
    pub fn is_trained(&self) -> bool {
        self.get_vectorizer_path().exists() && self.get_model_path().exists()
    }

    pub fn save(&self, classifier: &CategoryClassifier) -> Result<String, ArtifactError> {
        save_pair(classifier, &self.get_vectorizer_path(), &self.get_model_path())
    }

    pub fn load(&self) -> Result<CategoryClassifier, ArtifactError> {
        load_pair(&self.get_vectorizer_path(), &self.get_model_path())
    }

    /// Checks that both files exist, are intact and belong to the same
    /// training run.
    pub fn verify(&self) -> Result<bool, ArtifactError> {
        if !self.is_trained() {
            info!("One or both artifact files do not exist");
            return Ok(false);
        }
        match load_pair_inner(&self.get_vectorizer_path(), &self.get_model_path()) {
            Ok(_) => Ok(true),
            Err(ArtifactError::IoError(e)) => Err(ArtifactError::IoError(e)),
            Err(e) => {
                warn!("Artifact verification failed: {}", e);
                Ok(false)
            }
        }
    }

    pub fn remove_artifacts(&self) -> Result<(), ArtifactError> {
        for path in [self.get_vectorizer_path(), self.get_model_path()] {
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_artifacts_dir() {
        env::set_var(HOME_ENV_VAR, "/tmp/test-complaint-triage");
        let path = ArtifactManager::get_default_artifacts_dir();
        assert!(path.ends_with("test-complaint-triage/artifacts"));
        env::remove_var(HOME_ENV_VAR);

        let path = ArtifactManager::get_default_artifacts_dir();
        assert!(path.to_string_lossy().contains("complaint-triage"));
    }

    #[test]
    fn test_digest_is_stable() {
        assert_eq!(sha256_hex(&[&b"ab"[..], &b"c"[..]]), sha256_hex(&[&b"abc"[..]]));
        assert_eq!(
            sha256_hex(&[&b""[..]]),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
