// Model artifact persistence
// Three named blobs (vectorizer, classifier, label encoder) behind a store trait

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::errors::ModelError;

pub const VECTORIZER_ARTIFACT: &str = "vectorizer.json";
pub const CLASSIFIER_ARTIFACT: &str = "classifier.json";
pub const LABEL_ENCODER_ARTIFACT: &str = "label_encoder.json";

/// Version of the persistence format
pub const FORMAT_VERSION: u32 = 1;

/// Metadata saved alongside the classifier weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub format_version: u32,
    /// Timestamp of training
    pub trained_at: String,
    /// SHA-256 of the dataset file, when trained from one
    pub dataset_sha256: Option<String>,
    pub n_samples: usize,
    pub n_train: usize,
    pub n_test: usize,
    /// Held-out accuracy, absent when the test split was empty
    pub accuracy: Option<f64>,
    /// Whether the served weights were refit on every sample
    pub fit_on_full: bool,
}

impl ModelMetadata {
    pub fn new(n_samples: usize, n_train: usize, n_test: usize) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            trained_at: chrono::Utc::now().to_rfc3339(),
            dataset_sha256: None,
            n_samples,
            n_train,
            n_test,
            accuracy: None,
            fit_on_full: false,
        }
    }
}

/// Storage for opaque model blobs
pub trait ArtifactStore: Send + Sync {
    /// Read one blob; absent blobs are `ModelError::MissingArtifact`
    fn read(&self, name: &str) -> Result<Vec<u8>, ModelError>;

    /// Write a set of blobs together
    fn write_all(&self, blobs: &[(&str, Vec<u8>)]) -> Result<(), ModelError>;

    /// Where the blobs live (for log messages)
    fn location(&self) -> String;
}

/// Artifacts as files in one directory
///
/// Writes take an exclusive lock on `.lock` in the directory and replace
/// each file atomically (write to temp, then rename), so a concurrent
/// reader sees either the old or the new blob.
pub struct DirArtifactStore {
    dir: PathBuf,
}

impl DirArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Check if all three artifacts exist
    pub fn exists(&self) -> bool {
        [VECTORIZER_ARTIFACT, CLASSIFIER_ARTIFACT, LABEL_ENCODER_ARTIFACT]
            .iter()
            .all(|name| self.dir.join(name).exists())
    }

    fn lock_file(&self) -> Result<fs::File, ModelError> {
        fs::create_dir_all(&self.dir)?;
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.dir.join(".lock"))?;
        Ok(file)
    }
}

impl ArtifactStore for DirArtifactStore {
    fn read(&self, name: &str) -> Result<Vec<u8>, ModelError> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Err(ModelError::MissingArtifact(name.to_string()));
        }

        let lock = self.lock_file()?;
        lock.lock_shared()?;
        let result = fs::read(&path);
        lock.unlock()?;

        match result {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ModelError::MissingArtifact(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, blobs: &[(&str, Vec<u8>)]) -> Result<(), ModelError> {
        let lock = self.lock_file()?;
        lock.lock_exclusive()?;

        for (name, bytes) in blobs {
            let path = self.dir.join(name);
            let temp_path = path.with_extension("tmp");
            fs::write(&temp_path, bytes)?;
            fs::rename(&temp_path, &path)?;
        }

        lock.unlock()?;
        tracing::debug!(dir = %self.dir.display(), count = blobs.len(), "Wrote model artifacts");
        Ok(())
    }

    fn location(&self) -> String {
        self.dir.display().to_string()
    }
}

/// In-memory artifacts, for tests and ephemeral runs
#[derive(Default)]
pub struct MemoryArtifactStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove(&self, name: &str) -> bool {
        let mut blobs = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        blobs.remove(name).is_some()
    }

    pub fn insert(&self, name: &str, bytes: Vec<u8>) {
        let mut blobs = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        blobs.insert(name.to_string(), bytes);
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn read(&self, name: &str) -> Result<Vec<u8>, ModelError> {
        let blobs = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        blobs
            .get(name)
            .cloned()
            .ok_or_else(|| ModelError::MissingArtifact(name.to_string()))
    }

    fn write_all(&self, blobs: &[(&str, Vec<u8>)]) -> Result<(), ModelError> {
        let mut stored = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        for (name, bytes) in blobs {
            stored.insert(name.to_string(), bytes.clone());
        }
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_metadata_serialization() {
        let mut metadata = ModelMetadata::new(100, 80, 20);
        metadata.accuracy = Some(0.75);

        let json = serde_json::to_string(&metadata).unwrap();
        let deserialized: ModelMetadata = serde_json::from_str(&json).unwrap();

        assert_eq!(metadata, deserialized);
        assert_eq!(deserialized.format_version, FORMAT_VERSION);
    }

    #[test]
    fn test_dir_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = DirArtifactStore::new(temp_dir.path().join("models"));

        assert!(!store.exists());
        assert!(matches!(
            store.read(VECTORIZER_ARTIFACT),
            Err(ModelError::MissingArtifact(_))
        ));

        store
            .write_all(&[
                (VECTORIZER_ARTIFACT, b"v".to_vec()),
                (CLASSIFIER_ARTIFACT, b"c".to_vec()),
                (LABEL_ENCODER_ARTIFACT, b"l".to_vec()),
            ])
            .unwrap();

        assert!(store.exists());
        assert_eq!(store.read(CLASSIFIER_ARTIFACT).unwrap(), b"c".to_vec());
        assert!(!store.dir().join("classifier.tmp").exists());
    }

    #[test]
    fn test_memory_store_missing() {
        let store = MemoryArtifactStore::new();
        store.insert("a", vec![1, 2]);
        assert_eq!(store.read("a").unwrap(), vec![1, 2]);
        assert!(store.remove("a"));
        assert!(matches!(store.read("a"), Err(ModelError::MissingArtifact(_))));
    }
}
