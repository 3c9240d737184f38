// State classifier
// Loads persisted artifacts once, retraining from the dataset if they are unusable

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::labels::{LabelEncoder, StateLabel};
use super::persistence::{
    ArtifactStore, ModelMetadata, CLASSIFIER_ARTIFACT, LABEL_ENCODER_ARTIFACT,
    VECTORIZER_ARTIFACT,
};
use super::softmax::SoftmaxClassifier;
use super::tfidf::TfidfVectorizer;
use crate::config::TrainingConfig;
use crate::errors::{ClassifyError, ModelError};
use crate::training::{train_model, TrainingDataset};

const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Predicted label with its probability and the full distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub predicted_state: StateLabel,
    pub confidence: f64,
    pub state_probabilities: BTreeMap<StateLabel, f64>,
}

impl ClassificationResult {
    /// Result used when the classifier cannot run
    pub fn fallback() -> Self {
        let state_probabilities = BTreeMap::from([
            (StateLabel::Normal, 0.5),
            (StateLabel::Depression, 0.2),
            (StateLabel::Anxiety, 0.2),
            (StateLabel::Bipolar, 0.05),
            (StateLabel::Suicidal, 0.05),
        ]);
        Self {
            predicted_state: StateLabel::Normal,
            confidence: 0.5,
            state_probabilities,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ClassifierArtifact {
    metadata: ModelMetadata,
    model: SoftmaxClassifier,
}

#[derive(Serialize, Deserialize)]
struct LabelEncoderArtifact {
    classes: Vec<String>,
}

/// Fitted vectorizer, weights and label encoding
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub vectorizer: TfidfVectorizer,
    pub classifier: SoftmaxClassifier,
    pub encoder: LabelEncoder,
    pub metadata: ModelMetadata,
}

impl TrainedModel {
    /// Load all three artifacts, checking they agree on shapes
    pub fn load(store: &dyn ArtifactStore) -> Result<Self, ModelError> {
        let vectorizer: TfidfVectorizer = decode(store, VECTORIZER_ARTIFACT)?;
        let artifact: ClassifierArtifact = decode(store, CLASSIFIER_ARTIFACT)?;
        let labels: LabelEncoderArtifact = decode(store, LABEL_ENCODER_ARTIFACT)?;
        let encoder = LabelEncoder::from_names(&labels.classes)?;

        let corrupt = |name: &str, reason: String| ModelError::CorruptArtifact {
            name: name.to_string(),
            reason,
        };

        vectorizer
            .validate()
            .map_err(|reason| corrupt(VECTORIZER_ARTIFACT, reason))?;
        if artifact.model.n_features() != vectorizer.n_features() {
            return Err(corrupt(
                CLASSIFIER_ARTIFACT,
                format!(
                    "{} weight columns for {} features",
                    artifact.model.n_features(),
                    vectorizer.n_features()
                ),
            ));
        }
        if artifact.model.n_classes() != encoder.len() {
            return Err(corrupt(
                LABEL_ENCODER_ARTIFACT,
                format!(
                    "{} classes for {} weight rows",
                    encoder.len(),
                    artifact.model.n_classes()
                ),
            ));
        }

        Ok(Self {
            vectorizer,
            classifier: artifact.model,
            encoder,
            metadata: artifact.metadata,
        })
    }

    /// Persist as three blobs
    pub fn save(&self, store: &dyn ArtifactStore) -> Result<(), ModelError> {
        let artifact = ClassifierArtifact {
            metadata: self.metadata.clone(),
            model: self.classifier.clone(),
        };
        let labels = LabelEncoderArtifact {
            classes: self.encoder.names(),
        };

        store.write_all(&[
            (VECTORIZER_ARTIFACT, serde_json::to_vec(&self.vectorizer)?),
            (CLASSIFIER_ARTIFACT, serde_json::to_vec(&artifact)?),
            (LABEL_ENCODER_ARTIFACT, serde_json::to_vec(&labels)?),
        ])?;

        tracing::info!(location = %store.location(), "Saved state classifier");
        Ok(())
    }

    /// Classify already-normalized text
    pub fn predict(&self, normalized: &str) -> Result<ClassificationResult, ClassifyError> {
        if normalized.trim().is_empty() {
            return Err(ClassifyError::EmptyInput);
        }

        let row = self.vectorizer.transform(normalized);
        let proba = self.classifier.predict_proba(&row);

        if proba.len() != self.encoder.len() {
            return Err(ClassifyError::Invariant(format!(
                "{} probabilities for {} classes",
                proba.len(),
                self.encoder.len()
            )));
        }
        if proba.iter().any(|p| !p.is_finite()) {
            return Err(ClassifyError::Invariant("non-finite probability".into()));
        }
        let total: f64 = proba.sum();
        if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(ClassifyError::Invariant(format!(
                "probabilities sum to {}",
                total
            )));
        }

        // First maximum wins, so ties resolve to the earlier encoded class
        let mut best = 0;
        for (index, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = index;
            }
        }

        let predicted_state = self.encoder.decode(best).ok_or_else(|| {
            ClassifyError::Invariant(format!("class index {} has no label", best))
        })?;

        let mut state_probabilities: BTreeMap<StateLabel, f64> =
            StateLabel::ALL.iter().map(|label| (*label, 0.0)).collect();
        for (index, p) in proba.iter().enumerate() {
            if let Some(label) = self.encoder.decode(index) {
                state_probabilities.insert(label, *p);
            }
        }

        Ok(ClassificationResult {
            predicted_state,
            confidence: proba[best],
            state_probabilities,
        })
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    store: &dyn ArtifactStore,
    name: &str,
) -> Result<T, ModelError> {
    let bytes = store.read(name)?;
    serde_json::from_slice(&bytes).map_err(|e| ModelError::CorruptArtifact {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

/// Read-only classifier handle shared by every request
///
/// An uninitialized classifier is a valid state: every call reports
/// `ModelUnavailable` and the pipeline falls back.
#[derive(Debug, Clone, Default)]
pub struct StateClassifier {
    model: Option<TrainedModel>,
}

impl StateClassifier {
    pub fn uninitialized() -> Self {
        Self { model: None }
    }

    pub fn from_model(model: TrainedModel) -> Self {
        Self { model: Some(model) }
    }

    /// Load artifacts, or retrain and persist them
    ///
    /// Runs once before serving. Failures are logged and leave the
    /// classifier uninitialized rather than aborting the host process.
    pub fn initialize(
        store: &dyn ArtifactStore,
        dataset_path: Option<&Path>,
        config: &TrainingConfig,
    ) -> Self {
        match TrainedModel::load(store) {
            Ok(model) => {
                tracing::info!(
                    location = %store.location(),
                    classes = model.encoder.len(),
                    features = model.vectorizer.n_features(),
                    "Loaded state classifier"
                );
                return Self::from_model(model);
            }
            Err(e) => {
                tracing::info!(error = %e, "No usable classifier artifacts, retraining");
            }
        }

        let Some(path) = dataset_path else {
            tracing::error!("No training dataset configured; state classifier unavailable");
            return Self::uninitialized();
        };

        match Self::retrain(store, path, config) {
            Ok(model) => Self::from_model(model),
            Err(e) => {
                tracing::error!(error = %e, dataset = %path.display(), "Failed to train state classifier");
                Self::uninitialized()
            }
        }
    }

    fn retrain(
        store: &dyn ArtifactStore,
        path: &Path,
        config: &TrainingConfig,
    ) -> Result<TrainedModel, ModelError> {
        let dataset = TrainingDataset::load_csv(path)?;
        let outcome = train_model(&dataset, config)?;
        if let Err(e) = outcome.model.save(store) {
            // Serving can continue from memory
            tracing::warn!(error = %e, "Failed to persist trained classifier");
        }
        Ok(outcome.model)
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    pub fn metadata(&self) -> Option<&ModelMetadata> {
        self.model.as_ref().map(|m| &m.metadata)
    }

    pub fn classify(&self, normalized: &str) -> Result<ClassificationResult, ClassifyError> {
        let model = self.model.as_ref().ok_or(ClassifyError::ModelUnavailable)?;
        model.predict(normalized)
    }
}
