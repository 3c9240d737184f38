// Offline training of the state classifier

use serde::Serialize;
use std::fmt;

use super::dataset::TrainingDataset;
use crate::config::TrainingConfig;
use crate::errors::ModelError;
use crate::models::{
    LabelEncoder, ModelMetadata, SoftmaxClassifier, SparseVector, StateLabel, TfidfVectorizer,
    TrainedModel,
};

/// Precision, recall and F1 for one label on the test split
#[derive(Debug, Clone, Serialize)]
pub struct LabelMetrics {
    pub label: StateLabel,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Held-out evaluation of a trained model
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub accuracy: f64,
    pub per_label: Vec<LabelMetrics>,
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>12} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1", "support")?;
        for m in &self.per_label {
            writeln!(
                f,
                "{:>12} {:>9.3} {:>9.3} {:>9.3} {:>9}",
                m.label.as_str(),
                m.precision,
                m.recall,
                m.f1,
                m.support
            )?;
        }
        write!(f, "{:>12} {:>9.3}", "accuracy", self.accuracy)
    }
}

pub struct TrainingOutcome {
    pub model: TrainedModel,
    /// Absent when the test split was empty
    pub report: Option<EvaluationReport>,
}

/// Train the served model from a dataset
///
/// The vectorizer and label encoder are fit on every sample. The classifier
/// is fit on the stratified training split and evaluated on the held-out
/// split; with `refit_on_full` it is then refit on every sample before
/// being returned.
pub fn train_model(
    dataset: &TrainingDataset,
    config: &TrainingConfig,
) -> Result<TrainingOutcome, ModelError> {
    if dataset.is_empty() {
        return Err(ModelError::EmptyDataset);
    }

    let labels: Vec<StateLabel> = dataset.samples.iter().map(|s| s.label).collect();
    let encoder = LabelEncoder::fit(labels.iter());
    if encoder.len() < 2 {
        return Err(ModelError::TooFewClasses(encoder.len()));
    }

    let docs: Vec<&str> = dataset.samples.iter().map(|s| s.text.as_str()).collect();
    let vectorizer = TfidfVectorizer::fit(config.vectorizer(), &docs)?;

    let rows: Vec<SparseVector> = docs.iter().map(|doc| vectorizer.transform(doc)).collect();
    let targets: Vec<usize> = labels
        .iter()
        .map(|label| encoder.encode(*label).unwrap_or_default())
        .collect();

    let (train_idx, test_idx) = dataset.stratified_split(config.test_fraction, config.seed);
    let pick = |indices: &[usize]| -> (Vec<SparseVector>, Vec<usize>) {
        indices
            .iter()
            .map(|&i| (rows[i].clone(), targets[i]))
            .unzip()
    };
    let (train_rows, train_targets) = pick(&train_idx);
    let (test_rows, test_targets) = pick(&test_idx);

    tracing::info!(
        samples = dataset.len(),
        train = train_rows.len(),
        test = test_rows.len(),
        features = vectorizer.n_features(),
        classes = encoder.len(),
        "Training state classifier"
    );

    let sgd = config.sgd();
    let mut classifier = SoftmaxClassifier::fit(
        &train_rows,
        &train_targets,
        encoder.len(),
        vectorizer.n_features(),
        &sgd,
    );

    let report = if test_rows.is_empty() {
        None
    } else {
        Some(evaluate(&classifier, &encoder, &test_rows, &test_targets))
    };

    if let Some(report) = &report {
        tracing::info!(accuracy = report.accuracy, "Model trained");
        tracing::info!("Classification report:\n{}", report);
    }

    if config.refit_on_full {
        classifier = SoftmaxClassifier::fit(
            &rows,
            &targets,
            encoder.len(),
            vectorizer.n_features(),
            &sgd,
        );
    }

    let mut metadata = ModelMetadata::new(dataset.len(), train_rows.len(), test_rows.len());
    metadata.dataset_sha256 = dataset.sha256.clone();
    metadata.accuracy = report.as_ref().map(|r| r.accuracy);
    metadata.fit_on_full = config.refit_on_full;

    Ok(TrainingOutcome {
        model: TrainedModel {
            vectorizer,
            classifier,
            encoder,
            metadata,
        },
        report,
    })
}

/// Accuracy and per-label metrics on a labeled split
pub fn evaluate(
    classifier: &SoftmaxClassifier,
    encoder: &LabelEncoder,
    rows: &[SparseVector],
    targets: &[usize],
) -> EvaluationReport {
    let n_classes = encoder.len();
    let mut true_pos = vec![0usize; n_classes];
    let mut predicted = vec![0usize; n_classes];
    let mut support = vec![0usize; n_classes];
    let mut correct = 0;

    for (row, &target) in rows.iter().zip(targets) {
        let proba = classifier.predict_proba(row);
        let mut best = 0;
        for (index, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = index;
            }
        }

        support[target] += 1;
        predicted[best] += 1;
        if best == target {
            true_pos[target] += 1;
            correct += 1;
        }
    }

    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };

    let per_label = encoder
        .classes()
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let precision = ratio(true_pos[i], predicted[i]);
            let recall = ratio(true_pos[i], support[i]);
            let f1 = if precision + recall == 0.0 {
                0.0
            } else {
                2.0 * precision * recall / (precision + recall)
            };
            LabelMetrics {
                label: *label,
                precision,
                recall,
                f1,
                support: support[i],
            }
        })
        .collect();

    EvaluationReport {
        accuracy: ratio(correct, rows.len()),
        per_label,
    }
}
