// Labeled statement dataset

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::errors::ModelError;
use crate::models::StateLabel;
use crate::text::normalize;

const STATEMENT_COLUMN: &str = "statement";
const STATUS_COLUMN: &str = "status";

/// One training row, text already normalized
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledStatement {
    pub text: String,
    pub label: StateLabel,
}

#[derive(Debug, Clone, Default)]
pub struct TrainingDataset {
    pub samples: Vec<LabeledStatement>,
    /// Rows dropped for a missing field, unknown label or empty text
    pub dropped: usize,
    pub sha256: Option<String>,
}

impl TrainingDataset {
    /// Build from raw (statement, status) pairs
    ///
    /// Keeps rows whose status is one of the five labels and whose
    /// statement is non-empty after normalization.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (Option<String>, Option<String>)>,
    {
        let mut dataset = Self::default();

        for (statement, status) in rows {
            let (Some(statement), Some(status)) = (statement, status) else {
                dataset.dropped += 1;
                continue;
            };
            let Ok(label) = status.parse::<StateLabel>() else {
                dataset.dropped += 1;
                continue;
            };
            let text = normalize(&statement);
            if text.is_empty() {
                dataset.dropped += 1;
                continue;
            }
            dataset.samples.push(LabeledStatement { text, label });
        }

        dataset
    }

    /// Load a CSV with `statement` and `status` columns
    pub fn load_csv(path: &Path) -> Result<Self, ModelError> {
        let bytes = fs::read(path)?;
        let digest = format!("{:x}", Sha256::digest(&bytes));

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(bytes.as_slice());
        let headers = reader.headers()?.clone();

        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| ModelError::MissingColumn(name.to_string()))
        };
        let statement_idx = column(STATEMENT_COLUMN)?;
        let status_idx = column(STATUS_COLUMN)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let field = |idx: usize| {
                record
                    .get(idx)
                    .filter(|v| !v.trim().is_empty())
                    .map(str::to_string)
            };
            rows.push((field(statement_idx), field(status_idx)));
        }

        let mut dataset = Self::from_rows(rows);
        dataset.sha256 = Some(digest);

        tracing::info!(
            path = %path.display(),
            samples = dataset.samples.len(),
            dropped = dataset.dropped,
            "Loaded training dataset"
        );
        for (label, count) in dataset.label_counts() {
            tracing::debug!(label = %label, count, "Label distribution");
        }

        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn label_counts(&self) -> BTreeMap<StateLabel, usize> {
        let mut counts = BTreeMap::new();
        for sample in &self.samples {
            *counts.entry(sample.label).or_insert(0) += 1;
        }
        counts
    }

    /// Seeded stratified split into (train, test) sample indices
    ///
    /// Each label contributes `round(count * test_fraction)` samples to the
    /// test side, always leaving at least one for training.
    pub fn stratified_split(&self, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
        let mut by_label: BTreeMap<StateLabel, Vec<usize>> = BTreeMap::new();
        for (index, sample) in self.samples.iter().enumerate() {
            by_label.entry(sample.label).or_default().push(index);
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut train = Vec::new();
        let mut test = Vec::new();

        for (_, mut indices) in by_label {
            indices.shuffle(&mut rng);
            let wanted = (indices.len() as f64 * test_fraction.clamp(0.0, 1.0)).round() as usize;
            let n_test = wanted.min(indices.len().saturating_sub(1));
            test.extend_from_slice(&indices[..n_test]);
            train.extend_from_slice(&indices[n_test..]);
        }

        train.sort_unstable();
        test.sort_unstable();
        (train, test)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn row(statement: &str, status: &str) -> (Option<String>, Option<String>) {
        (Some(statement.to_string()), Some(status.to_string()))
    }

    #[test]
    fn test_filters_rows() {
        let dataset = TrainingDataset::from_rows(vec![
            row("I feel great today!", "Normal"),
            row("12345 ###", "Normal"),
            row("work is stressful", "Stress"),
            (None, Some("Anxiety".to_string())),
            (Some("so alone".to_string()), None),
            row("Everything is Hopeless", "Depression"),
        ]);

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.dropped, 4);
        assert_eq!(dataset.samples[0].text, "i feel great today!");
        assert_eq!(dataset.samples[1].label, StateLabel::Depression);
    }

    #[test]
    fn test_load_csv_with_index_column() {
        let file = NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            ",statement,status\n\
             0,\"I can't stop worrying, my heart races\",Anxiety\n\
             1,,Normal\n\
             2,Just a regular day,Normal\n",
        )
        .unwrap();

        let dataset = TrainingDataset::load_csv(file.path()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.dropped, 1);
        assert_eq!(dataset.sha256.as_ref().map(|s| s.len()), Some(64));
        assert_eq!(dataset.samples[0].text, "i cant stop worrying, my heart races");
    }

    #[test]
    fn test_load_csv_missing_column() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "text,label\nhello,Normal\n").unwrap();
        assert!(matches!(
            TrainingDataset::load_csv(file.path()),
            Err(ModelError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_stratified_split_keeps_proportions() {
        let mut rows = Vec::new();
        for i in 0..10 {
            rows.push(row(&format!("normal sample {}", "x".repeat(i + 1)), "Normal"));
        }
        for i in 0..5 {
            rows.push(row(&format!("anxious sample {}", "y".repeat(i + 1)), "Anxiety"));
        }
        rows.push(row("lonely single", "Bipolar"));
        let dataset = TrainingDataset::from_rows(rows);

        let (train, test) = dataset.stratified_split(0.2, 42);
        assert_eq!(train.len() + test.len(), dataset.len());

        let test_labels: Vec<StateLabel> = test.iter().map(|&i| dataset.samples[i].label).collect();
        assert_eq!(test_labels.iter().filter(|l| **l == StateLabel::Normal).count(), 2);
        assert_eq!(test_labels.iter().filter(|l| **l == StateLabel::Anxiety).count(), 1);
        // A single-sample label stays on the training side
        assert!(!test_labels.contains(&StateLabel::Bipolar));

        assert_eq!(dataset.stratified_split(0.2, 42), (train, test));
    }
}
