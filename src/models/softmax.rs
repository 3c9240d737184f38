// Multinomial logistic regression over sparse tf-idf rows

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::tfidf::SparseVector;

/// SGD hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SgdConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    /// L2 penalty, applied as weight decay once per epoch
    pub l2: f64,
    pub seed: u64,
}

impl Default for SgdConfig {
    fn default() -> Self {
        Self {
            epochs: 30,
            learning_rate: 0.5,
            l2: 1e-4,
            seed: 42,
        }
    }
}

/// Linear softmax classifier, one weight row per class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftmaxClassifier {
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl SoftmaxClassifier {
    pub fn zeros(n_classes: usize, n_features: usize) -> Self {
        Self {
            weights: Array2::zeros((n_classes, n_features)),
            bias: Array1::zeros(n_classes),
        }
    }

    /// Train with balanced class weights
    ///
    /// Each sample's gradient is scaled by `n_samples / (n_classes * count)`
    /// for its class so minority labels carry equal total weight.
    pub fn fit(
        rows: &[SparseVector],
        targets: &[usize],
        n_classes: usize,
        n_features: usize,
        config: &SgdConfig,
    ) -> Self {
        let mut model = Self::zeros(n_classes, n_features);
        if rows.is_empty() || n_classes == 0 {
            return model;
        }

        let mut counts = vec![0usize; n_classes];
        for &target in targets {
            counts[target] += 1;
        }
        let class_weight: Vec<f64> = counts
            .iter()
            .map(|&c| {
                if c == 0 {
                    0.0
                } else {
                    rows.len() as f64 / (n_classes as f64 * c as f64)
                }
            })
            .collect();

        let mut order: Vec<usize> = (0..rows.len()).collect();
        let mut rng = StdRng::seed_from_u64(config.seed);

        for epoch in 0..config.epochs {
            let lr = config.learning_rate / (1.0 + 0.1 * epoch as f64);
            order.shuffle(&mut rng);

            for &i in &order {
                let row = &rows[i];
                let target = targets[i];
                let proba = model.predict_proba(row);
                let sample_weight = class_weight[target];

                for class in 0..n_classes {
                    let indicator = if class == target { 1.0 } else { 0.0 };
                    let grad = sample_weight * (proba[class] - indicator);
                    if grad == 0.0 {
                        continue;
                    }
                    model.bias[class] -= lr * grad;
                    for &(feature, value) in row {
                        model.weights[[class, feature]] -= lr * grad * value;
                    }
                }
            }

            if config.l2 > 0.0 {
                model.weights *= 1.0 - lr * config.l2;
            }
        }

        model
    }

    /// Raw per-class scores
    pub fn decision(&self, row: &SparseVector) -> Array1<f64> {
        let mut scores = self.bias.clone();
        for (class, score) in scores.iter_mut().enumerate() {
            for &(feature, value) in row {
                if let Some(w) = self.weights.get([class, feature]) {
                    *score += w * value;
                }
            }
        }
        scores
    }

    /// Softmax over the decision scores
    pub fn predict_proba(&self, row: &SparseVector) -> Array1<f64> {
        let scores = self.decision(row);
        let max = scores.fold(f64::NEG_INFINITY, |acc, &s| acc.max(s));
        let exp = scores.mapv(|s| (s - max).exp());
        let total = exp.sum();
        exp / total
    }

    pub fn n_classes(&self) -> usize {
        self.bias.len()
    }

    pub fn n_features(&self) -> usize {
        self.weights.ncols()
    }
}
