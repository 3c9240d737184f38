// Configuration structs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::{SgdConfig, VectorizerConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the three classifier artifacts
    pub model_dir: PathBuf,

    /// Labeled CSV used when artifacts are missing
    pub dataset_path: Option<PathBuf>,

    /// JSON keyword catalog replacing the built-in one
    pub keywords_path: Option<PathBuf>,

    pub sessions: SessionConfig,

    pub training: TrainingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_dir: mindguard_dir().join("models"),
            dataset_path: None,
            keywords_path: None,
            sessions: SessionConfig::default(),
            training: TrainingConfig::default(),
        }
    }
}

/// `~/.mindguard`, or `./.mindguard` when there is no home directory
pub fn mindguard_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mindguard")
}

/// Session registry capacity and eviction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum number of sessions held in memory
    pub max_sessions: usize,
    /// Active sessions idle this long are evicted
    pub idle_timeout_minutes: u64,
    /// Ended sessions (and their cached reports) are kept this long
    pub ended_retention_minutes: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: 1000,
            idle_timeout_minutes: 120,
            ended_retention_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub max_features: usize,
    pub min_df: usize,
    pub max_df: f64,
    pub ngram_max: usize,
    pub stem: bool,
    pub epochs: usize,
    pub learning_rate: f64,
    pub l2: f64,
    pub test_fraction: f64,
    pub seed: u64,
    /// Refit the served classifier on every sample after evaluation
    pub refit_on_full: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        let vectorizer = VectorizerConfig::default();
        let sgd = SgdConfig::default();
        Self {
            max_features: vectorizer.max_features,
            min_df: vectorizer.min_df,
            max_df: vectorizer.max_df,
            ngram_max: vectorizer.ngram_max,
            stem: vectorizer.stem,
            epochs: sgd.epochs,
            learning_rate: sgd.learning_rate,
            l2: sgd.l2,
            test_fraction: 0.2,
            seed: sgd.seed,
            refit_on_full: false,
        }
    }
}

impl TrainingConfig {
    pub fn vectorizer(&self) -> VectorizerConfig {
        VectorizerConfig {
            max_features: self.max_features,
            min_df: self.min_df,
            max_df: self.max_df,
            ngram_max: self.ngram_max,
            stem: self.stem,
        }
    }

    pub fn sgd(&self) -> SgdConfig {
        SgdConfig {
            epochs: self.epochs,
            learning_rate: self.learning_rate,
            l2: self.l2,
            seed: self.seed,
        }
    }
}
