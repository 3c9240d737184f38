// Training module - Dataset loading, stratified split and model fitting

pub mod dataset;
pub mod trainer;

pub use dataset::{LabeledStatement, TrainingDataset};
pub use trainer::{evaluate, train_model, EvaluationReport, LabelMetrics, TrainingOutcome};
