// Error types for the analysis pipeline
//
// Session-state failures are surfaced to the caller as distinct variants.
// Classifier input and availability failures are recovered inside the
// pipeline (fallback analysis); invariant violations are not.

use thiserror::Error;

/// Errors returned across the pipeline boundary
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("No conversation data to analyze in session {0}")]
    NoDataToAnalyze(String),

    #[error("Session {0} has already ended")]
    SessionEnded(String),

    #[error("Maximum session limit reached ({active}/{max})")]
    SessionLimit { active: usize, max: usize },

    #[error("Invariant violated: {0}")]
    Invariant(String),
}

/// Errors from a single classification call
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Input text is empty after normalization")]
    EmptyInput,

    #[error("State classifier is not initialized")]
    ModelUnavailable,

    #[error("Classifier produced an invalid result: {0}")]
    Invariant(String),
}

/// Errors from training, loading or persisting model artifacts
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Artifact '{0}' is missing")]
    MissingArtifact(String),

    #[error("Artifact '{name}' is corrupt: {reason}")]
    CorruptArtifact { name: String, reason: String },

    #[error("Unknown state label '{0}'")]
    UnknownLabel(String),

    #[error("Dataset is missing required column '{0}'")]
    MissingColumn(String),

    #[error("Training dataset is empty after filtering")]
    EmptyDataset,

    #[error("Vocabulary is empty after document-frequency filtering")]
    EmptyVocabulary,

    #[error("Training needs at least two labels, found {0}")]
    TooFewClasses(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Dataset error: {0}")]
    Csv(#[from] csv::Error),
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Format a degraded-classifier notice with the steps that restore it
pub fn model_unavailable_message(model_dir: &str) -> String {
    format!(
        "State classifier unavailable; analyses will use the fallback result\n\n\
        \x1b[1;33mPossible causes:\x1b[0m\n\
        • No trained artifacts in {}\n\
        • No training dataset configured\n\
        • Artifacts written by an incompatible version\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Train from a labeled CSV (statement,status):\n\
           \x1b[36mmindguard train --dataset path/to/data.csv --force\x1b[0m\n\n\
        2. Or point the config at a dataset:\n\
           \x1b[36mexport MINDGUARD_DATASET=path/to/data.csv\x1b[0m",
        model_dir
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_errors_are_distinguishable() {
        let not_found = PipelineError::SessionNotFound("abc".into());
        let no_data = PipelineError::NoDataToAnalyze("abc".into());

        assert!(matches!(not_found, PipelineError::SessionNotFound(_)));
        assert!(matches!(no_data, PipelineError::NoDataToAnalyze(_)));
        assert!(not_found.to_string().contains("not found"));
        assert!(no_data.to_string().contains("No conversation data"));
    }

    #[test]
    fn test_model_unavailable_message_has_train_hint() {
        let msg = model_unavailable_message("/tmp/models");
        assert!(msg.contains("mindguard train"));
        assert!(msg.contains("/tmp/models"));
    }
}
