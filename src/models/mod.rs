// State classification models
// TF-IDF features into a softmax classifier, persisted as three artifacts

pub mod classifier;
pub mod labels;
pub mod persistence;
pub mod softmax;
mod stop_words;
pub mod tfidf;

pub use classifier::{ClassificationResult, StateClassifier, TrainedModel};
pub use labels::{LabelEncoder, StateLabel};
pub use persistence::{
    ArtifactStore, DirArtifactStore, MemoryArtifactStore, ModelMetadata, CLASSIFIER_ARTIFACT,
    LABEL_ENCODER_ARTIFACT, VECTORIZER_ARTIFACT,
};
pub use softmax::{SgdConfig, SoftmaxClassifier};
pub use tfidf::{SparseVector, TfidfVectorizer, VectorizerConfig};
