// TF-IDF vectorizer over word unigrams and bigrams

use once_cell::sync::Lazy;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::stop_words::is_stop_word;
use crate::errors::ModelError;

/// Tokens are runs of two or more word characters
static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("static pattern compiles"));

static STEMMER: Lazy<Stemmer> = Lazy::new(|| Stemmer::create(Algorithm::English));

/// Sparse feature row: (feature index, value), sorted by index
pub type SparseVector = Vec<(usize, f64)>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    pub max_features: usize,
    /// Minimum number of documents a term must appear in
    pub min_df: usize,
    /// Maximum fraction of documents a term may appear in
    pub max_df: f64,
    pub ngram_max: usize,
    pub stem: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: 10_000,
            min_df: 2,
            max_df: 0.95,
            ngram_max: 2,
            stem: false,
        }
    }
}

/// Fitted vocabulary and inverse document frequencies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    config: VectorizerConfig,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fit on a corpus of normalized documents
    ///
    /// Terms are kept when `min_df <= df <= max_df * n_docs`, then the
    /// `max_features` most frequent (by total count, ties alphabetical)
    /// survive. Feature indices follow alphabetical term order.
    pub fn fit<S: AsRef<str>>(config: VectorizerConfig, docs: &[S]) -> Result<Self, ModelError> {
        let n_docs = docs.len();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        let mut term_freq: HashMap<String, usize> = HashMap::new();

        for doc in docs {
            for (term, count) in count_terms(&config, doc.as_ref()) {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
                *term_freq.entry(term).or_insert(0) += count;
            }
        }

        let max_doc_count = config.max_df * n_docs as f64;
        let mut kept: Vec<(String, usize)> = term_freq
            .into_iter()
            .filter(|(term, _)| {
                let df = doc_freq.get(term).copied().unwrap_or(0);
                df >= config.min_df && df as f64 <= max_doc_count
            })
            .collect();

        if kept.is_empty() {
            return Err(ModelError::EmptyVocabulary);
        }

        kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        kept.truncate(config.max_features);

        let mut terms: Vec<String> = kept.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        // Smoothed idf: ln((1 + n) / (1 + df)) + 1
        let idf = terms
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs as f64) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(index, term)| (term, index))
            .collect();

        Ok(Self {
            config,
            vocabulary,
            idf,
        })
    }

    /// L2-normalized tf-idf row; unknown terms are ignored
    pub fn transform(&self, doc: &str) -> SparseVector {
        let mut row: SparseVector = count_terms(&self.config, doc)
            .into_iter()
            .filter_map(|(term, count)| {
                self.vocabulary
                    .get(&term)
                    .map(|&index| (index, count as f64 * self.idf[index]))
            })
            .collect();

        let norm = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, v) in row.iter_mut() {
                *v /= norm;
            }
        }

        row.sort_by_key(|(index, _)| *index);
        row
    }

    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// Check that vocabulary indices and idf weights line up
    pub fn validate(&self) -> Result<(), String> {
        if self.vocabulary.len() != self.idf.len() {
            return Err(format!(
                "vocabulary has {} terms but idf has {} weights",
                self.vocabulary.len(),
                self.idf.len()
            ));
        }
        if self.vocabulary.values().any(|&i| i >= self.idf.len()) {
            return Err("vocabulary index out of range".to_string());
        }
        Ok(())
    }
}

/// Tokenize, drop stop words, optionally stem, then emit n-grams with counts
fn count_terms(config: &VectorizerConfig, doc: &str) -> HashMap<String, usize> {
    let tokens: Vec<String> = TOKEN
        .find_iter(doc)
        .map(|m| m.as_str().to_lowercase())
        .filter(|token| !is_stop_word(token))
        .map(|token| {
            if config.stem {
                STEMMER.stem(&token).into_owned()
            } else {
                token
            }
        })
        .collect();

    let mut counts = HashMap::new();
    for n in 1..=config.ngram_max.max(1) {
        for window in tokens.windows(n) {
            *counts.entry(window.join(" ")).or_insert(0) += 1;
        }
    }
    counts
}
