//! Bag-of-words vectorization over the corpus questions.
//!
//! The vocabulary is fixed at build time from the corpus; utterances are
//! projected into the same feature space. A JSON cache keyed by the corpus
//! digest lets later runs skip the rebuild; a stale or unreadable cache is
//! recomputed, never fatal.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::knowledge::Corpus;

/// Split text into lowercase alphanumeric/underscore runs of length >= 2.
/// Single-character fragments carry no signal and are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

/// Fixed term→index mapping built from the corpus questions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    terms: BTreeMap<String, usize>,
}

impl Vocabulary {
    /// Build from the corpus questions. Term indices follow sorted term
    /// order, so the feature space is reproducible for a fixed corpus.
    pub fn build(questions: &[String]) -> Self {
        let mut terms = BTreeMap::new();
        for question in questions {
            for token in tokenize(question) {
                terms.entry(token).or_insert(0usize);
            }
        }
        for (index, slot) in terms.values_mut().enumerate() {
            *slot = index;
        }
        Self { terms }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Project `text` into the vocabulary space as term counts.
    /// Out-of-vocabulary tokens are ignored.
    pub fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.terms.len()];
        for token in tokenize(text) {
            if let Some(&index) = self.terms.get(&token) {
                vector[index] += 1.0;
            }
        }
        vector
    }
}

/// Vocabulary plus the precomputed vector for every corpus question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorModel {
    digest: String,
    vocabulary: Vocabulary,
    vectors: Vec<Vec<f32>>,
}

impl VectorModel {
    /// Vectorize every corpus question.
    pub fn build(corpus: &Corpus) -> Self {
        let vocabulary = Vocabulary::build(corpus.questions());
        let vectors = corpus
            .questions()
            .iter()
            .map(|q| vocabulary.vectorize(q))
            .collect();
        debug!(
            "Built vector model: {} questions, {} terms",
            corpus.len(),
            vocabulary.len()
        );
        Self {
            digest: corpus.digest(),
            vocabulary,
            vectors,
        }
    }

    /// Load the model from `cache_path` if it matches the corpus digest,
    /// otherwise rebuild and rewrite the cache. Cache problems only cost
    /// the rebuild.
    pub fn load_or_build(corpus: &Corpus, cache_path: &Path) -> Self {
        if let Some(model) = Self::load_cached(corpus, cache_path) {
            info!("Loaded vector model cache from {}", cache_path.display());
            return model;
        }

        let model = Self::build(corpus);
        if let Err(e) = model.store(cache_path) {
            warn!("Could not write vector model cache: {}", e);
        }
        model
    }

    fn load_cached(corpus: &Corpus, cache_path: &Path) -> Option<Self> {
        let raw = match fs::read_to_string(cache_path) {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    warn!("Could not read vector model cache: {}", e);
                }
                return None;
            }
        };

        let model: Self = match serde_json::from_str(&raw) {
            Ok(model) => model,
            Err(e) => {
                warn!("Discarding unreadable vector model cache: {}", e);
                return None;
            }
        };

        if model.digest != corpus.digest() || model.vectors.len() != corpus.len() {
            info!("Vector model cache is stale, rebuilding");
            return None;
        }
        Some(model)
    }

    fn store(&self, cache_path: &Path) -> std::io::Result<()> {
        if let Some(parent) = cache_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string(self)
            .map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e))?;
        fs::write(cache_path, raw)
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// One vector per corpus question, index-aligned with the corpus.
    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }
}
