//! Knowledge base loading and the question/answer corpus.
//!
//! The knowledge base is a single JSON document with canned
//! question→answer mappings plus flat lists of jokes and facts. It is
//! loaded once at startup and treated as read-only afterwards.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::MimirError;

/// On-disk knowledge base document.
///
/// Every field is optional in the file; a missing file yields an entirely
/// empty knowledge base. `medical_questions` is merged over `responses`
/// when building the corpus, with medical entries winning on key conflict.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeBase {
    #[serde(default)]
    pub responses: BTreeMap<String, String>,
    #[serde(default)]
    pub medical_questions: BTreeMap<String, String>,
    #[serde(default)]
    pub jokes: Vec<String>,
    #[serde(default)]
    pub fun_facts: Vec<String>,
    #[serde(default)]
    pub medical_facts: Vec<String>,
}

impl KnowledgeBase {
    /// Load the knowledge base from `path`.
    ///
    /// A missing file is not an error: it yields the empty default. An
    /// unreadable or malformed file is fatal to startup and propagates.
    pub fn load(path: &Path) -> Result<Self, MimirError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No knowledge base at {}, starting empty", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(MimirError::Io(e)),
        };

        let kb: Self = serde_json::from_str(&raw)
            .map_err(|e| MimirError::Knowledge(format!("{}: {}", path.display(), e)))?;
        info!(
            "Loaded knowledge base: {} responses, {} medical questions, \
             {} jokes, {} fun facts, {} medical facts",
            kb.responses.len(),
            kb.medical_questions.len(),
            kb.jokes.len(),
            kb.fun_facts.len(),
            kb.medical_facts.len()
        );
        Ok(kb)
    }

    /// All question→answer entries with medical questions merged over the
    /// general responses (medical wins on conflict).
    pub fn merged_responses(&self) -> BTreeMap<String, String> {
        let mut merged = self.responses.clone();
        merged.extend(
            self.medical_questions
                .iter()
                .map(|(q, a)| (q.clone(), a.clone())),
        );
        merged
    }

    /// Build the aligned question/answer corpus for similarity matching.
    pub fn corpus(&self) -> Corpus {
        let merged = self.merged_responses();
        let mut questions = Vec::with_capacity(merged.len());
        let mut answers = Vec::with_capacity(merged.len());
        for (q, a) in merged {
            questions.push(q);
            answers.push(a);
        }
        Corpus { questions, answers }
    }
}

/// Index-aligned question and answer sequences.
///
/// Invariant: `questions.len() == answers.len()`, and index `i` of one
/// corresponds to index `i` of the other through every transformation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    questions: Vec<String>,
    answers: Vec<String>,
}

impl Corpus {
    pub fn new(questions: Vec<String>, answers: Vec<String>) -> Self {
        assert_eq!(questions.len(), answers.len(), "corpus must stay aligned");
        Self { questions, answers }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(index).map(String::as_str)
    }

    /// Content digest used to key the persisted vector model cache.
    ///
    /// Covers questions and answers in corpus order, so any change to the
    /// knowledge base invalidates a stale cache.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for (q, a) in self.questions.iter().zip(self.answers.iter()) {
            hasher.update(q.as_bytes());
            hasher.update([0u8]);
            hasher.update(a.as_bytes());
            hasher.update([0u8]);
        }
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_empty_base() {
        let dir = tempfile::tempdir().unwrap();
        let kb = KnowledgeBase::load(&dir.path().join("nope.json")).unwrap();
        assert!(kb.responses.is_empty());
        assert!(kb.jokes.is_empty());
        assert!(kb.corpus().is_empty());
    }

    #[test]
    fn malformed_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(f, "not json").unwrap();
        assert!(KnowledgeBase::load(&path).is_err());
    }

    #[test]
    fn medical_questions_override_responses() {
        let kb: KnowledgeBase = serde_json::from_str(
            r#"{
                "responses": {"what is aspirin": "a drug", "hello": "hi"},
                "medical_questions": {"what is aspirin": "a blood thinner"}
            }"#,
        )
        .unwrap();

        let merged = kb.merged_responses();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged["what is aspirin"], "a blood thinner");
        assert_eq!(merged["hello"], "hi");
    }

    #[test]
    fn corpus_stays_aligned() {
        let kb: KnowledgeBase = serde_json::from_str(
            r#"{
                "responses": {"b question": "b answer", "a question": "a answer"},
                "medical_questions": {"c question": "c answer"}
            }"#,
        )
        .unwrap();

        let corpus = kb.corpus();
        assert_eq!(corpus.len(), 3);
        for (i, q) in corpus.questions().iter().enumerate() {
            let a = corpus.answer(i).unwrap();
            assert_eq!(&q[..1], &a[..1]);
        }
    }

    #[test]
    fn digest_tracks_content() {
        let a = Corpus::new(vec!["q1".into()], vec!["a1".into()]);
        let b = Corpus::new(vec!["q1".into()], vec!["a1".into()]);
        let c = Corpus::new(vec!["q1".into()], vec!["a2".into()]);
        assert_eq!(a.digest(), b.digest());
        assert_ne!(a.digest(), c.digest());
    }
}
