//! Ordered dispatch of resolution strategies.
//!
//! Strategies run in a fixed order with short-circuit semantics: math,
//! then the delegated health probe, then similarity matching with
//! special-token substitution. Whatever produced the response, the
//! exchange is appended to the transcript before returning.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::MimirError;
use crate::knowledge::{Corpus, KnowledgeBase};
use crate::probe::{self, CommandProbe, HealthProbe};
use crate::transcript::TranscriptRecorder;
use crate::vectorizer::VectorModel;
use crate::{matcher, mathsolve, special};

/// Fixed response when no corpus question is similar to the utterance.
pub const NO_MATCH_RESPONSE: &str = "I'm sorry, I don't understand that.";

/// Substrings that route an utterance to the health probe.
pub const HEALTH_KEYWORDS: &[&str] = &[
    "check my health",
    "i have",
    "i feel",
    "fever",
    "heart rate",
    "temperature",
];

/// Trim surrounding whitespace and lowercase. Idempotent.
pub fn normalize(utterance: &str) -> String {
    utterance.trim().to_lowercase()
}

fn is_health_query(normalized: &str) -> bool {
    HEALTH_KEYWORDS.iter().any(|k| normalized.contains(k))
}

/// The resolution engine. Owns the immutable knowledge state, the health
/// probe capability, and the transcript recorder.
pub struct Resolver {
    kb: KnowledgeBase,
    corpus: Corpus,
    model: VectorModel,
    probe: Box<dyn HealthProbe>,
    transcript: TranscriptRecorder,
}

impl Resolver {
    /// Build from an already-loaded knowledge base, computing the vector
    /// model in place.
    pub fn new(
        kb: KnowledgeBase,
        health_probe: Box<dyn HealthProbe>,
        transcript: TranscriptRecorder,
    ) -> Self {
        let corpus = kb.corpus();
        let model = VectorModel::build(&corpus);
        Self {
            kb,
            corpus,
            model,
            probe: health_probe,
            transcript,
        }
    }

    /// Like [`Resolver::new`], but goes through the persisted vector model
    /// cache at `cache_path`.
    pub fn with_model_cache(
        kb: KnowledgeBase,
        health_probe: Box<dyn HealthProbe>,
        transcript: TranscriptRecorder,
        cache_path: &Path,
    ) -> Self {
        let corpus = kb.corpus();
        let model = VectorModel::load_or_build(&corpus, cache_path);
        Self {
            kb,
            corpus,
            model,
            probe: health_probe,
            transcript,
        }
    }

    /// Assemble the whole engine from configuration. The only fallible
    /// step is loading the knowledge base.
    pub fn from_config(config: &Config) -> Result<Self, MimirError> {
        let kb = KnowledgeBase::load(&config.knowledge_path)?;
        let probe = Box::new(CommandProbe::new(
            config.probe_command.clone(),
            config.probe_timeout(),
        ));
        let transcript = TranscriptRecorder::new(config.transcript_path.clone());
        Ok(Self::with_model_cache(
            kb,
            probe,
            transcript,
            &config.model_cache_path,
        ))
    }

    /// Resolve one utterance to a response string. Never fails: every
    /// internal error becomes a user-visible message, and a transcript
    /// write problem is only logged.
    pub fn resolve(&self, utterance: &str) -> String {
        let normalized = normalize(utterance);
        let response = self.dispatch(&normalized);

        if let Err(e) = self.transcript.append(utterance, &response) {
            warn!("Could not record transcript entry: {}", e);
        }
        response
    }

    fn dispatch(&self, normalized: &str) -> String {
        if let Some(answer) = mathsolve::solve(normalized) {
            debug!("Resolved as math");
            return answer;
        }

        if is_health_query(normalized) {
            debug!("Resolved via health probe");
            return self.health_response();
        }

        let candidate = match matcher::best_match(&self.model, normalized) {
            Some(index) => match self.corpus.answer(index) {
                Some(answer) => answer.to_string(),
                None => NO_MATCH_RESPONSE.to_string(),
            },
            None => NO_MATCH_RESPONSE.to_string(),
        };

        special::resolve_special(&candidate, &self.kb)
    }

    fn health_response(&self) -> String {
        match self.probe.read() {
            Ok(reading) => probe::format_reading(&reading),
            Err(e) => {
                info!("Health probe failed: {}", e);
                probe::error_response(&e)
            }
        }
    }

    pub fn transcript(&self) -> &TranscriptRecorder {
        &self.transcript
    }
}
