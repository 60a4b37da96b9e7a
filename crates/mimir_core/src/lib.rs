//! Mimir core - single-turn query resolution engine.
//!
//! One utterance in, one response string out. Strategies are tried in a
//! fixed order: arithmetic, delegated health probe, similarity match
//! against the knowledge base, special-token substitution. Every resolved
//! exchange is appended to the transcript.

pub mod config;
pub mod error;
pub mod knowledge;
pub mod matcher;
pub mod mathsolve;
pub mod probe;
pub mod resolver;
pub mod special;
pub mod transcript;
pub mod vectorizer;

pub use config::Config;
pub use error::MimirError;
pub use knowledge::{Corpus, KnowledgeBase};
pub use probe::{CommandProbe, HealthProbe, HealthReading, ProbeError};
pub use resolver::Resolver;
pub use transcript::{TranscriptRecord, TranscriptRecorder};
pub use vectorizer::VectorModel;
