//! Special-token substitution for dynamic answers.
//!
//! A handful of reserved answer strings in the knowledge base stand for
//! content produced at resolution time instead of literal text. The wire
//! tokens are part of the knowledge-base format and must not change.

use chrono::Local;
use rand::seq::SliceRandom;

use crate::knowledge::KnowledgeBase;

/// Fixed response when a token's backing list is empty.
pub const NONE_AVAILABLE_RESPONSE: &str = "Sorry, I don't have any of those right now.";

/// Reserved answer values with dynamic substitutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialToken {
    Joke,
    FunFact,
    MedicalFact,
    Time,
}

impl SpecialToken {
    /// Parse a knowledge-base answer value. Anything that is not a
    /// reserved token is ordinary literal content.
    pub fn from_wire(answer: &str) -> Option<Self> {
        match answer {
            "get_joke" => Some(Self::Joke),
            "get_fact" => Some(Self::FunFact),
            "get_medical_fact" => Some(Self::MedicalFact),
            "get_time" => Some(Self::Time),
            _ => None,
        }
    }

    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Joke => "get_joke",
            Self::FunFact => "get_fact",
            Self::MedicalFact => "get_medical_fact",
            Self::Time => "get_time",
        }
    }
}

/// Substitute `candidate` if it is a special token, otherwise return it
/// unchanged. Draws are uniform and independent per call.
pub fn resolve_special(candidate: &str, kb: &KnowledgeBase) -> String {
    let token = match SpecialToken::from_wire(candidate) {
        Some(token) => token,
        None => return candidate.to_string(),
    };

    match token {
        SpecialToken::Joke => pick(&kb.jokes),
        SpecialToken::FunFact => pick(&kb.fun_facts),
        SpecialToken::MedicalFact => pick(&kb.medical_facts),
        SpecialToken::Time => current_time_response(),
    }
}

fn pick(items: &[String]) -> String {
    items
        .choose(&mut rand::thread_rng())
        .cloned()
        .unwrap_or_else(|| NONE_AVAILABLE_RESPONSE.to_string())
}

fn current_time_response() -> String {
    format!(
        "The current time is: {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kb_with_jokes(jokes: &[&str]) -> KnowledgeBase {
        KnowledgeBase {
            jokes: jokes.iter().map(|j| j.to_string()).collect(),
            ..KnowledgeBase::default()
        }
    }

    #[test]
    fn wire_tokens_round_trip() {
        for token in [
            SpecialToken::Joke,
            SpecialToken::FunFact,
            SpecialToken::MedicalFact,
            SpecialToken::Time,
        ] {
            assert_eq!(SpecialToken::from_wire(token.wire_name()), Some(token));
        }
        assert_eq!(SpecialToken::from_wire("get_weather"), None);
    }

    #[test]
    fn literal_answers_pass_through() {
        let kb = KnowledgeBase::default();
        assert_eq!(resolve_special("I am fine, thanks!", &kb), "I am fine, thanks!");
    }

    #[test]
    fn single_joke_is_always_drawn() {
        let kb = kb_with_jokes(&["why did the chicken cross the road"]);
        for _ in 0..5 {
            assert_eq!(
                resolve_special("get_joke", &kb),
                "why did the chicken cross the road"
            );
        }
    }

    #[test]
    fn draws_come_from_the_backing_list() {
        let kb = kb_with_jokes(&["one", "two", "three"]);
        for _ in 0..20 {
            let joke = resolve_special("get_joke", &kb);
            assert!(kb.jokes.contains(&joke));
        }
    }

    #[test]
    fn empty_list_has_fixed_fallback() {
        let kb = KnowledgeBase::default();
        assert_eq!(resolve_special("get_joke", &kb), NONE_AVAILABLE_RESPONSE);
        assert_eq!(resolve_special("get_fact", &kb), NONE_AVAILABLE_RESPONSE);
        assert_eq!(
            resolve_special("get_medical_fact", &kb),
            NONE_AVAILABLE_RESPONSE
        );
    }

    #[test]
    fn time_response_is_formatted() {
        let kb = KnowledgeBase::default();
        let response = resolve_special("get_time", &kb);
        let stamp = response.strip_prefix("The current time is: ").unwrap();
        // YYYY-MM-DD HH:MM:SS
        assert_eq!(stamp.len(), 19);
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[10..11], " ");
        assert_eq!(&stamp[13..14], ":");
    }
}
