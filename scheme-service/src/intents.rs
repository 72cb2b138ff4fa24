use std::path::Path;

use rand::seq::IndexedRandom;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Tag returned when no pattern matches the input.
pub const FALLBACK_TAG: &str = "fallback";

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Failed to read intent corpus: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse intent corpus: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown intent tag: {0}")]
    UnknownIntent(String),

    #[error("Malformed intent corpus: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Intent {
    pub tag: String,
    pub patterns: Vec<String>,
    pub responses: Vec<String>,
}

/// Static collection of intents loaded once at startup, read-only after.
#[derive(Debug, Clone, Deserialize)]
pub struct IntentCorpus {
    intents: Vec<Intent>,
}

impl IntentCorpus {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let raw = std::fs::read_to_string(path)?;
        let corpus = Self::from_json(&raw)?;
        info!(intents = corpus.intents.len(), "intent corpus loaded");
        Ok(corpus)
    }

    pub fn from_json(raw: &str) -> Result<Self, CorpusError> {
        let corpus: IntentCorpus = serde_json::from_str(raw)?;

        if !corpus.intents.iter().any(|i| i.tag == FALLBACK_TAG) {
            return Err(CorpusError::Malformed(format!(
                "no {FALLBACK_TAG:?} intent defined"
            )));
        }
        if let Some(empty) = corpus.intents.iter().find(|i| i.responses.is_empty()) {
            return Err(CorpusError::Malformed(format!(
                "intent {:?} has no responses",
                empty.tag
            )));
        }

        Ok(corpus)
    }

    /// Tag of the first intent with a trigger phrase that contains the input
    /// as a substring, scanning in corpus order.
    ///
    /// The direction is deliberate: the input is looked up inside the
    /// phrase, not the phrase inside the input.
    pub fn match_intent(&self, text: &str) -> &str {
        let needle = text.to_lowercase();
        for intent in &self.intents {
            if intent
                .patterns
                .iter()
                .any(|pattern| pattern.to_lowercase().contains(&needle))
            {
                return &intent.tag;
            }
        }
        FALLBACK_TAG
    }

    /// One response for the tag, chosen uniformly at random.
    pub fn pick_response(&self, tag: &str) -> Result<&str, CorpusError> {
        let intent = self
            .intents
            .iter()
            .find(|i| i.tag == tag)
            .ok_or_else(|| CorpusError::UnknownIntent(tag.to_string()))?;

        intent
            .responses
            .choose(&mut rand::rng())
            .map(String::as_str)
            .ok_or_else(|| CorpusError::Malformed(format!("intent {tag:?} has no responses")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> IntentCorpus {
        IntentCorpus::from_json(
            r#"{
                "intents": [
                    {
                        "tag": "greeting",
                        "patterns": ["hello there", "good morning"],
                        "responses": ["Hello!", "Hi!"]
                    },
                    {
                        "tag": "thanks",
                        "patterns": ["thank you so much"],
                        "responses": ["You're welcome."]
                    },
                    {
                        "tag": "fallback",
                        "patterns": [],
                        "responses": ["Sorry, I did not understand that."]
                    }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn input_matches_when_contained_in_a_pattern() {
        let corpus = corpus();
        // "hello" is a substring of the pattern "hello there".
        assert_eq!(corpus.match_intent("hello"), "greeting");
        assert_eq!(corpus.match_intent("HELLO"), "greeting");
        assert_eq!(corpus.match_intent("thank you"), "thanks");
    }

    #[test]
    fn unmatched_input_falls_back() {
        assert_eq!(corpus().match_intent("zzz"), FALLBACK_TAG);
    }

    #[test]
    fn first_matching_intent_wins() {
        // "o" occurs in patterns of both intents; corpus order decides.
        assert_eq!(corpus().match_intent("o"), "greeting");
    }

    #[test]
    fn responses_come_from_the_matched_intent() {
        let corpus = corpus();
        for _ in 0..10 {
            let response = corpus.pick_response("greeting").unwrap();
            assert!(["Hello!", "Hi!"].contains(&response));
        }
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let err = corpus().pick_response("nope").unwrap_err();
        assert!(matches!(err, CorpusError::UnknownIntent(_)));
    }

    #[test]
    fn corpus_without_fallback_is_rejected() {
        let err = IntentCorpus::from_json(
            r#"{"intents": [{"tag": "greeting", "patterns": [], "responses": ["hi"]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, CorpusError::Malformed(_)));
    }

    #[test]
    fn intent_without_responses_is_rejected() {
        let err = IntentCorpus::from_json(
            r#"{"intents": [
                {"tag": "greeting", "patterns": [], "responses": []},
                {"tag": "fallback", "patterns": [], "responses": ["ok"]}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, CorpusError::Malformed(_)));
    }
}
