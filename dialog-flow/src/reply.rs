use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a step hands back to the user for one turn of the dialogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Reply {
    /// Plain text: a free-form question or a validation re-prompt.
    Text(String),
    /// A question with a numbered option list the user answers by index.
    Menu {
        prompt: String,
        options: Vec<String>,
    },
    /// Terminal reply carrying the dialogue's final payload.
    Outcome { prompt: String, payload: Value },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }

    pub fn menu(prompt: impl Into<String>, options: Vec<String>) -> Self {
        Reply::Menu {
            prompt: prompt.into(),
            options,
        }
    }

    pub fn outcome(prompt: impl Into<String>, payload: Value) -> Self {
        Reply::Outcome {
            prompt: prompt.into(),
            payload,
        }
    }
}
