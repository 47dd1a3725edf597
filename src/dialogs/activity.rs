//! Outbound bot replies.

use serde::{Deserialize, Serialize};

/// One reply the bot sends back to the user during a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Activity {
    /// Plain text line.
    Text { text: String },
    /// Text plus an ordered list of quick-reply suggestions.
    SuggestedActions { text: String, actions: Vec<String> },
}

impl Activity {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn suggested<S: AsRef<str>>(text: impl Into<String>, actions: &[S]) -> Self {
        Self::SuggestedActions {
            text: text.into(),
            actions: actions.iter().map(|a| a.as_ref().to_string()).collect(),
        }
    }

    /// The text body, regardless of variant.
    pub fn content(&self) -> &str {
        match self {
            Self::Text { text } | Self::SuggestedActions { text, .. } => text,
        }
    }

    /// Quick-reply suggestions (empty for plain text).
    pub fn actions(&self) -> &[String] {
        match self {
            Self::Text { .. } => &[],
            Self::SuggestedActions { actions, .. } => actions,
        }
    }
}
