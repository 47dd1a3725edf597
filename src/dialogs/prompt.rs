//! Prompt specifications and reply recognition.
//!
//! A prompt is issued by a step, persisted with the dialog cursor, and
//! checked against the user's next message. Recognition failures never
//! reach a step: the sequencer re-asks the same prompt instead.

use serde::{Deserialize, Serialize};

use super::activity::Activity;

/// A question a step asks before suspending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSpec {
    /// Prompt identifier, e.g. "confirm_prompt".
    pub id: String,
    /// Question shown to the user.
    pub text: String,
    pub kind: PromptKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromptKind {
    /// The reply must be one of a finite set of choices.
    Choice { choices: Vec<String> },
    /// Free text, optionally checked by a validator.
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        validator: Option<Validator>,
    },
}

/// Free-text validators. Each one normalizes accepted input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Validator {
    /// yes/no/y/n, normalized to "Yes" or "No".
    YesNo,
    /// Case-insensitive match against a fixed list, normalized to the listed spelling.
    OneOf { options: Vec<String> },
    /// At least `min` characters after trimming.
    MinLength { min: usize },
}

/// Normalized reply delivered to the step after the prompting one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptResult {
    pub value: String,
}

/// Why a reply was not accepted, phrased for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub message: String,
}

impl Rejection {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl PromptSpec {
    pub fn choice<S: AsRef<str>>(id: &str, text: impl Into<String>, choices: &[S]) -> Self {
        Self {
            id: id.to_string(),
            text: text.into(),
            kind: PromptKind::Choice {
                choices: choices.iter().map(|c| c.as_ref().to_string()).collect(),
            },
        }
    }

    pub fn text(id: &str, text: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            text: text.into(),
            kind: PromptKind::Text { validator: None },
        }
    }

    /// Attach a validator. No effect on choice prompts.
    pub fn with_validator(mut self, rule: Validator) -> Self {
        if let PromptKind::Text { ref mut validator } = self.kind {
            *validator = Some(rule);
        }
        self
    }

    /// Render the prompt for the channel.
    pub fn to_activity(&self) -> Activity {
        match &self.kind {
            PromptKind::Choice { choices } => Activity::suggested(self.text.clone(), choices),
            PromptKind::Text { .. } => Activity::text(self.text.clone()),
        }
    }

    /// Check a raw reply against this prompt.
    pub fn recognize(&self, input: &str) -> Result<PromptResult, Rejection> {
        let input = input.trim();
        match &self.kind {
            PromptKind::Choice { choices } => recognize_choice(choices, input),
            PromptKind::Text { validator: None } => {
                if input.is_empty() {
                    Err(Rejection::new("Please type a reply."))
                } else {
                    Ok(PromptResult {
                        value: input.to_string(),
                    })
                }
            }
            PromptKind::Text {
                validator: Some(rule),
            } => rule.validate(input).map(|value| PromptResult { value }),
        }
    }
}

/// Exact (case-insensitive) choice text, or a 1-based ordinal.
fn recognize_choice(choices: &[String], input: &str) -> Result<PromptResult, Rejection> {
    if let Some(choice) = choices.iter().find(|c| c.eq_ignore_ascii_case(input)) {
        return Ok(PromptResult {
            value: choice.clone(),
        });
    }
    if let Ok(n) = input.parse::<usize>() {
        if let Some(choice) = n.checked_sub(1).and_then(|i| choices.get(i)) {
            return Ok(PromptResult {
                value: choice.clone(),
            });
        }
    }
    Err(Rejection::new(format!(
        "Please choose one of: {}.",
        choices.join(", ")
    )))
}

impl Validator {
    pub fn validate(&self, input: &str) -> Result<String, Rejection> {
        match self {
            Self::YesNo => match input.to_ascii_lowercase().as_str() {
                "yes" | "y" => Ok("Yes".to_string()),
                "no" | "n" => Ok("No".to_string()),
                _ => Err(Rejection::new("Please answer Yes or No.")),
            },
            Self::OneOf { options } => options
                .iter()
                .find(|o| o.eq_ignore_ascii_case(input))
                .cloned()
                .ok_or_else(|| {
                    Rejection::new(format!("Please answer with one of: {}.", options.join(", ")))
                }),
            Self::MinLength { min } => {
                if input.chars().count() >= *min {
                    Ok(input.to_string())
                } else {
                    Err(Rejection::new(format!(
                        "Please enter at least {min} characters."
                    )))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yes_no() -> PromptSpec {
        PromptSpec::choice("confirm_prompt", "Continue?", &["Yes", "No"])
    }

    #[test]
    fn choice_matches_case_insensitively() {
        let result = yes_no().recognize("  yES ").unwrap();
        assert_eq!(result.value, "Yes");
    }

    #[test]
    fn choice_accepts_ordinal() {
        let prompt = PromptSpec::choice("p", "Browser?", &["Internet explorer", "Chrome", "Firefox"]);
        assert_eq!(prompt.recognize("2").unwrap().value, "Chrome");
        assert!(prompt.recognize("0").is_err());
        assert!(prompt.recognize("4").is_err());
    }

    #[test]
    fn choice_rejection_lists_choices() {
        let err = yes_no().recognize("maybe").unwrap_err();
        assert_eq!(err.message, "Please choose one of: Yes, No.");
    }

    #[test]
    fn text_without_validator_rejects_blank() {
        let prompt = PromptSpec::text("p", "Describe the issue");
        assert!(prompt.recognize("   ").is_err());
        assert_eq!(prompt.recognize(" it broke ").unwrap().value, "it broke");
    }

    #[test]
    fn yes_no_validator_normalizes() {
        let prompt = PromptSpec::text("yes_no_prompt", "Updated?").with_validator(Validator::YesNo);
        assert_eq!(prompt.recognize("y").unwrap().value, "Yes");
        assert_eq!(prompt.recognize("NO").unwrap().value, "No");
        assert_eq!(
            prompt.recognize("perhaps").unwrap_err().message,
            "Please answer Yes or No."
        );
    }

    #[test]
    fn one_of_and_min_length() {
        let one_of = Validator::OneOf {
            options: vec!["Supervisor".into(), "Backup Approver".into()],
        };
        assert_eq!(one_of.validate("backup approver").unwrap(), "Backup Approver");
        assert!(one_of.validate("manager").is_err());

        let min = Validator::MinLength { min: 3 };
        assert!(min.validate("ab").is_err());
        assert_eq!(min.validate("abc").unwrap(), "abc");
    }

    #[test]
    fn validator_ignored_on_choice_prompt() {
        let prompt = yes_no().with_validator(Validator::MinLength { min: 10 });
        assert_eq!(prompt, yes_no());
    }

    #[test]
    fn rendering() {
        assert_eq!(yes_no().to_activity().actions().len(), 2);
        assert_eq!(
            PromptSpec::text("p", "Why?").to_activity(),
            Activity::text("Why?")
        );
    }

    #[test]
    fn spec_survives_serde() {
        let prompt = PromptSpec::text("yes_no_prompt", "Updated?").with_validator(Validator::YesNo);
        let json = serde_json::to_string(&prompt).unwrap();
        let parsed: PromptSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, prompt);
    }
}
