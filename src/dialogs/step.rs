//! Step functions and the context they run against.

use crate::profile::EntityProfile;

use super::activity::Activity;
use super::prompt::{PromptResult, PromptSpec};

/// What a step receives as the result of the previous turn or step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepResult {
    /// Options passed when the dialog was started (step 0 only).
    Options(serde_json::Value),
    /// Recognized reply to the prompt issued by the previous step.
    Reply(PromptResult),
}

/// What a step tells the sequencer to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Run the following step within the same turn.
    Next,
    /// Ask a question and suspend until the next message.
    Prompt(PromptSpec),
    /// End this dialog. A waiting parent resumes at its next step.
    End,
    /// Start a child dialog on top of this one.
    Begin {
        dialog: String,
        options: Option<serde_json::Value>,
    },
    /// End this dialog and start another in its place.
    Replace {
        dialog: String,
        options: Option<serde_json::Value>,
    },
}

impl StepOutcome {
    pub fn begin(dialog: &str) -> Self {
        Self::Begin {
            dialog: dialog.to_string(),
            options: None,
        }
    }

    pub fn replace(dialog: &str) -> Self {
        Self::Replace {
            dialog: dialog.to_string(),
            options: None,
        }
    }
}

/// A single scripted step.
pub type StepFn = fn(&mut StepContext<'_>) -> StepOutcome;

/// Everything a step may read or change during one invocation.
///
/// The profile is handed in explicitly; steps have no other access to
/// conversation state.
pub struct StepContext<'a> {
    pub profile: &'a mut EntityProfile,
    dialog: &'a str,
    index: usize,
    options: Option<&'a serde_json::Value>,
    result: Option<StepResult>,
    activities: &'a mut Vec<Activity>,
}

impl<'a> StepContext<'a> {
    pub fn new(
        profile: &'a mut EntityProfile,
        dialog: &'a str,
        index: usize,
        options: Option<&'a serde_json::Value>,
        result: Option<StepResult>,
        activities: &'a mut Vec<Activity>,
    ) -> Self {
        Self {
            profile,
            dialog,
            index,
            options,
            result,
            activities,
        }
    }

    /// Name of the dialog this step belongs to.
    pub fn dialog(&self) -> &str {
        self.dialog
    }

    /// Position of this step in its dialog.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Options the dialog instance was started with.
    pub fn options(&self) -> Option<&serde_json::Value> {
        self.options
    }

    pub fn result(&self) -> Option<&StepResult> {
        self.result.as_ref()
    }

    /// Normalized reply text, if this step follows a prompt.
    pub fn reply(&self) -> Option<&str> {
        match &self.result {
            Some(StepResult::Reply(r)) => Some(r.value.as_str()),
            _ => None,
        }
    }

    /// Case-insensitive comparison against the reply.
    pub fn reply_is(&self, expected: &str) -> bool {
        self.reply()
            .is_some_and(|r| r.trim().eq_ignore_ascii_case(expected))
    }

    /// Queue a plain text line.
    pub fn send(&mut self, text: impl Into<String>) {
        self.activities.push(Activity::text(text));
    }

    /// Queue text with quick-reply suggestions.
    pub fn send_suggestions<S: AsRef<str>>(&mut self, text: impl Into<String>, actions: &[S]) {
        self.activities.push(Activity::suggested(text, actions));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_helpers() {
        let mut profile = EntityProfile::default();
        let mut out = Vec::new();
        let ctx = StepContext::new(
            &mut profile,
            "report",
            3,
            None,
            Some(StepResult::Reply(PromptResult {
                value: "Internet explorer".to_string(),
            })),
            &mut out,
        );
        assert_eq!(ctx.reply(), Some("Internet explorer"));
        assert!(ctx.reply_is("internet explorer"));
        assert!(!ctx.reply_is("chrome"));
        assert_eq!(ctx.dialog(), "report");
        assert_eq!(ctx.index(), 3);
    }

    #[test]
    fn options_are_not_a_reply() {
        let mut profile = EntityProfile::default();
        let mut out = Vec::new();
        let options = serde_json::json!({"entity_profile": {"entity": "ldap"}});
        let ctx = StepContext::new(
            &mut profile,
            "greeting",
            0,
            Some(&options),
            Some(StepResult::Options(options.clone())),
            &mut out,
        );
        assert!(ctx.reply().is_none());
        assert!(!ctx.reply_is("yes"));
        assert!(ctx.options().is_some());
    }

    #[test]
    fn send_queues_activities_in_order() {
        let mut profile = EntityProfile::default();
        let mut out = Vec::new();
        {
            let mut ctx = StepContext::new(&mut profile, "login", 1, None, None, &mut out);
            ctx.send("first");
            ctx.send_suggestions("second", &["a", "b"]);
        }
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Activity::text("first"));
        assert_eq!(out[1].actions().len(), 2);
    }
}
