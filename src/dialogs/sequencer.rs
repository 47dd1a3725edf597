//! Step sequencer: runs waterfall dialogs one turn at a time.
//!
//! A turn runs steps back to back while they return `Next`, and stops at
//! the first prompt or when the dialog stack empties. The cursor is stored
//! in a `DialogState` so the caller can persist it between turns.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::error::DialogError;
use crate::profile::EntityProfile;

use super::activity::Activity;
use super::state::{DialogCursor, DialogState, PendingPrompt};
use super::step::{StepContext, StepFn, StepOutcome, StepResult};

/// Sent when a prompt has been answered wrongly too many times.
pub const RETRY_LIMIT_MESSAGE: &str =
    "Sorry, I still could not understand that. Let's start over. Please tell me the issue you are facing.";

/// A named, ordered list of steps.
#[derive(Clone)]
pub struct Waterfall {
    id: String,
    steps: Vec<StepFn>,
}

impl std::fmt::Debug for Waterfall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Waterfall")
            .field("id", &self.id)
            .field("steps", &self.steps.len())
            .finish()
    }
}

impl Waterfall {
    pub fn new(id: impl Into<String>, steps: Vec<StepFn>) -> Result<Self, DialogError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DialogError::Configuration(
                "dialog id is required".to_string(),
            ));
        }
        if steps.is_empty() {
            return Err(DialogError::Configuration(format!(
                "dialog {id} has no steps"
            )));
        }
        Ok(Self { id, steps })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Where a turn left the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    /// Suspended on a prompt; the next message resumes the active dialog.
    Waiting,
    /// Every dialog that was running has ended.
    Complete,
    /// No dialog was running, nothing happened.
    Empty,
    /// The prompt retry limit was hit and the stack was cleared.
    Abandoned,
}

/// Registry of dialogs plus the engine that drives them.
#[derive(Debug, Clone)]
pub struct DialogSet {
    dialogs: HashMap<String, Waterfall>,
    max_steps_per_turn: usize,
    prompt_retry_limit: u32,
}

impl Default for DialogSet {
    fn default() -> Self {
        Self::new()
    }
}

impl DialogSet {
    pub fn new() -> Self {
        Self::with_limits(64, 3)
    }

    pub fn with_limits(max_steps_per_turn: usize, prompt_retry_limit: u32) -> Self {
        Self {
            dialogs: HashMap::new(),
            max_steps_per_turn: max_steps_per_turn.max(1),
            prompt_retry_limit,
        }
    }

    /// Register a dialog. Names must be unique.
    pub fn add(&mut self, dialog: Waterfall) -> Result<&mut Self, DialogError> {
        if self.dialogs.contains_key(dialog.id()) {
            return Err(DialogError::Duplicate {
                name: dialog.id().to_string(),
            });
        }
        self.dialogs.insert(dialog.id().to_string(), dialog);
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Waterfall> {
        self.dialogs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.dialogs.contains_key(name)
    }

    /// Registered dialog names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.dialogs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn lookup(&self, name: &str) -> Result<&Waterfall, DialogError> {
        self.dialogs.get(name).ok_or_else(|| DialogError::UnknownDialog {
            name: name.to_string(),
        })
    }

    /// Start `dialog` on top of whatever is running and drive it until it
    /// suspends or the stack empties. Step 0 receives the options as its result.
    pub fn begin(
        &self,
        state: &mut DialogState,
        profile: &mut EntityProfile,
        dialog: &str,
        options: Option<serde_json::Value>,
        out: &mut Vec<Activity>,
    ) -> Result<TurnStatus, DialogError> {
        self.lookup(dialog)?;
        info!(dialog, depth = state.stack.len(), "Beginning dialog");
        let result = options.clone().map(StepResult::Options);
        state.push(DialogCursor::new(dialog, options));
        self.run(state, profile, result, out)
    }

    /// Resume the active dialog with the user's reply.
    ///
    /// A reply the pending prompt does not recognize re-asks the same
    /// prompt without running any step.
    pub fn continue_turn(
        &self,
        state: &mut DialogState,
        profile: &mut EntityProfile,
        input: &str,
        out: &mut Vec<Activity>,
    ) -> Result<TurnStatus, DialogError> {
        let Some(cursor) = state.active_mut() else {
            return Ok(TurnStatus::Empty);
        };

        let result = match cursor.pending.take() {
            Some(mut pending) => match pending.prompt.recognize(input) {
                Ok(reply) => Some(StepResult::Reply(reply)),
                Err(rejection) => {
                    pending.attempts += 1;
                    if pending.attempts > self.prompt_retry_limit {
                        warn!(
                            dialog = %cursor.dialog,
                            prompt = %pending.prompt.id,
                            attempts = pending.attempts,
                            "Prompt retry limit reached, cancelling dialogs"
                        );
                        state.clear();
                        state.touch();
                        out.push(Activity::text(RETRY_LIMIT_MESSAGE));
                        return Ok(TurnStatus::Abandoned);
                    }
                    debug!(
                        dialog = %cursor.dialog,
                        prompt = %pending.prompt.id,
                        attempts = pending.attempts,
                        "Reply not recognized, re-prompting"
                    );
                    out.push(Activity::text(rejection.message));
                    out.push(pending.prompt.to_activity());
                    cursor.pending = Some(pending);
                    state.touch();
                    return Ok(TurnStatus::Waiting);
                }
            },
            None => None,
        };

        self.run(state, profile, result, out)
    }

    /// End every running dialog. Returns how many were dropped.
    pub fn cancel_all(&self, state: &mut DialogState) -> usize {
        let dropped = state.clear();
        state.touch();
        if dropped > 0 {
            info!(dropped, "Cancelled all dialogs");
        }
        dropped
    }

    fn run(
        &self,
        state: &mut DialogState,
        profile: &mut EntityProfile,
        mut result: Option<StepResult>,
        out: &mut Vec<Activity>,
    ) -> Result<TurnStatus, DialogError> {
        let mut steps_run = 0usize;

        loop {
            let Some(cursor) = state.active_mut() else {
                state.touch();
                return Ok(TurnStatus::Complete);
            };
            let dialog = self.lookup(&cursor.dialog)?;

            let Some(step) = dialog.steps.get(cursor.index).copied() else {
                debug!(dialog = %cursor.dialog, "Dialog ran past its last step");
                state.pop();
                result = None;
                continue;
            };

            if steps_run >= self.max_steps_per_turn {
                return Err(DialogError::StepBudgetExceeded {
                    limit: self.max_steps_per_turn,
                });
            }
            steps_run += 1;

            let index = cursor.index;
            cursor.index += 1;
            let outcome = {
                let mut ctx = StepContext::new(
                    profile,
                    &cursor.dialog,
                    index,
                    cursor.options.as_ref(),
                    result.take(),
                    out,
                );
                step(&mut ctx)
            };
            debug!(dialog = %cursor.dialog, step = index, outcome = outcome_name(&outcome), "Step ran");

            match outcome {
                StepOutcome::Next => {}
                StepOutcome::Prompt(prompt) => {
                    out.push(prompt.to_activity());
                    cursor.pending = Some(PendingPrompt {
                        prompt,
                        attempts: 0,
                    });
                    state.touch();
                    return Ok(TurnStatus::Waiting);
                }
                StepOutcome::End => {
                    if let Some(ended) = state.pop() {
                        info!(dialog = %ended.dialog, "Dialog ended");
                    }
                }
                StepOutcome::Begin { dialog, options } => {
                    self.lookup(&dialog)?;
                    info!(dialog = %dialog, parent = %cursor.dialog, "Beginning child dialog");
                    result = options.clone().map(StepResult::Options);
                    state.push(DialogCursor::new(dialog, options));
                }
                StepOutcome::Replace { dialog, options } => {
                    self.lookup(&dialog)?;
                    info!(dialog = %dialog, replaced = %cursor.dialog, "Replacing dialog");
                    state.pop();
                    result = options.clone().map(StepResult::Options);
                    state.push(DialogCursor::new(dialog, options));
                }
            }
        }
    }
}

fn outcome_name(outcome: &StepOutcome) -> &'static str {
    match outcome {
        StepOutcome::Next => "next",
        StepOutcome::Prompt(_) => "prompt",
        StepOutcome::End => "end",
        StepOutcome::Begin { .. } => "begin",
        StepOutcome::Replace { .. } => "replace",
    }
}
