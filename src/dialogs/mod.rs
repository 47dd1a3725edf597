//! Dialog engine: waterfall dialogs, prompts, and the persisted cursor.
//!
//! A dialog is a named list of plain step functions. The `DialogSet`
//! drives the active dialog one user turn at a time: steps chain while
//! they return `Next`, a `Prompt` suspends the turn, and `End` pops the
//! dialog off the stack. All durable state lives in `DialogState` and the
//! `EntityProfile`, both handed in by the caller.

pub mod activity;
pub mod prompt;
pub mod sequencer;
pub mod state;
pub mod step;

pub use activity::Activity;
pub use prompt::{PromptKind, PromptResult, PromptSpec, Rejection, Validator};
pub use sequencer::{DialogSet, RETRY_LIMIT_MESSAGE, TurnStatus, Waterfall};
pub use state::{DialogCursor, DialogState, PendingPrompt};
pub use step::{StepContext, StepFn, StepOutcome, StepResult};
