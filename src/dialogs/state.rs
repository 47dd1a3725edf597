//! Persisted dialog cursor: which dialog is running and which step is next.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::prompt::PromptSpec;

/// A prompt awaiting the user's reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPrompt {
    pub prompt: PromptSpec,
    /// Unrecognized replies received so far.
    #[serde(default)]
    pub attempts: u32,
}

/// One running dialog instance on the stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogCursor {
    /// Registered dialog name.
    pub dialog: String,
    /// Index of the next step to run.
    pub index: usize,
    /// Options the dialog was started with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
    /// Set while the dialog is suspended on a prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingPrompt>,
}

impl DialogCursor {
    pub fn new(dialog: impl Into<String>, options: Option<serde_json::Value>) -> Self {
        Self {
            dialog: dialog.into(),
            index: 0,
            options,
            pending: None,
        }
    }
}

/// Persisted dialog stack for one conversation.
///
/// The last element is the active dialog; earlier elements are parents
/// waiting for their child to end. Stored under key `"dialog_state"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogState {
    #[serde(default)]
    pub stack: Vec<DialogCursor>,
    pub updated_at: DateTime<Utc>,
}

impl Default for DialogState {
    fn default() -> Self {
        Self {
            stack: Vec::new(),
            updated_at: Utc::now(),
        }
    }
}

impl DialogState {
    /// Whether any dialog is running.
    pub fn is_active(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Name of the innermost running dialog.
    pub fn active_dialog(&self) -> Option<&str> {
        self.stack.last().map(|c| c.dialog.as_str())
    }

    pub fn active(&self) -> Option<&DialogCursor> {
        self.stack.last()
    }

    pub fn active_mut(&mut self) -> Option<&mut DialogCursor> {
        self.stack.last_mut()
    }

    /// The prompt the active dialog is waiting on, if any.
    pub fn pending_prompt(&self) -> Option<&PendingPrompt> {
        self.active().and_then(|c| c.pending.as_ref())
    }

    pub fn push(&mut self, cursor: DialogCursor) {
        self.stack.push(cursor);
    }

    pub fn pop(&mut self) -> Option<DialogCursor> {
        self.stack.pop()
    }

    /// Drop every dialog. Returns how many were running.
    pub fn clear(&mut self) -> usize {
        let n = self.stack.len();
        self.stack.clear();
        n
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
