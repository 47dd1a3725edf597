//! "Transaction not successfully started": always the same explanation.

use crate::dialogs::{StepContext, StepOutcome, Waterfall};
use crate::error::DialogError;

use super::names;

/// Supervisor-cycle diagnosis, also reused by the login topic.
pub const SUPERVISOR_CYCLE_LINES: [&str; 3] = [
    "This error occurs when any user/supervisor is assigned as their own supervisor in PDM.",
    "Please check your profile and your supervisor profile, and your supervisor's supervisor profile and so on.",
    "Then correct the supervisor for the concerned person.",
];

pub fn dialog() -> Result<Waterfall, DialogError> {
    Waterfall::new(names::TRANSACTION, vec![explain_supervisor_cycle])
}

/// Ignores the entity entirely.
fn explain_supervisor_cycle(ctx: &mut StepContext<'_>) -> StepOutcome {
    for line in SUPERVISOR_CYCLE_LINES {
        ctx.send(line);
    }
    StepOutcome::End
}
