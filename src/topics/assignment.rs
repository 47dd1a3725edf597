//! Project assignment issues: the Assign Project button is disabled, or a
//! project type / project / model year is not offered.

use crate::dialogs::{PromptSpec, StepContext, StepOutcome, Waterfall};
use crate::error::DialogError;

use super::{CONFIRM_PROMPT, YES_NO, names, require_entity};

pub const DISABLED: &str = "disabled";
pub const VISIBLE: &str = "visible";

/// Task id quoted when the user asks for a DriveIT task.
pub const TASK_ID: &str = "RP:102036";

pub const MENU: [&str; 2] = [
    "Assign Project Button is disabled",
    "Project type/Project/Model Year is not visible",
];

pub fn dialog() -> Result<Waterfall, DialogError> {
    Waterfall::new(
        names::ASSIGNMENT,
        vec![
            initialize_state,
            prompt_for_disabled,
            response_for_disabled,
            response_for_visible,
        ],
    )
}

fn initialize_state(ctx: &mut StepContext<'_>) -> StepOutcome {
    require_entity(
        ctx,
        "Ok, glad to help you on that. Which issue are you facing now?",
        &MENU,
    )
}

fn prompt_for_disabled(ctx: &mut StepContext<'_>) -> StepOutcome {
    if !ctx.profile.entity_is(DISABLED) {
        return StepOutcome::Next;
    }
    ctx.profile.continuation = false;
    ctx.send(
        "For NAFTA users, Assign Project feature is enabled only for two weeks and for other region users, it is enabled for one month.",
    );
    ctx.send(
        "If you want to assign project out of this timeframe, please create Task in DriveIT with business Admin approval.",
    );
    StepOutcome::Prompt(PromptSpec::choice(
        CONFIRM_PROMPT,
        "Do you want to create the task in DriveIT now?",
        &YES_NO,
    ))
}

fn response_for_disabled(ctx: &mut StepContext<'_>) -> StepOutcome {
    if !ctx.profile.entity_is(DISABLED) {
        return StepOutcome::Next;
    }
    if ctx.reply_is("yes") {
        ctx.send(format!("Ok. I created a task {TASK_ID} for you."));
    }
    // Restored whatever the answer was.
    ctx.profile.continuation = true;
    StepOutcome::Next
}

fn response_for_visible(ctx: &mut StepContext<'_>) -> StepOutcome {
    if ctx.profile.entity_is(VISIBLE) {
        ctx.send(
            "Please contact your business admin. You can refer help tab for admin details.",
        );
    }
    StepOutcome::Next
}
