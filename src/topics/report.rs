//! Report tool errors: BIRT, Qlikview and Qliksense.

use crate::dialogs::{PromptSpec, StepContext, StepOutcome, Waterfall};
use crate::error::DialogError;

use super::{CONFIRM_PROMPT, YES_NO, names, require_entity};

pub const BIRT: &str = "birt";
pub const QLIKVIEW: &str = "qlikview";
pub const QLIKSENSE: &str = "qliksense";

pub const MENU: [&str; 3] = ["Qlikview", "BIRT(From Report Tab)", "Qliksense"];

pub const BROWSERS: [&str; 3] = ["Internet explorer", "Chrome", "Firefox"];
pub const QLIK_ISSUES: [&str; 2] = ["Access Denied", "Not showing the recent data"];

const USERNAME_HINT: &str = r"Please try the user name as: domain\TID. Ex: CAG\T000AA.";

pub fn dialog() -> Result<Waterfall, DialogError> {
    Waterfall::new(
        names::REPORT,
        vec![
            initialize_state,
            prompt_for_birt,
            response_for_birt,
            response_for_birt_browser,
            prompt_for_qlikview,
            response_for_qlikview,
            prompt_for_qliksense,
            response_for_qliksense,
        ],
    )
}

fn initialize_state(ctx: &mut StepContext<'_>) -> StepOutcome {
    require_entity(ctx, "Please let me know the tool which you are trying?", &MENU)
}

fn prompt_for_birt(ctx: &mut StepContext<'_>) -> StepOutcome {
    if !ctx.profile.entity_is(BIRT) {
        return StepOutcome::Next;
    }
    ctx.profile.continuation = false;
    StepOutcome::Prompt(PromptSpec::choice(
        CONFIRM_PROMPT,
        "Are you using Windows 10?",
        &YES_NO,
    ))
}

fn response_for_birt(ctx: &mut StepContext<'_>) -> StepOutcome {
    if !ctx.profile.entity_is(BIRT) {
        return StepOutcome::Next;
    }
    if ctx.reply_is("yes") {
        ctx.send("BIRT reports are not accessible in Windows 10. Please use Qlikview & Qliksense for RP reports extraction.");
        ctx.send("Contact your business admin for the accessibility.");
        ctx.profile.continuation = true;
        return StepOutcome::End;
    }
    ctx.profile.continuation = false;
    StepOutcome::Prompt(PromptSpec::choice(
        CONFIRM_PROMPT,
        "Which browser are you logged in with?",
        &BROWSERS,
    ))
}

fn response_for_birt_browser(ctx: &mut StepContext<'_>) -> StepOutcome {
    if !ctx.profile.entity_is(BIRT) {
        return StepOutcome::Next;
    }
    if ctx.reply_is("internet explorer") {
        ctx.send("Please raise an incident to RP team in DriveIT with the issue description.");
    } else {
        ctx.send("Please try accessing BIRT report in Internet explorer.");
    }
    ctx.profile.continuation = true;
    StepOutcome::Next
}

fn prompt_for_qlikview(ctx: &mut StepContext<'_>) -> StepOutcome {
    prompt_for_qlik_issue(ctx, QLIKVIEW)
}

fn response_for_qlikview(ctx: &mut StepContext<'_>) -> StepOutcome {
    if !ctx.profile.entity_is(QLIKVIEW) {
        return StepOutcome::Next;
    }
    if ctx.reply_is("access denied") {
        ctx.send(USERNAME_HINT);
    } else {
        ctx.send("The Qlikview data refresh time is: 9.30 PM EST.");
        ctx.send("Please try to extract the report after the refresh timings.");
    }
    ctx.profile.continuation = true;
    StepOutcome::Next
}

fn prompt_for_qliksense(ctx: &mut StepContext<'_>) -> StepOutcome {
    prompt_for_qlik_issue(ctx, QLIKSENSE)
}

fn response_for_qliksense(ctx: &mut StepContext<'_>) -> StepOutcome {
    if !ctx.profile.entity_is(QLIKSENSE) {
        return StepOutcome::Next;
    }
    if ctx.reply_is("access denied") {
        ctx.send(USERNAME_HINT);
        ctx.send("Please contact your business admin for the accessibility and training.");
    } else {
        ctx.send("Please see the refresh time for each report below:");
        ctx.send("Participation : 5.30 AM EST");
        ctx.send("DOE-Grant : 10.30 PM EST");
        ctx.send("Active Projects : 10.30 PM EST");
        ctx.send("Please try to extract the report 45 mins after the refresh timings to get the latest data.");
    }
    ctx.profile.continuation = true;
    StepOutcome::Next
}

fn prompt_for_qlik_issue(ctx: &mut StepContext<'_>, tool: &str) -> StepOutcome {
    if !ctx.profile.entity_is(tool) {
        return StepOutcome::Next;
    }
    ctx.profile.continuation = false;
    StepOutcome::Prompt(PromptSpec::choice(
        CONFIRM_PROMPT,
        "Please select the issue that you are facing.",
        &QLIK_ISSUES,
    ))
}
