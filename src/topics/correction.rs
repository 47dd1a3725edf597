//! Approver corrections: supervisor or backup approver is wrong in RP.
//!
//! The main dialog asks which approver to update and hands over to one of
//! two child dialogs that can also be started directly.

use crate::dialogs::{PromptSpec, StepContext, StepOutcome, Validator, Waterfall};
use crate::error::DialogError;

use super::{names, require_entity};

pub const APPROVER: &str = "approver";
pub const SUPERVISOR: &str = "supervisor";
pub const BACKUP_APPROVER: &str = "backup approver";

pub const SUP_APPR_PROMPT: &str = "sup_appr_prompt";
pub const YES_NO_PROMPT: &str = "yes_no_prompt";

pub const MENU: [&str; 2] = ["Update Supervisor", "Update Backup Approver"];
pub const APPROVER_CHOICES: [&str; 2] = ["Supervisor", "Backup Approver"];

/// The main dialog plus the supervisor and backup-approver children.
pub fn dialogs() -> Result<Vec<Waterfall>, DialogError> {
    Ok(vec![
        Waterfall::new(
            names::CORRECTION,
            vec![
                initialize_state,
                prompt_for_approver,
                route_approver,
                prompt_for_supervisor,
                response_for_supervisor,
                respond_backup_approver,
            ],
        )?,
        Waterfall::new(
            names::CORRECTION_SUPERVISOR,
            vec![prompt_for_supervisor, response_for_supervisor],
        )?,
        Waterfall::new(
            names::CORRECTION_BACKUP_APPROVER,
            vec![respond_backup_approver],
        )?,
    ])
}

fn initialize_state(ctx: &mut StepContext<'_>) -> StepOutcome {
    require_entity(
        ctx,
        "Ok, glad to help you on that. Which approver do you want to correct?",
        &MENU,
    )
}

fn prompt_for_approver(ctx: &mut StepContext<'_>) -> StepOutcome {
    if !ctx.profile.entity_is(APPROVER) {
        return StepOutcome::Next;
    }
    ctx.profile.continuation = false;
    StepOutcome::Prompt(PromptSpec::choice(
        SUP_APPR_PROMPT,
        "Do you want to update Supervisor or Backup Approver?",
        &APPROVER_CHOICES,
    ))
}

/// Narrows the entity to the chosen approver and swaps in its child dialog.
fn route_approver(ctx: &mut StepContext<'_>) -> StepOutcome {
    if !ctx.profile.entity_is(APPROVER) {
        return StepOutcome::Next;
    }
    ctx.profile.continuation = true;
    if ctx.reply_is("supervisor") {
        ctx.profile.set_entity(Some(SUPERVISOR.to_string()));
        StepOutcome::replace(names::CORRECTION_SUPERVISOR)
    } else {
        ctx.profile.set_entity(Some(BACKUP_APPROVER.to_string()));
        StepOutcome::replace(names::CORRECTION_BACKUP_APPROVER)
    }
}

fn prompt_for_supervisor(ctx: &mut StepContext<'_>) -> StepOutcome {
    if !ctx.profile.entity_is(SUPERVISOR) {
        return StepOutcome::Next;
    }
    ctx.profile.continuation = false;
    StepOutcome::Prompt(
        PromptSpec::text(
            YES_NO_PROMPT,
            "Has the supervisor already been updated in PDM? (Yes/No)",
        )
        .with_validator(Validator::YesNo),
    )
}

fn response_for_supervisor(ctx: &mut StepContext<'_>) -> StepOutcome {
    if !ctx.profile.entity_is(SUPERVISOR) {
        return StepOutcome::Next;
    }
    if ctx.reply_is("yes") {
        ctx.send("Supervisor changes in PDM are synced to RP overnight.");
        ctx.send("If the supervisor is still not updated in RP after the sync, please raise an incident to RP team in DriveIT.");
    } else {
        ctx.send("Please update the supervisor in PDM first. RP picks up the new supervisor in the overnight sync.");
    }
    ctx.profile.continuation = true;
    StepOutcome::Next
}

fn respond_backup_approver(ctx: &mut StepContext<'_>) -> StepOutcome {
    if !ctx.profile.entity_is(BACKUP_APPROVER) {
        return StepOutcome::Next;
    }
    ctx.send("Please contact your business admin to update the backup approver in RP.");
    ctx.send("You can refer help tab for business admin contacts.");
    StepOutcome::End
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogs::TurnStatus;
    use crate::topics::test_support::{Session, texts};

    #[test]
    fn approver_menu_then_supervisor_branch() {
        let mut session = Session::new(Some("approver"));
        let (status, out) = session.begin(names::CORRECTION);
        assert_eq!(status, TurnStatus::Waiting);
        assert_eq!(
            out[0].actions(),
            ["Supervisor".to_string(), "Backup Approver".to_string()]
        );

        let (status, out) = session.reply("supervisor");
        assert_eq!(status, TurnStatus::Waiting);
        assert!(out[0].content().contains("updated in PDM"));
        assert_eq!(session.state.active_dialog(), Some(names::CORRECTION_SUPERVISOR));
        assert_eq!(session.state.stack.len(), 1);
        assert!(session.profile.entity_is(SUPERVISOR));

        let (status, out) = session.reply("y");
        assert_eq!(status, TurnStatus::Complete);
        assert_eq!(out.len(), 2);
        assert!(out[0].content().contains("synced to RP overnight"));
    }

    #[test]
    fn approver_menu_then_backup_approver_branch() {
        let mut session = Session::new(Some("approver"));
        session.begin(names::CORRECTION);
        let (status, out) = session.reply("Backup Approver");
        assert_eq!(status, TurnStatus::Complete);
        assert_eq!(out.len(), 2);
        assert!(out[0].content().contains("backup approver"));
        assert!(session.profile.entity_is(BACKUP_APPROVER));
    }

    #[test]
    fn supervisor_yes_and_no_differ() {
        let mut yes = Session::new(Some("supervisor"));
        yes.begin(names::CORRECTION);
        let (_, yes_out) = yes.reply("Yes");

        let mut no = Session::new(Some("supervisor"));
        no.begin(names::CORRECTION);
        let (_, no_out) = no.reply("No");

        assert_ne!(texts(&yes_out), texts(&no_out));
        assert!(no_out[0].content().contains("update the supervisor in PDM first"));
    }

    #[test]
    fn supervisor_validator_reprompts() {
        let mut session = Session::new(Some("supervisor"));
        let (_, first) = session.begin(names::CORRECTION);
        let (status, out) = session.reply("not sure");
        assert_eq!(status, TurnStatus::Waiting);
        assert_eq!(texts(&out), vec!["Please answer Yes or No.", first[0].content()]);
        assert!(!session.profile.continuation);
    }

    #[test]
    fn backup_approver_ends_immediately() {
        let mut session = Session::new(Some("backup approver"));
        let (status, out) = session.begin(names::CORRECTION);
        assert_eq!(status, TurnStatus::Complete);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn children_start_directly() {
        let mut session = Session::new(Some("supervisor"));
        let (status, _) = session.begin(names::CORRECTION_SUPERVISOR);
        assert_eq!(status, TurnStatus::Waiting);

        let mut session = Session::new(Some("backup approver"));
        let (status, out) = session.begin(names::CORRECTION_BACKUP_APPROVER);
        assert_eq!(status, TurnStatus::Complete);
        assert_eq!(out.len(), 2);
    }
}
