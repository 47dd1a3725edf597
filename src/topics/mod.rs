//! Scripted helpdesk topics.
//!
//! Each topic is a step table for the dialog engine. Steps check the
//! profile's entity and either handle it or pass with `Next`, so one
//! dialog can hold the branches for several related categories.

pub mod assignment;
pub mod correction;
pub mod greeting;
pub mod login;
pub mod report;
pub mod transaction;

use crate::dialogs::{DialogSet, StepContext, StepOutcome};
use crate::error::DialogError;

/// Registered dialog names.
pub mod names {
    pub const ASSIGNMENT: &str = "assignment";
    pub const CORRECTION: &str = "correction";
    pub const CORRECTION_SUPERVISOR: &str = "correction.supervisor";
    pub const CORRECTION_BACKUP_APPROVER: &str = "correction.backup_approver";
    pub const GREETING: &str = "greeting";
    pub const LOGIN: &str = "login";
    pub const REPORT: &str = "report";
    pub const TRANSACTION: &str = "transaction";
}

/// Multiple-choice confirmation prompt id.
pub const CONFIRM_PROMPT: &str = "confirm_prompt";
/// Choices for every Yes/No confirmation.
pub const YES_NO: [&str; 2] = ["Yes", "No"];

/// Register every topic dialog.
pub fn register_all(set: &mut DialogSet) -> Result<(), DialogError> {
    set.add(assignment::dialog()?)?
        .add(login::dialog()?)?
        .add(report::dialog()?)?
        .add(transaction::dialog()?)?
        .add(greeting::dialog()?)?;
    for dialog in correction::dialogs()? {
        set.add(dialog)?;
    }
    Ok(())
}

/// Topic dialog that owns an issue category.
pub fn topic_for_entity(entity: &str) -> Option<&'static str> {
    let entity = entity.trim().to_ascii_lowercase();
    match entity.as_str() {
        assignment::DISABLED | assignment::VISIBLE => Some(names::ASSIGNMENT),
        login::LDAP | login::INVALID | login::TRANSACTION | login::UNAUTHORIZED
        | login::DEACTIVATED => Some(names::LOGIN),
        report::BIRT | report::QLIKVIEW | report::QLIKSENSE => Some(names::REPORT),
        correction::APPROVER | correction::SUPERVISOR | correction::BACKUP_APPROVER => {
            Some(names::CORRECTION)
        }
        _ => None,
    }
}

/// First step shared by the menu-driven topics: without an entity, show the
/// topic's issue menu and end the dialog.
pub(crate) fn require_entity(
    ctx: &mut StepContext<'_>,
    question: &str,
    menu: &[&str],
) -> StepOutcome {
    if ctx.profile.has_entity() {
        return StepOutcome::Next;
    }
    ctx.send_suggestions(question, menu);
    StepOutcome::End
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::dialogs::{Activity, DialogSet, DialogState, TurnStatus};
    use crate::profile::EntityProfile;

    /// One conversation driven directly against the dialog set.
    pub struct Session {
        pub set: DialogSet,
        pub state: DialogState,
        pub profile: EntityProfile,
    }

    impl Session {
        pub fn new(entity: Option<&str>) -> Self {
            let mut set = DialogSet::new();
            super::register_all(&mut set).unwrap();
            Self {
                set,
                state: DialogState::default(),
                profile: EntityProfile::new(entity.map(String::from)),
            }
        }

        pub fn begin(&mut self, dialog: &str) -> (TurnStatus, Vec<Activity>) {
            let mut out = Vec::new();
            let status = self
                .set
                .begin(&mut self.state, &mut self.profile, dialog, None, &mut out)
                .unwrap();
            (status, out)
        }

        pub fn reply(&mut self, text: &str) -> (TurnStatus, Vec<Activity>) {
            let mut out = Vec::new();
            let status = self
                .set
                .continue_turn(&mut self.state, &mut self.profile, text, &mut out)
                .unwrap();
            (status, out)
        }
    }

    pub fn texts(out: &[Activity]) -> Vec<&str> {
        out.iter().map(Activity::content).collect()
    }
}
