//! Login failures.

use crate::dialogs::{StepContext, StepOutcome, Waterfall};
use crate::error::DialogError;

use super::transaction::SUPERVISOR_CYCLE_LINES;
use super::{names, require_entity};

pub const DEACTIVATED: &str = "deactivated";
pub const INVALID: &str = "invalid";
pub const LDAP: &str = "ldap";
pub const TRANSACTION: &str = "transaction";
pub const UNAUTHORIZED: &str = "not authorized";

pub const MENU: [&str; 5] = [
    "Invalid userid/password",
    "User Id not defined in LDAP",
    "Not authorized to access RP due to invalid LOC/DEPT",
    "You are currently deactivated in the system",
    "Transaction not successfully started",
];

const BUSINESS_ADMIN_LINES: [&str; 2] = [
    "Please contact your business admin to activate in RP.",
    "You can refer help tab for business admin contacts.",
];

pub fn dialog() -> Result<Waterfall, DialogError> {
    Waterfall::new(names::LOGIN, vec![initialize_state, respond])
}

fn initialize_state(ctx: &mut StepContext<'_>) -> StepOutcome {
    require_entity(
        ctx,
        "Ok, glad to help you on that. Please select the appropriate issue from the dropdown.",
        &MENU,
    )
}

fn respond(ctx: &mut StepContext<'_>) -> StepOutcome {
    let lines: &[&str] = if ctx.profile.entity_is(LDAP) {
        &[
            "Please follow the below steps.",
            "i) Contact your HR to activate your profile in LDAP.",
            "ii) Contact your business admin to activate in RP.",
            "You can refer help tab for business admin contacts.",
        ]
    } else if ctx.profile.entity_is(INVALID) {
        &["Please reset your password. If the issue still persists, try logging in after clearing the browser cache."]
    } else if ctx.profile.entity_is(TRANSACTION) {
        &SUPERVISOR_CYCLE_LINES
    } else if ctx.profile.entity_is(UNAUTHORIZED) || ctx.profile.entity_is(DEACTIVATED) {
        &BUSINESS_ADMIN_LINES
    } else {
        &[]
    };
    for line in lines {
        ctx.send(*line);
    }
    StepOutcome::Next
}
