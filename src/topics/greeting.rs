//! Welcome dialog: seeds the profile, shows the main menu, and hands over
//! to the topic that owns the entity.

use tracing::debug;

use crate::dialogs::{StepContext, StepOutcome, Waterfall};
use crate::error::DialogError;
use crate::profile::{EntityProfile, state_keys};

use super::{names, topic_for_entity};

pub const WELCOME: &str =
    "Hi! I am the RP helpdesk assistant. Please select the issue you are facing.";

pub const MAIN_MENU: [&str; 5] = [
    "Login issue",
    "Project assignment issue",
    "Report issue",
    "Approver correction",
    "Supervisor cycle error",
];

pub const UNKNOWN_ISSUE: &str =
    "Sorry, I can't help with that issue yet. Please raise an incident to RP team in DriveIT.";

pub const CLOSING: &str = "Is there anything else I can help you with?";

pub fn dialog() -> Result<Waterfall, DialogError> {
    Waterfall::new(
        names::GREETING,
        vec![seed_profile, main_menu, route_topic, closing],
    )
}

/// Take the entity from `{"entity_profile": {...}}` start options unless the
/// conversation already has one.
fn seed_profile(ctx: &mut StepContext<'_>) -> StepOutcome {
    if ctx.profile.has_entity() {
        return StepOutcome::Next;
    }
    let seeded = ctx
        .options()
        .and_then(|o| o.get(state_keys::ENTITY_PROFILE))
        .and_then(|v| serde_json::from_value::<EntityProfile>(v.clone()).ok());
    if let Some(seeded) = seeded {
        debug!(entity = ?seeded.entity, "Seeding profile from dialog options");
        *ctx.profile = seeded;
    }
    StepOutcome::Next
}

fn main_menu(ctx: &mut StepContext<'_>) -> StepOutcome {
    if ctx.profile.has_entity() {
        return StepOutcome::Next;
    }
    ctx.send_suggestions(WELCOME, &MAIN_MENU);
    StepOutcome::End
}

fn route_topic(ctx: &mut StepContext<'_>) -> StepOutcome {
    let topic = ctx.profile.entity.as_deref().and_then(topic_for_entity);
    match topic {
        Some(topic) => StepOutcome::begin(topic),
        None => {
            ctx.send(UNKNOWN_ISSUE);
            StepOutcome::End
        }
    }
}

fn closing(ctx: &mut StepContext<'_>) -> StepOutcome {
    ctx.send(CLOSING);
    StepOutcome::End
}
