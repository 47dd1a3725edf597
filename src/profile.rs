//! Entity profile: the per-conversation record every topic dialog reads.

use serde::{Deserialize, Serialize};

/// Issue category plus continuation flag for one conversation.
///
/// `entity` is set upstream by the router before a topic dialog starts.
/// Stored in the state store as JSON under key `"entity_profile"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityProfile {
    /// Normalized issue-category key, e.g. "disabled", "ldap", "BIRT".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    /// True while the topic dialog still expects further turns.
    #[serde(default = "default_continuation")]
    pub continuation: bool,
}

fn default_continuation() -> bool {
    true
}

impl Default for EntityProfile {
    fn default() -> Self {
        Self {
            entity: None,
            continuation: true,
        }
    }
}

impl EntityProfile {
    pub fn new(entity: Option<String>) -> Self {
        Self {
            entity,
            ..Default::default()
        }
    }

    pub fn with_entity(entity: impl Into<String>) -> Self {
        Self::new(Some(entity.into()))
    }

    /// Whether a non-blank entity is set.
    pub fn has_entity(&self) -> bool {
        self.entity
            .as_deref()
            .is_some_and(|e| !e.trim().is_empty())
    }

    /// Case-insensitive category check. Always false when no entity is set.
    pub fn entity_is(&self, category: &str) -> bool {
        self.entity
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .is_some_and(|e| e.eq_ignore_ascii_case(category.trim()))
    }

    /// Replace the entity (or clear it with `None`).
    pub fn set_entity(&mut self, entity: Option<String>) {
        self.entity = entity.filter(|e| !e.trim().is_empty());
    }
}

/// Keys used for per-conversation state persistence.
pub mod state_keys {
    /// Key for the EntityProfile JSON blob.
    pub const ENTITY_PROFILE: &str = "entity_profile";
    /// Key for the DialogState JSON blob (the dialog stack and cursors).
    pub const DIALOG_STATE: &str = "dialog_state";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_empty_and_continuing() {
        let p = EntityProfile::default();
        assert!(p.entity.is_none());
        assert!(p.continuation);
        assert!(!p.has_entity());
    }

    #[test]
    fn entity_match_ignores_case_and_whitespace() {
        let p = EntityProfile::with_entity("BIRT");
        assert!(p.entity_is("birt"));
        assert!(p.entity_is(" Birt "));
        assert!(!p.entity_is("qlikview"));

        let p = EntityProfile::with_entity("Not Authorized");
        assert!(p.entity_is("not authorized"));
    }

    #[test]
    fn blank_entity_counts_as_unset() {
        let p = EntityProfile::with_entity("   ");
        assert!(!p.has_entity());
        assert!(!p.entity_is(""));
        assert!(!p.entity_is("   "));
        assert!(!EntityProfile::default().entity_is(""));

        let mut p = EntityProfile::with_entity("ldap");
        p.set_entity(Some(String::new()));
        assert!(p.entity.is_none());
    }

    #[test]
    fn missing_continuation_defaults_to_true() {
        let parsed: EntityProfile = serde_json::from_str(r#"{"entity":"ldap"}"#).unwrap();
        assert_eq!(parsed.entity.as_deref(), Some("ldap"));
        assert!(parsed.continuation);

        let parsed: EntityProfile = serde_json::from_str("{}").unwrap();
        assert!(parsed.entity.is_none());
    }

    #[test]
    fn unset_entity_is_omitted_from_json() {
        let json = serde_json::to_value(EntityProfile::default()).unwrap();
        assert_eq!(json, serde_json::json!({"continuation": true}));
    }
}
